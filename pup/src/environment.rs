//! Environment for variable bindings
//!
//! The Environment is a lexical scope that holds variable bindings.
//! It forms a chain of scopes, with child environments referencing their parents.

use std::cell::RefCell;
use std::rc::Rc;

use puppy::{PuppyError, Result, Symbol};
use rustc_hash::FxHashMap;

use crate::value::Value;

// ============================================================================
// Environment
// ============================================================================

// Internal state holding the data and parent pointer
struct Scope {
    data: FxHashMap<Symbol, Value>,
    parent: Option<Environment>,
}

/// Environment for variable bindings.
///
/// Cheap to clone (an `Rc` increment); clones share the same scope, so a
/// closure that captured an environment sees later `define`s made in it.
#[derive(Clone)]
pub struct Environment {
    scope: Rc<RefCell<Scope>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create a new, empty root environment
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Environment>) -> Self {
        Environment {
            scope: Rc::new(RefCell::new(Scope {
                data: FxHashMap::default(),
                parent,
            })),
        }
    }

    /// Create a child scope holding a single binding.
    pub fn extend(&self, name: Symbol, value: Value) -> Self {
        let child = Self::with_parent(Some(self.clone()));
        child.define_local(name, value);
        child
    }

    /// Bind `name` in this scope, shadowing nothing and checking nothing.
    pub fn define_local(&self, name: Symbol, value: Value) {
        self.scope.borrow_mut().data.insert(name, value);
    }

    /// Bind `name` in this scope unless it already resolves anywhere in the
    /// chain. A failed define leaves every scope untouched.
    pub fn define(&self, name: Symbol, value: Value) -> Result<()> {
        if self.resolves(name) {
            return Err(PuppyError::redefinition(name));
        }
        self.define_local(name, value);
        Ok(())
    }

    /// Look up a variable, walking up the parent chain
    pub fn get(&self, name: Symbol) -> Option<Value> {
        let scope = self.scope.borrow();

        if let Some(value) = scope.data.get(&name) {
            return Some(value.clone());
        }

        match &scope.parent {
            Some(parent) => parent.get(name),
            None => None,
        }
    }

    pub fn lookup(&self, name: Symbol) -> Result<Value> {
        self.get(name).ok_or_else(|| PuppyError::unbound(name))
    }

    pub fn resolves(&self, name: Symbol) -> bool {
        self.get(name).is_some()
    }

    pub fn parent(&self) -> Option<Environment> {
        self.scope.borrow().parent.clone()
    }

    /// Number of bindings held directly in this scope.
    pub fn len(&self) -> usize {
        self.scope.borrow().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty the scope and hand back its bindings and parent, but only when
    /// this handle is the last one.
    pub(crate) fn drain_if_unique(&self) -> Option<(Vec<Value>, Option<Environment>)> {
        if Rc::strong_count(&self.scope) != 1 {
            return None;
        }
        let mut scope = self.scope.try_borrow_mut().ok()?;
        let values = scope.data.drain().map(|(_, value)| value).collect();
        Some((values, scope.parent.take()))
    }
}
