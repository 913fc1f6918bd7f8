use std::fmt;
use std::mem;
use std::rc::Rc;

use puppy::{Ast, Result, Symbol};

use crate::environment::Environment;
use crate::interpreter::Interpreter;
use crate::native::pairs_to_list;

// ============================================================================
// Runtime Values
// ============================================================================

/// A native single-argument function. Multi-argument primitives return
/// another `NativeFn` from each application until the last argument arrives.
pub type NativeFn = Rc<dyn Fn(Value, &mut Interpreter) -> Result<Value>>;

#[derive(Clone)]
pub enum Value {
    Number(f64),
    /// The empty list.
    Empty,
    /// A list of two or more elements: the head and the rest of the list.
    /// A one-element list is the bare element itself.
    Pair(Rc<Pair>),
    Function(Rc<Function>),
}

pub struct Pair {
    pub head: Value,
    pub rest: Value,
}

pub struct Primitive {
    pub name: &'static str,
    pub func: NativeFn,
}

pub struct Closure {
    pub param: Symbol,
    pub body: Rc<Ast>,
    pub env: Environment,
}

/// The kinds of callable the evaluator distinguishes when applying.
pub enum Function {
    Primitive(Primitive),
    /// `__list`: receives the unevaluated elements of a `[ ... ]` literal.
    ListLiteral,
    /// `lambda`: receives its parameter name unevaluated.
    Lambda,
    /// `(lambda x)`: a parameter name waiting for its unevaluated body.
    LambdaParam { param: Symbol, env: Environment },
    Closure(Closure),
    /// `compose f g`: applies `inner` first, then `outer`.
    Composed { outer: Value, inner: Value },
}

/// Runtime kinds checked by the standard library's type guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    List,
    Function,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::List => "list",
            ValueKind::Function => "function",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn number(n: impl Into<f64>) -> Self {
        Value::Number(n.into())
    }

    pub fn boolean(b: bool) -> Self {
        Value::Number(if b { 1.0 } else { 0.0 })
    }

    pub fn pair(head: Value, rest: Value) -> Self {
        Value::Pair(Rc::new(Pair { head, rest }))
    }

    pub fn function(function: Function) -> Self {
        Value::Function(Rc::new(function))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Empty | Value::Pair(_) => ValueKind::List,
            Value::Function(_) => ValueKind::Function,
        }
    }

    /// Only the number zero and the empty list are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Empty => false,
            Value::Pair(_) | Value::Function(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

// ============================================================================
// Equality
// ============================================================================

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self, other);
        loop {
            match (left, right) {
                (Value::Number(a), Value::Number(b)) => return a == b,
                (Value::Empty, Value::Empty) => return true,
                (Value::Function(a), Value::Function(b)) => return Rc::ptr_eq(a, b),
                (Value::Pair(a), Value::Pair(b)) => {
                    if Rc::ptr_eq(a, b) {
                        return true;
                    }
                    if a.head != b.head {
                        return false;
                    }
                    left = &a.rest;
                    right = &b.rest;
                }
                _ => return false,
            }
        }
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write_number(f, *n),
            Value::Empty => f.write_str("[]"),
            Value::Pair(_) => {
                f.write_str("[")?;
                for (i, item) in pairs_to_list(self).iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Function(function) => write!(f, "{function}"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Primitive(p) => write!(f, "<function {}>", p.name),
            Function::ListLiteral => f.write_str("<function __list>"),
            Function::Lambda => f.write_str("<lambda>"),
            Function::LambdaParam { param, .. } => write!(f, "<lambda {param}>"),
            Function::Closure(c) => write!(f, "<closure {}>", c.param),
            Function::Composed { .. } => f.write_str("<function compose>"),
        }
    }
}

// ============================================================================
// Teardown
// ============================================================================

// Dropping a list or a composition chain link by link would take one native
// frame per link. Instead every owned child is moved onto a worklist and
// released from a loop.
#[derive(Default)]
struct Teardown {
    values: Vec<Value>,
    scopes: Vec<Environment>,
}

impl Teardown {
    fn take(&mut self, value: &mut Value) {
        if matches!(value, Value::Pair(_) | Value::Function(_)) {
            self.values.push(mem::replace(value, Value::Empty));
        }
    }

    fn take_scope(&mut self, env: &Environment) {
        if let Some((values, parent)) = env.drain_if_unique() {
            self.values.extend(values);
            self.scopes.extend(parent);
        }
    }

    fn run(mut self) {
        loop {
            if let Some(value) = self.values.pop() {
                match value {
                    Value::Pair(pair) => {
                        if let Ok(mut pair) = Rc::try_unwrap(pair) {
                            self.take(&mut pair.head);
                            self.take(&mut pair.rest);
                        }
                    }
                    Value::Function(function) => {
                        if let Ok(mut function) = Rc::try_unwrap(function) {
                            function.release_into(&mut self);
                        }
                    }
                    Value::Number(_) | Value::Empty => {}
                }
            } else if let Some(env) = self.scopes.pop() {
                self.take_scope(&env);
            } else {
                break;
            }
        }
    }
}

impl Function {
    fn release_into(&mut self, teardown: &mut Teardown) {
        match self {
            Function::Composed { outer, inner } => {
                teardown.take(outer);
                teardown.take(inner);
            }
            Function::Closure(Closure { env, .. }) | Function::LambdaParam { env, .. } => {
                teardown.take_scope(env);
            }
            Function::Primitive(_) | Function::ListLiteral | Function::Lambda => {}
        }
    }
}

impl Drop for Pair {
    fn drop(&mut self) {
        let mut teardown = Teardown::default();
        teardown.take(&mut self.head);
        teardown.take(&mut self.rest);
        teardown.run();
    }
}

impl Drop for Function {
    fn drop(&mut self) {
        let mut teardown = Teardown::default();
        self.release_into(&mut teardown);
        teardown.run();
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::list_to_pairs;

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::number(3.0).to_string(), "3");
        assert_eq!(Value::number(-2.0).to_string(), "-2");
        assert_eq!(Value::number(0.5).to_string(), "0.5");
    }

    #[test]
    fn test_display_lists() {
        let list = list_to_pairs(vec![Value::number(1), Value::number(2), Value::number(3)]);
        assert_eq!(list.to_string(), "[1 2 3]");
        assert_eq!(Value::Empty.to_string(), "[]");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::number(0).is_truthy());
        assert!(Value::number(-1).is_truthy());
        assert!(!Value::Empty.is_truthy());
        assert!(Value::pair(Value::number(0), Value::number(0)).is_truthy());
        assert!(Value::function(Function::Lambda).is_truthy());
    }

    #[test]
    fn test_structural_equality() {
        let a = list_to_pairs(vec![Value::number(1), Value::number(2)]);
        let b = list_to_pairs(vec![Value::number(1), Value::number(2)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::number(1));

        let f = Value::function(Function::Lambda);
        assert_eq!(f, f.clone());
        assert_ne!(f, Value::function(Function::Lambda));
    }

    #[test]
    fn test_dropping_a_long_list() {
        let items = (0..1_000_000).map(Value::number).collect();
        let list = list_to_pairs(items);
        assert_eq!(pairs_to_list(&list).len(), 1_000_000);
        drop(list);
    }

    #[test]
    fn test_dropping_a_long_composition() {
        let leaf = Value::function(Function::ListLiteral);
        let mut chain = leaf.clone();
        for _ in 0..1_000_000 {
            chain = Value::function(Function::Composed {
                outer: leaf.clone(),
                inner: chain,
            });
        }
        assert_eq!(chain.to_string(), "<function compose>");
        drop(chain);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Value::number(1).kind(), ValueKind::Number);
        assert_eq!(Value::Empty.kind(), ValueKind::List);
        assert_eq!(Value::function(Function::ListLiteral).kind(), ValueKind::Function);
    }
}
