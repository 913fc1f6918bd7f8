//! Typed syntax tree and the tree builder that produces it.
//!
//! Every application node takes exactly one argument: the parser has already
//! curried multi-argument calls, so `(+ 1 2)` arrives here as `((+ 1) 2)`.
//! Nodes are immutable and shared through `Rc`, which lets closures keep
//! their body alive without copying the subtree.

use std::fmt;
use std::rc::Rc;

use crate::error::{PuppyError, Result};
use crate::interner::Symbol;
use crate::parser::{self, DEFINE, IF, RawExpr};
use crate::stack::ensure_sufficient_stack;

#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Number(f64),
    Symbol(Symbol),
    /// Single-argument application.
    Apply { function: Rc<Ast>, argument: Rc<Ast> },
    If {
        condition: Rc<Ast>,
        then_branch: Rc<Ast>,
        else_branch: Rc<Ast>,
    },
    Define { name: Symbol, value: Rc<Ast> },
    /// The element expressions of a `[ ... ]` literal, evaluated one by one
    /// when handed to the list-construction primitive.
    ListItems(Vec<Rc<Ast>>),
    /// A group with no argument, such as `()` or `(x)`. It only fails when
    /// evaluated, so it is harmless in a branch that is never taken.
    Malformed(String),
}

impl Ast {
    pub fn apply(function: Ast, argument: Ast) -> Self {
        Ast::Apply {
            function: Rc::new(function),
            argument: Rc::new(argument),
        }
    }

    pub fn symbol(name: &str) -> Self {
        Ast::Symbol(Symbol::new(name))
    }

    pub fn is_define(&self) -> bool {
        matches!(self, Ast::Define { .. })
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Number(n) => write!(f, "{n}"),
            Ast::Symbol(s) => write!(f, "{s}"),
            Ast::Apply { function, argument } => write!(f, "({function} {argument})"),
            Ast::If {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "(if {condition} {then_branch} {else_branch})"),
            Ast::Define { name, value } => write!(f, "(define {name} {value})"),
            Ast::ListItems(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Ast::Malformed(source) => f.write_str(source),
        }
    }
}

// ============================================================================
// Tree Builder
// ============================================================================

pub fn build(expr: &RawExpr) -> Result<Ast> {
    match expr {
        RawExpr::Number(n) => Ok(Ast::Number(*n)),
        RawExpr::Symbol(s) => Ok(Ast::symbol(s)),
        RawExpr::Bracket(items) => {
            let items = items
                .iter()
                .map(|item| build_nested(item).map(Rc::new))
                .collect::<Result<Vec<_>>>()?;
            Ok(Ast::ListItems(items))
        }
        RawExpr::List(items) => match items.first().and_then(RawExpr::as_symbol) {
            Some(IF) => build_if(items),
            Some(DEFINE) => build_define(items),
            _ => build_application(expr, items),
        },
    }
}

fn build_nested(expr: &RawExpr) -> Result<Ast> {
    ensure_sufficient_stack(|| build(expr))
}

fn build_if(items: &[RawExpr]) -> Result<Ast> {
    let [_, condition, then_branch, else_branch] = items else {
        return Err(PuppyError::syntax(format!(
            "Malformed if: expected 3 expressions after 'if', got {}",
            items.len() - 1
        )));
    };

    Ok(Ast::If {
        condition: Rc::new(build_nested(condition)?),
        then_branch: Rc::new(build_nested(then_branch)?),
        else_branch: Rc::new(build_nested(else_branch)?),
    })
}

fn build_define(items: &[RawExpr]) -> Result<Ast> {
    let [_, name, value @ ..] = items else {
        return Err(PuppyError::syntax("Malformed define: missing name"));
    };
    let Some(name) = name.as_symbol() else {
        return Err(PuppyError::syntax(format!(
            "Malformed define: name must be a symbol, got {name}"
        )));
    };

    // Only the last element is the value: `(define f 1 2)` binds 2.
    let Some(value) = value.last() else {
        return Err(PuppyError::syntax(format!("Malformed define: no value for {name}")));
    };
    let value = build_nested(value)?;

    Ok(Ast::Define {
        name: Symbol::new(name),
        value: Rc::new(value),
    })
}

fn build_application(expr: &RawExpr, items: &[RawExpr]) -> Result<Ast> {
    let [function, first, rest @ ..] = items else {
        return Ok(Ast::Malformed(expr.to_string()));
    };

    let mut tree = Ast::apply(build_nested(function)?, build_nested(first)?);
    for argument in rest {
        tree = Ast::apply(tree, build_nested(argument)?);
    }
    Ok(tree)
}

/// Parse source text all the way to a sequence of top-level trees.
pub fn build_program(input: &str) -> Result<Vec<Ast>> {
    parser::parse(input)?.iter().map(build).collect()
}
