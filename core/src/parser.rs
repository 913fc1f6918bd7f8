use std::fmt;

use crate::error::{PuppyError, Result};
use crate::lexer::{Token, tokenize};
use crate::stack::ensure_sufficient_stack;

/// Symbol that `[ ... ]` literals desugar into a call of.
pub const LIST_LITERAL: &str = "__list";
pub const LAMBDA: &str = "lambda";
pub const IF: &str = "if";
pub const DEFINE: &str = "define";

/// Forms with a fixed arity that the parser never curries.
const UNCURRIED: [&str; 2] = [IF, DEFINE];

// ============================================================================
// Raw Expressions
// ============================================================================

/// Bracket structure produced by the parser and consumed by the tree builder.
#[derive(Debug, Clone, PartialEq)]
pub enum RawExpr {
    Number(f64),
    Symbol(String),
    /// A `( ... )` group, already curried into nested pairs.
    List(Vec<RawExpr>),
    /// The elements of a `[ ... ]` literal. Never curried.
    Bracket(Vec<RawExpr>),
}

impl RawExpr {
    pub fn symbol(name: &str) -> Self {
        RawExpr::Symbol(name.to_string())
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            RawExpr::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for RawExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_all(f: &mut fmt::Formatter<'_>, items: &[RawExpr]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            RawExpr::Number(n) => write!(f, "{n}"),
            RawExpr::Symbol(s) => f.write_str(s),
            RawExpr::List(items) => {
                f.write_str("(")?;
                write_all(f, items)?;
                f.write_str(")")
            }
            RawExpr::Bracket(items) => {
                f.write_str("[")?;
                write_all(f, items)?;
                f.write_str("]")
            }
        }
    }
}

// ============================================================================
// Automatic Currying
// ============================================================================

/// Rewrite `f a1 a2 ... an` into `(((f a1) a2) ... an)`.
///
/// The result always has at most two elements: the accumulated application
/// and the final argument.
pub fn auto_curry(elements: Vec<RawExpr>) -> Vec<RawExpr> {
    let mut rest = elements.into_iter();
    let mut curried: Vec<RawExpr> = rest.by_ref().take(2).collect();
    for argument in rest {
        curried = vec![RawExpr::List(curried), argument];
    }
    curried
}

fn finish_group(elements: Vec<RawExpr>) -> RawExpr {
    let keyword = elements
        .first()
        .and_then(RawExpr::as_symbol)
        .is_some_and(|head| UNCURRIED.contains(&head));

    if elements.len() > 2 && !keyword {
        RawExpr::List(auto_curry(elements))
    } else {
        RawExpr::List(elements)
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parse the expression starting at `start`, returning it and the index of
/// the first token after it.
pub fn parse_expression(tokens: &[Token], start: usize) -> Result<(RawExpr, usize)> {
    let token = tokens
        .get(start)
        .ok_or_else(|| PuppyError::syntax("Unexpected end of input"))?;

    match token {
        Token::LParen => {
            let (elements, next) = parse_group(tokens, start + 1, &Token::RParen)?;
            Ok((finish_group(elements), next))
        }
        Token::LBracket => {
            let (elements, next) = parse_group(tokens, start + 1, &Token::RBracket)?;
            let literal = RawExpr::List(vec![
                RawExpr::symbol(LIST_LITERAL),
                RawExpr::Bracket(elements),
            ]);
            Ok((literal, next))
        }
        Token::RParen | Token::RBracket => {
            Err(PuppyError::syntax(format!("Unexpected {token}")))
        }
        Token::Number(n) => Ok((RawExpr::Number(*n), start + 1)),
        Token::Symbol(s) => Ok((RawExpr::Symbol(s.clone()), start + 1)),
    }
}

/// Parse elements up to `closing`, returning them and the index just past it.
fn parse_group(tokens: &[Token], mut i: usize, closing: &Token) -> Result<(Vec<RawExpr>, usize)> {
    let mut elements = Vec::new();

    loop {
        match tokens.get(i) {
            None => {
                return Err(PuppyError::syntax(format!("Unclosed group (missing {closing})")));
            }
            Some(token) if token == closing => return Ok((elements, i + 1)),
            Some(_) => {
                let (element, next) = ensure_sufficient_stack(|| parse_expression(tokens, i))?;
                elements.push(element);
                i = next;
            }
        }
    }
}

/// Parse a whole token stream into its top-level expressions.
///
/// The top level is a plain sequence: it is never curried.
pub fn parse_tokens(tokens: &[Token]) -> Result<Vec<RawExpr>> {
    let mut expressions = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let (expr, next) = parse_expression(tokens, i)?;
        expressions.push(expr);
        i = next;
    }

    tracing::trace!(count = expressions.len(), "parsed top-level expressions");
    Ok(expressions)
}

/// Tokenize and parse source text.
pub fn parse(input: &str) -> Result<Vec<RawExpr>> {
    parse_tokens(&tokenize(input)?)
}
