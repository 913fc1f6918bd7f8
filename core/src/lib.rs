//! Language front end for Puppy
//!
//! This crate turns source text into typed syntax trees: lexing, the
//! curry-aware parser, and the tree builder. It does not evaluate anything;
//! the evaluator, runtime values and standard library live in the `pup` crate.

pub mod ast;
pub mod error;
pub mod interner;
pub mod lexer;
pub mod parser;
pub mod stack;

// Re-export commonly used items for convenience
pub use ast::{Ast, build, build_program};
pub use error::{ErrorCategory, ErrorKind, PuppyError, Result};
pub use interner::Symbol;
pub use lexer::{Token, tokenize};
pub use parser::{RawExpr, auto_curry, parse, parse_expression, parse_tokens};
pub use stack::ensure_sufficient_stack;
