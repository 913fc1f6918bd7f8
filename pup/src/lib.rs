//! Puppy runtime - evaluator and standard library
//!
//! This crate provides the execution side of Puppy:
//! - Runtime values and the pair-encoded list codec
//! - Chained lexical environments
//! - Tree-walking evaluator with a depth guard
//! - Curried, type-guarded standard library
//! - Sessions that evaluate whole programs against a shared root scope

pub mod environment;
pub mod interpreter;
pub mod native;
pub mod session;
pub mod stdlib;
pub mod value;

// Re-export the front end so callers need only one crate
pub use puppy::{Ast, ErrorCategory, ErrorKind, PuppyError, Result, Symbol};

pub use environment::Environment;
pub use interpreter::{Evaluate, Interpreter};
pub use native::{list_to_pairs, pairs_to_list};
pub use session::{Config, DEFAULT_MAX_DEPTH, Outcome, Session, evaluate_program};
pub use stdlib::{exports, register_stdlib};
pub use value::{Function, Value, ValueKind};
