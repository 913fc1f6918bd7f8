//! Top-level evaluation of whole programs.
//!
//! A [`Session`] owns the root environment, so definitions made by one
//! program are visible to the next, while each top-level expression gets its
//! own [`Interpreter`] and depth budget.

use puppy::{Result, ast, parser};
use tracing::debug;

use crate::environment::Environment;
use crate::interpreter::{Evaluate, Interpreter};
use crate::stdlib::register_stdlib;
use crate::value::Value;

/// Default maximum evaluation depth per top-level expression.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Result of one top-level expression: `None` for a `define`.
pub type Outcome = Result<Option<Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Evaluate every top-level expression of `text` in `env`.
///
/// Unbalanced brackets fail the whole text before anything runs. After that
/// each expression succeeds or fails on its own, in source order.
pub fn evaluate_program(text: &str, env: &Environment, config: &Config) -> Result<Vec<Outcome>> {
    let expressions = parser::parse(text)?;

    Ok(expressions
        .iter()
        .map(|raw| -> Outcome {
            let tree = ast::build(raw)?;
            let mut interp = Interpreter::new(config.max_depth);
            let value = tree.evaluate(env, &mut interp)?;
            debug!(%tree, %value, "evaluated top-level expression");
            Ok((!tree.is_define()).then_some(value))
        })
        .collect())
}

/// An interpreter session holding the root environment.
pub struct Session {
    root: Environment,
    config: Config,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let root = Environment::new();
        register_stdlib(&root);
        Session { root, config }
    }

    pub fn root(&self) -> &Environment {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn evaluate_program(&self, text: &str) -> Result<Vec<Outcome>> {
        evaluate_program(text, &self.root, &self.config)
    }

    /// Evaluate `text`, stopping at the first error, and return the last
    /// expression's outcome.
    pub fn eval(&self, text: &str) -> Outcome {
        let mut last = None;
        for outcome in self.evaluate_program(text)? {
            last = outcome?;
        }
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puppy::ErrorKind;

    #[test]
    fn test_one_outcome_per_expression() {
        let session = Session::new();
        let outcomes = session
            .evaluate_program("(define x 2) (+ x 1) (head []) x")
            .unwrap();

        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0], Ok(None));
        assert_eq!(outcomes[1], Ok(Some(Value::number(3))));
        assert_eq!(outcomes[2].as_ref().unwrap_err().kind, ErrorKind::EmptyList);
        assert_eq!(outcomes[3], Ok(Some(Value::number(2))));
    }

    #[test]
    fn test_syntax_error_fails_whole_text() {
        let session = Session::new();
        let err = session.evaluate_program("(define y 1) (+ 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert!(!session.root().resolves(puppy::Symbol::new("y")));
    }

    #[test]
    fn test_malformed_if_fails_only_its_expression() {
        let session = Session::new();
        let outcomes = session.evaluate_program("(if 1 2) 5").unwrap();
        assert_eq!(outcomes[0].as_ref().unwrap_err().kind, ErrorKind::Syntax);
        assert_eq!(outcomes[1], Ok(Some(Value::number(5))));
    }

    #[test]
    fn test_config() {
        let config = Config::default().with_max_depth(64);
        assert_eq!(config.max_depth, 64);
        assert_eq!(Session::with_config(config).config().max_depth, 64);
        assert_eq!(Config::default().max_depth, DEFAULT_MAX_DEPTH);
    }
}
