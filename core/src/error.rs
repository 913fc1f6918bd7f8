//! Error types shared by every stage of the pipeline.

use std::fmt;

/// Specific failure kinds raised while lexing, parsing or evaluating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unbalanced brackets, malformed `if`/`define`, unrecognised shapes
    Syntax,
    /// Symbol not bound anywhere in the scope chain
    UnboundName,
    /// `define` of a name that already resolves
    Redefinition,
    /// Argument kind outside a primitive's allow-list
    Type,
    /// Division by zero
    DivisionByZero,
    /// `head`, `last`, `fold` and friends on the empty list
    EmptyList,
    /// `assert` on a falsy value
    Assertion,
    /// Argument of the right kind but outside the operation's domain
    Domain,
    /// Evaluation depth exceeded the configured maximum
    RecursionLimit,
}

/// The five error families reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    SyntaxError,
    NameError,
    TypeError,
    ValueError,
    ResourceError,
}

impl ErrorKind {
    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorKind::Syntax => ErrorCategory::SyntaxError,
            ErrorKind::UnboundName | ErrorKind::Redefinition => ErrorCategory::NameError,
            ErrorKind::Type => ErrorCategory::TypeError,
            ErrorKind::DivisionByZero
            | ErrorKind::EmptyList
            | ErrorKind::Assertion
            | ErrorKind::Domain => ErrorCategory::ValueError,
            ErrorKind::RecursionLimit => ErrorCategory::ResourceError,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorCategory::SyntaxError => "SyntaxError",
            ErrorCategory::NameError => "NameError",
            ErrorCategory::TypeError => "TypeError",
            ErrorCategory::ValueError => "ValueError",
            ErrorCategory::ResourceError => "ResourceError",
        };
        f.write_str(label)
    }
}

/// An error raised by the interpreter, carrying a human-readable message.
///
/// Errors abort only the top-level expression that raised them; the driver
/// reports them and moves on.
#[derive(Debug, Clone, PartialEq)]
pub struct PuppyError {
    /// The category of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

pub type Result<T> = std::result::Result<T, PuppyError>;

impl PuppyError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn syntax(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, what)
    }

    pub fn unbound(name: impl fmt::Display) -> Self {
        Self::new(ErrorKind::UnboundName, format!("Could not find symbol {name}"))
    }

    pub fn redefinition(name: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Redefinition, format!("Cannot redefine name {name}"))
    }

    /// Build the message produced by a failed runtime type guard.
    pub fn type_mismatch(function: &str, allowed: &[&str], actual: &str) -> Self {
        Self::new(
            ErrorKind::Type,
            format!(
                "Function '{function}' expected the type of the argument given to be one of \
                 [{}], but got an argument of type '{actual}'.",
                allowed.join(", ")
            ),
        )
    }

    pub fn not_callable(what: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Type, format!("Cannot apply non-function: {what}"))
    }

    pub fn division_by_zero(function: &str) -> Self {
        Self::new(ErrorKind::DivisionByZero, format!("{function}: division by zero"))
    }

    pub fn empty_list(function: &str) -> Self {
        Self::new(ErrorKind::EmptyList, format!("{function}: empty list"))
    }

    pub fn assertion() -> Self {
        Self::new(ErrorKind::Assertion, "assertion failed")
    }

    pub fn domain(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Domain, what)
    }

    pub fn recursion_limit(max_depth: usize) -> Self {
        Self::new(
            ErrorKind::RecursionLimit,
            format!("maximum evaluation depth of {max_depth} exceeded"),
        )
    }
}

impl fmt::Display for PuppyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category(), self.message)
    }
}

impl std::error::Error for PuppyError {}

impl From<PuppyError> for String {
    fn from(err: PuppyError) -> String {
        err.to_string()
    }
}
