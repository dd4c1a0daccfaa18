//! Error types for expression compilation and evaluation.

use thiserror::Error;

/// Errors that can occur while compiling or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ExprError {
    /// Lexer error (invalid character sequence).
    #[error("Invalid token '{token}' at position {position} in expression '{expression}'")]
    InvalidToken {
        expression: String,
        position: usize,
        token: String,
    },

    /// Unexpected token.
    #[error("Unexpected token in expression '{expression}': expected {expected}, found {found}")]
    UnexpectedToken {
        expression: String,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of expression '{expression}': expected {expected}")]
    UnexpectedEof {
        expression: String,
        expected: String,
    },

    /// Call to a function that is not part of the built-in environment.
    #[error("Unknown function '{name}' in expression '{expression}'")]
    UnknownFunction { expression: String, name: String },

    /// Wrong number of arguments to a built-in function.
    #[error("Function '{name}' expects {expected} argument(s), got {got} in expression '{expression}'")]
    WrongArgumentCount {
        expression: String,
        name: String,
        expected: usize,
        got: usize,
    },

    /// Identifier bound neither by the caller nor by the environment.
    #[error("Unknown identifier '{name}' in expression '{expression}'")]
    UnknownIdentifier { expression: String, name: String },
}

/// Result type for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;
