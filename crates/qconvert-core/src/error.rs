//! Error types for conversion.

use qconvert_expr::ExprError;
use qconvert_ir::IrError;
use thiserror::Error;

use crate::convert::Format;

/// Errors that can occur while interpreting an experiment or emitting a
/// backend result. Every variant aborts the whole conversion request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// Structurally invalid input (missing header, unknown register mask,
    /// mismatched list lengths, ...).
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Something referenced by the input could not be found.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// Gate parameter arity mismatch.
    #[error("Gate '{gate}' expects {expected} parameters, got {got}")]
    ParameterCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Expression evaluation failed.
    #[error("Failed to evaluate expression for gate '{gate}': {error}")]
    Evaluation {
        gate: String,
        #[source]
        error: ExprError,
    },

    /// Replacement chain loops or points at a missing definition.
    #[error("Cannot resolve replacement for gate '{gate}': {reason}")]
    ReplacementCycle { gate: String, reason: String },

    /// Unsupported source/destination pair.
    #[error("Unsupported conversion formats - source: {from} destination: {to}")]
    UnsupportedConversion { from: Format, to: Format },

    /// Interpreter or backend used out of order.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Gate table could not be loaded.
    #[error("Gate table error: {0}")]
    GateTable(#[source] IrError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<IrError> for ConvertError {
    fn from(e: IrError) -> Self {
        match e {
            IrError::MemoryBitNotFound { .. } | IrError::UnknownCondition(_) => {
                ConvertError::Lookup(e.to_string())
            }
            IrError::GateTable(_) | IrError::Io(_) => ConvertError::GateTable(e),
            _ => ConvertError::MalformedInput(e.to_string()),
        }
    }
}

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;
