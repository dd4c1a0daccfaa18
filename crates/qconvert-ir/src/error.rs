//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur while reading Qobj documents, gate tables and
/// register layouts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Structurally invalid input.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A radix-prefixed integer field could not be parsed.
    #[error("Invalid integer literal '{0}'")]
    InvalidInteger(String),

    /// A condition mask that is not the full mask of exactly one register.
    #[error("Cannot find classical register by mask {mask:#x}")]
    MaskNotFound {
        /// The mask supplied by the condition.
        mask: u128,
    },

    /// A memory index outside every register.
    #[error("Memory bit {memory} does not belong to any classical register")]
    MemoryBitNotFound {
        /// The global memory index.
        memory: u64,
    },

    /// Register layout exceeds the addressable mask width.
    #[error("Classical register '{name}' ends at bit {end}, beyond the {max}-bit memory limit")]
    RegisterTooWide {
        /// Register name.
        name: String,
        /// One past the register's last bit.
        end: u32,
        /// Maximum supported width.
        max: u32,
    },

    /// Condition referenced before it was declared.
    #[error("Unknown classical condition {0}")]
    UnknownCondition(u64),

    /// Gate table could not be decoded.
    #[error("Invalid gate definition table: {0}")]
    GateTable(#[from] serde_json::Error),

    /// Gate table file could not be read.
    #[error("Failed to read gate definition table: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
