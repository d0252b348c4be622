//! Runtime error types for the biota engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Fetch from an address outside memory; kills only the executing process
    #[error("Memory out of bounds: address {address:#x}")]
    OutOfBounds { address: usize },

    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("Unsupported snapshot version: expected {expected}, found {found}")]
    UnsupportedSnapshotVersion { expected: u32, found: u32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

impl RuntimeError {
    pub(crate) fn invalid_snapshot(reason: impl Into<String>) -> Self {
        RuntimeError::InvalidSnapshot {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
