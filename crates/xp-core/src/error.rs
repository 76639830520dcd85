//! Error types for phantom simulation

use thiserror::Error;

/// Phantom simulation error types
#[derive(Error, Debug)]
pub enum PhantomError {
    /// Slice shape does not match the volume's lateral shape
    #[error("Dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// Parameter is non-finite, non-positive or otherwise unusable
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Index past the end of a volume axis
    #[error("Index out of bounds: {axis} index {index} (len {len})")]
    IndexOutOfBounds {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    /// Voxel value outside the tissue label set
    #[error("Invalid tissue label: {0}")]
    InvalidLabel(u8),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for phantom operations
pub type PhantomResult<T> = Result<T, PhantomError>;

impl PhantomError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}
