use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// Everything that can go wrong in the network or its collaborators.
#[derive(Debug, Error)]
pub enum NetError {
    /// Invalid construction parameters (zero layer size, bad learning rate).
    #[error("invalid network configuration: {0}")]
    Configuration(String),

    /// An input or target vector does not match the layer it is fed to.
    #[error("{what} vector has length {actual}, expected {expected}")]
    InputShape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Operand shapes are incompatible for a matrix operation.
    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// A dataset row could not be turned into a sample.
    #[error("dataset row {row}: {reason}")]
    Dataset { row: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
