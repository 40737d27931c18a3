//! Error types for animlock

use thiserror::Error;

/// Core animlock errors
#[derive(Error, Debug)]
pub enum AnimLockError {
    // Payload errors
    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Mismatched animation lock offset: reported {reported}, payload {payload}")]
    LockMismatch { reported: f32, payload: f32 },

    // Detection
    #[error("Unexpected lock of {0} s, temporary dry run has been enabled")]
    AnomalousLock(f32),

    // Boundary
    #[error("Internal fault: {0}")]
    InternalFault(String),

    // Durability
    #[error("Persistence failed: {0}")]
    Persistence(String),

    // Configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for AnimLockError {
    fn from(err: std::io::Error) -> Self {
        AnimLockError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for AnimLockError {
    fn from(err: serde_json::Error) -> Self {
        AnimLockError::Config(err.to_string())
    }
}

/// Result type for animlock operations
pub type AnimLockResult<T> = Result<T, AnimLockError>;
