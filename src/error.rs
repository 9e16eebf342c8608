use thiserror::Error;

use crate::structure::StructureError;

/// Error types for the varstruct-rs library.
#[derive(Error, Debug)]
pub enum VarStructError {
    /// Error raised by the registry, its layout or a numeric mirror.
    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for varstruct-rs operations.
pub type Result<T> = std::result::Result<T, VarStructError>;

impl From<String> for VarStructError {
    fn from(s: String) -> Self {
        VarStructError::Other(s)
    }
}

impl From<&str> for VarStructError {
    fn from(s: &str) -> Self {
        VarStructError::Other(s.to_string())
    }
}
