//! Errors raised by the structured-variable registry
//!
//! Every error is a local validation failure: the registry is a pure layout
//! structure, so the same sequence of calls always produces the same error.

use thiserror::Error;

/// Errors that can occur when building, freezing or querying a registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("Invalid shape: {message}")]
    InvalidShape { message: String },

    #[error("Name '{name}' is already attached in this group")]
    DuplicateName { name: String },

    #[error("Registry is frozen; cannot {operation}")]
    ImmutableRegistry { operation: String },

    #[error("An order has already been set for this registry")]
    OrderAlreadySet,

    #[error("Cannot interleave {names:?}: slot counts {counts:?} are incompatible")]
    IncompatibleInterleave { names: Vec<String>, counts: Vec<usize> },

    #[error("Registry is already frozen")]
    AlreadyFrozen,

    #[error("Path '{path}' not found: {reason}")]
    PathNotFound { path: String, reason: String },

    #[error("Registry is not frozen")]
    RegistryNotFrozen,

    #[error("Shape mismatch at '{path}': {message}")]
    ShapeMismatch { path: String, message: String },

    #[error("Order does not mention {missing:?}")]
    IncompleteOrder { missing: Vec<String> },

    #[error("Invalid path '{input}': {message}")]
    InvalidPath { input: String, message: String },
}

impl StructureError {
    pub(crate) fn not_found(path: impl ToString, reason: impl Into<String>) -> Self {
        StructureError::PathNotFound {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn shape_mismatch(path: impl ToString, message: impl Into<String>) -> Self {
        StructureError::ShapeMismatch {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn immutable(operation: &str) -> Self {
        StructureError::ImmutableRegistry {
            operation: operation.to_string(),
        }
    }
}
