//! Model error taxonomy.

use thiserror::Error;

/// Failures a [`Model`](super::Model) operation can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The operation requires a resource that does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The supplied value does not conform to the resource type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A resource with the derived identifier already exists.
    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    /// Any other backend fault.
    #[error("backend error: {0}")]
    Unclassified(String),
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
