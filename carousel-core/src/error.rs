//! Error types for scene operations.

use thiserror::Error;

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors that can occur in scene operations.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Invalid element operation.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// Template document failed validation.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
