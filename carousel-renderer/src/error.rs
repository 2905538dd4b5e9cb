//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while preparing or rasterizing a render job.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template cannot be rendered as given.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// The template id is malformed.
    #[error("Invalid template id: {0}")]
    InvalidTemplateId(String),

    /// No stored template with this id.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// The external rasterizer failed.
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// The external rasterizer did not finish in time.
    #[error("Rasterization timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Font catalog could not be parsed.
    #[error("Invalid font catalog: {0}")]
    FontCatalog(String),

    /// Filesystem or process I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<carousel_core::SceneError> for RenderError {
    fn from(err: carousel_core::SceneError) -> Self {
        match err {
            carousel_core::SceneError::Serialization(e) => Self::Serialization(e),
            other => Self::InvalidTemplate(other.to_string()),
        }
    }
}
