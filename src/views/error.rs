//! View engine error types

use thiserror::Error;

/// Template loading and rendering errors
#[derive(Debug, Error)]
pub enum ViewError {
    /// A template failed to parse or inherit
    #[error("Template error: {0}")]
    TemplateError(String),

    /// A template failed to render with the given context
    #[error("Render error: {0}")]
    RenderError(String),
}
