//! Error types for rendering.

/// Error returned when rendering fails.
///
/// Malformed markup and unknown tags are never errors. Only collaborators
/// (sanitizer, templates, custom transformations) can fail a render call, and
/// their failures are propagated unchanged.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The sanitizer rejected a fragment.
    #[error("Sanitizer failed: {0}")]
    Sanitizer(String),

    /// A template could not be loaded or rendered.
    #[error("Template '{name}' failed: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// A rule asked for a template but the renderer has none configured.
    #[error("No template renderer configured for template '{0}'")]
    TemplateUnavailable(String),

    /// A custom tag transformation failed.
    #[error("Transformation for tag '{tag}' failed: {message}")]
    Transform { tag: String, message: String },
}
