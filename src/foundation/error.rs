/// Convenience result type used across Certiforge.
pub type CertResult<T> = Result<T, CertError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Binding never fails on absent data: a missing placeholder value is reported as a
/// [`crate::BindWarning::MissingField`] next to the bound document instead.
#[derive(thiserror::Error, Debug)]
pub enum CertError {
    /// An operation referenced an element or identifier that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An attribute value lies outside its allowed domain.
    #[error("validation error: {0}")]
    Validation(String),

    /// A stored scene document could not be parsed.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A specific certificate could not be rasterized.
    #[error("render failure: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CertError {
    /// Build a [`CertError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`CertError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CertError::MalformedDocument`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    /// Build a [`CertError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Re-tag any error as a row-scoped render failure, keeping its message.
    ///
    /// Errors that are already [`CertError::Render`] pass through unchanged.
    pub fn into_render(self) -> Self {
        match self {
            Self::Render(msg) => Self::Render(msg),
            Self::Other(e) => Self::Render(format!("{e:#}")),
            other => Self::Render(other.to_string()),
        }
    }

    /// Short machine-readable kind label (used in batch manifests).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_failed",
            Self::MalformedDocument(_) => "malformed_document",
            Self::Render(_) => "render_failure",
            Self::Other(_) => "other",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
