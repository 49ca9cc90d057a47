/// Convenience result type used across grafdog.
pub type GrafdogResult<T> = Result<T, GrafdogError>;

/// Top-level error taxonomy used by the conversion APIs.
///
/// Per-target failures, PromQL parse errors included, never surface here; they are
/// recovered locally and reported as [`crate::Diagnostic`] values.
#[derive(thiserror::Error, Debug)]
pub enum GrafdogError {
    /// Malformed or structurally invalid dashboard input.
    #[error("input error: {0}")]
    Input(String),

    /// Errors when serializing the converted dashboard.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GrafdogError {
    /// Build a [`GrafdogError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`GrafdogError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
