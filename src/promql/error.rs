/// A PromQL syntax failure.
///
/// Carries the offending query so that it can flow downstream as an ordinary value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("promql parse error at byte {offset}: {message}")]
pub struct ParseError {
    /// The full query source that failed to parse.
    pub query: String,
    /// Byte offset of the failure within `query`.
    pub offset: usize,
    /// Human-readable reason.
    pub message: String,
}

impl ParseError {
    /// Build a parse error for `query` at byte `offset`.
    pub fn new(query: impl Into<String>, offset: usize, message: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            offset,
            message: message.into(),
        }
    }
}
