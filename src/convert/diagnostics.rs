use std::fmt;

use serde::Serialize;

/// A non-fatal note about one panel target that was dropped or translated lossily.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Title of the panel owning the target.
    pub panel: Option<String>,
    /// 0-based position of the target in the panel.
    pub target: usize,
    /// Target source text (empty when the target had no expression).
    pub query: String,
    /// What happened.
    pub kind: DiagnosticKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Diagnostic categories.
pub enum DiagnosticKind {
    /// The target has no `expr` (non-Prometheus data source). Dropped.
    MissingExpr,
    /// The expression failed to parse. Dropped.
    ParseFailed {
        /// Byte offset of the failure.
        offset: usize,
        /// Parser message.
        message: String,
    },
    /// The expression has no Datadog form. Dropped.
    Untranslatable,
    /// The expression is a bare scalar with no query to reference. Dropped.
    NumericOnly,
    /// A function has no Datadog mapping; the formula carries an empty function token.
    UnmappedFunction {
        /// Source function name.
        function: String,
    },
    /// Functions without a Datadog mapping made strict mode drop the target.
    RejectedFunctions {
        /// Source function names, outermost first.
        functions: Vec<String>,
    },
}

impl DiagnosticKind {
    /// `true` when the target produced no formula. At most one dropped diagnostic is
    /// reported per target.
    pub fn is_dropped(&self) -> bool {
        !matches!(self, Self::UnmappedFunction { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let panel = self.panel.as_deref().unwrap_or("<untitled>");
        write!(f, "panel '{panel}' target #{}", self.target)?;
        if !self.query.is_empty() {
            write!(f, " `{}`", self.query)?;
        }
        match &self.kind {
            DiagnosticKind::MissingExpr => write!(f, ": no PromQL expression, dropped"),
            DiagnosticKind::ParseFailed { offset, message } => {
                write!(f, ": parse error at byte {offset}: {message}, dropped")
            }
            DiagnosticKind::Untranslatable => write!(f, ": no Datadog equivalent, dropped"),
            DiagnosticKind::NumericOnly => write!(f, ": scalar-only expression, dropped"),
            DiagnosticKind::UnmappedFunction { function } => {
                write!(f, ": function '{function}' has no Datadog mapping")
            }
            DiagnosticKind::RejectedFunctions { functions } => {
                write!(
                    f,
                    ": no Datadog mapping for {}, dropped",
                    functions.join(", ")
                )
            }
        }
    }
}
