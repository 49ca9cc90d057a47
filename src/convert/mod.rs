//! Panel and dashboard assembly on top of the translation pipeline.

pub(crate) mod dashboard;
pub(crate) mod diagnostics;
pub(crate) mod opts;
pub(crate) mod widget;

pub use dashboard::{Conversion, convert, convert_json_lossy, convert_str};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use opts::ConvertOpts;
pub use widget::WidgetAssembler;
