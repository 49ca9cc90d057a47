//! grafdog converts Grafana dashboards into Datadog dashboards.
//!
//! The interesting part is the query translation: every PromQL panel target is parsed,
//! rewritten into Datadog metric queries and flattened into named sub-queries plus a formula
//! that recombines them.
//!
//! # Pipeline overview
//!
//! 1. **Parse**: `&str -> promql::Expr` (hand-written lexer and recursive-descent parser)
//! 2. **Translate**: `Expr -> TranslatedNode` (selectors, aggregations, the function table)
//! 3. **Flatten**: `TranslatedNode -> FlattenedQueries` (named queries and formulas per widget)
//! 4. **Assemble**: panels into widgets, the dashboard into a [`datadog::DatadogDashboard`]
//!
//! Targets that cannot be converted never fail the dashboard. They are dropped and reported
//! as [`Diagnostic`] values next to the output.
//!
//! ```
//! let json = r#"{"panels":[{"type":"graph","targets":[{"expr":"rate(hits[5m])"}]}]}"#;
//! let out = grafdog::convert_str(json, &grafdog::ConvertOpts::default()).unwrap();
//! assert_eq!(out.dashboard.widgets.len(), 1);
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod convert;
mod foundation;

pub mod datadog;
pub mod grafana;
pub mod promql;
pub mod translate;

pub use convert::{
    Conversion, ConvertOpts, Diagnostic, DiagnosticKind, WidgetAssembler, convert,
    convert_json_lossy, convert_str,
};
pub use foundation::error::{GrafdogError, GrafdogResult};
