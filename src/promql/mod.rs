//! PromQL front end: a hand-written lexer and recursive-descent parser producing [`Expr`].
//!
//! The grammar covers what Grafana dashboards put in panel targets. Constructs the Datadog
//! side cannot express (ranges, offsets, vector matching) are parsed and dropped.

pub(crate) mod ast;
pub(crate) mod error;
pub(crate) mod lexer;
pub(crate) mod parser;

pub use ast::{BinaryOperator, Expr, Grouping, MatchOp, Selector};
pub use error::ParseError;
pub use parser::parse;
