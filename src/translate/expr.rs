use crate::promql::ast::{BinaryOperator, Expr, Grouping, MatchOp, Selector};
use crate::translate::functions::map_function;
use crate::translate::selector::translate_selector;

#[derive(Clone, Debug, PartialEq)]
/// Intermediate form between a PromQL tree and flattened Datadog queries.
pub enum TranslatedNode {
    /// Scalar literal, kept as-is.
    Number(f64),
    /// Datadog filter string, e.g. `cpu{host:a, env:prod}`.
    SelectorQuery(String),
    /// Space aggregation over `inner`, optionally grouped.
    AggregatedQuery {
        /// Aggregator name as written in PromQL.
        aggregator: String,
        /// Aggregated series.
        inner: Box<TranslatedNode>,
        /// `by` labels; empty means no grouping.
        labels: Vec<String>,
    },
    /// Arithmetic or set combination of two sides.
    BinaryCombinator {
        /// Left side.
        left: Box<TranslatedNode>,
        /// Operator.
        op: BinaryOperator,
        /// Right side.
        right: Box<TranslatedNode>,
    },
    /// Function applied to `inner`.
    FunctionApplication {
        /// Mapped Datadog function, `None` when the source function has no mapping.
        func: Option<&'static str>,
        /// Source PromQL function name.
        source_func: String,
        /// Transformed argument.
        inner: Box<TranslatedNode>,
        /// Remaining arguments, not translated.
        extra_args: Vec<Expr>,
    },
}

impl TranslatedNode {
    /// Source names of functions without a Datadog mapping, outermost first.
    pub fn unmapped_functions(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_unmapped(&mut out);
        out
    }

    fn collect_unmapped<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Number(_) | Self::SelectorQuery(_) => {}
            Self::AggregatedQuery { inner, .. } => inner.collect_unmapped(out),
            Self::BinaryCombinator { left, right, .. } => {
                left.collect_unmapped(out);
                right.collect_unmapped(out);
            }
            Self::FunctionApplication {
                func,
                source_func,
                inner,
                ..
            } => {
                if func.is_none() {
                    out.push(source_func);
                }
                inner.collect_unmapped(out);
            }
        }
    }
}

/// Translate a parsed PromQL expression.
///
/// Returns `None` for shapes Datadog cannot express (string literals, calls without
/// arguments); `None` anywhere below a node makes the whole node `None`.
pub fn translate(expr: &Expr) -> Option<TranslatedNode> {
    match expr {
        Expr::NumberLiteral(v) => Some(TranslatedNode::Number(*v)),
        Expr::StringLiteral(_) => None,
        Expr::MetricSelector { metric, selectors } => Some(TranslatedNode::SelectorQuery(
            selector_query(metric, selectors),
        )),
        Expr::Aggregator {
            aggregator,
            body,
            grouping,
        } => {
            let inner = translate(body.first()?)?;
            let labels = match grouping {
                Grouping::None => Vec::new(),
                Grouping::By(labels) => labels.clone(),
                Grouping::Without(labels) => {
                    tracing::debug!(
                        %aggregator,
                        ?labels,
                        "`without` grouping has no Datadog equivalent; aggregating over all series"
                    );
                    Vec::new()
                }
            };
            Some(TranslatedNode::AggregatedQuery {
                aggregator: aggregator.clone(),
                inner: Box::new(inner),
                labels,
            })
        }
        Expr::BinaryOp { left, op, right } => Some(TranslatedNode::BinaryCombinator {
            left: Box::new(translate(left)?),
            op: *op,
            right: Box::new(translate(right)?),
        }),
        Expr::FunctionCall { func, body } => {
            let (first, rest) = body.split_first()?;
            Some(TranslatedNode::FunctionApplication {
                func: map_function(func),
                source_func: func.clone(),
                inner: Box::new(translate(first)?),
                extra_args: rest.to_vec(),
            })
        }
    }
}

/// `metric{sel, sel}` with the selector list lower-cased, or `metric{*}` when empty.
fn selector_query(metric: &str, selectors: &[Selector]) -> String {
    if selectors.is_empty() {
        return format!("{metric}{{*}}");
    }
    for s in selectors.iter().filter(|s| s.op != MatchOp::Equal) {
        tracing::debug!(
            %metric,
            label = %s.label,
            op = s.op.as_str(),
            "matcher operator not representable; filtering on the value"
        );
    }
    let joined = selectors
        .iter()
        .map(translate_selector)
        .collect::<Vec<_>>()
        .join(", ")
        .to_lowercase();
    format!("{metric}{{{joined}}}")
}

#[cfg(test)]
#[path = "../../tests/unit/translate/expr.rs"]
mod tests;
