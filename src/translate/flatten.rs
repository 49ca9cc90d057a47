use serde::{Deserialize, Serialize};

use crate::datadog::model::{FlattenedQueries, Formula, NamedQuery};
use crate::promql::ast::BinaryOperator;
use crate::translate::expr::TranslatedNode;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// How sub-query names are generated within one widget.
pub enum NamingScheme {
    /// A counter shared by the whole widget: `query0`, `query1`, ... in formula order.
    /// Names never repeat within a widget.
    #[default]
    Sequential,
    /// Legacy scheme: target `i` names its leftmost query `query{i}` and every right operand
    /// `query{i+1}`, at every depth. Nested trees and neighbouring targets can collide.
    Positional,
}

/// Outcome of flattening one source target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// A formula (and its queries) was appended.
    Emitted,
    /// The target has no Datadog form; nothing was appended.
    Untranslatable,
    /// The target is a bare scalar; nothing was appended.
    NumericOnly,
}

/// Massaged form of one target: leaves carry their positional slot, names come later.
#[derive(Debug, Clone, PartialEq)]
enum Massaged {
    Number(f64),
    Query {
        query: String,
        slot: usize,
    },
    Apply {
        func: Option<&'static str>,
        inner: Box<Massaged>,
    },
    Combine {
        left: Box<Massaged>,
        op: BinaryOperator,
        right: Box<Massaged>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Accumulates the flattened queries and formulas of one widget.
///
/// Call [`Flattener::push`] once per source target, in source order, then
/// [`Flattener::finish`].
#[derive(Debug)]
pub struct Flattener {
    naming: NamingScheme,
    next_name: usize,
    out: FlattenedQueries,
}

impl Flattener {
    /// Empty flattener using `naming`.
    pub fn new(naming: NamingScheme) -> Self {
        Self {
            naming,
            next_name: 0,
            out: FlattenedQueries::default(),
        }
    }

    /// Flatten the translated target found at position `index` of the panel's target list.
    pub fn push(&mut self, node: &TranslatedNode, index: usize) -> PushOutcome {
        match massage(node, index) {
            None => PushOutcome::Untranslatable,
            Some(Massaged::Number(v)) => {
                tracing::debug!(value = v, "scalar-only target has no query to reference");
                PushOutcome::NumericOnly
            }
            Some(m) => {
                let mut formula = String::new();
                self.render(m, None, &mut formula);
                self.out.formulas.push(Formula { formula });
                PushOutcome::Emitted
            }
        }
    }

    /// Flattened queries and formulas collected so far.
    pub fn finish(self) -> FlattenedQueries {
        self.out
    }

    fn allocate_name(&mut self, slot: usize) -> String {
        match self.naming {
            NamingScheme::Positional => format!("query{slot}"),
            NamingScheme::Sequential => {
                let n = self.next_name;
                self.next_name += 1;
                format!("query{n}")
            }
        }
    }

    /// Append the formula text of `m`, pushing its queries left to right.
    fn render(&mut self, m: Massaged, parent: Option<(BinaryOperator, Side)>, f: &mut String) {
        match m {
            Massaged::Number(v) => {
                // `a - -5` must not render as `query0--5`.
                let grouped = v < 0.0
                    && parent.is_some_and(|(op, side)| {
                        side == Side::Right || op == BinaryOperator::Pow
                    });
                if grouped {
                    f.push('(');
                }
                f.push_str(&v.to_string());
                if grouped {
                    f.push(')');
                }
            }
            Massaged::Query { query, slot } => {
                let name = self.allocate_name(slot);
                f.push_str(&name);
                self.out.queries.push(NamedQuery::new(query, name));
            }
            Massaged::Apply { func, inner } => {
                f.push_str(func.unwrap_or_default());
                f.push('(');
                self.render(*inner, None, f);
                f.push(')');
            }
            Massaged::Combine { left, op, right } => {
                let grouped =
                    parent.is_some_and(|(parent_op, side)| needs_parens(op, parent_op, side));
                if grouped {
                    f.push('(');
                }
                self.render(*left, Some((op, Side::Left)), f);
                if op.is_word() {
                    f.push(' ');
                    f.push_str(op.as_str());
                    f.push(' ');
                } else {
                    f.push_str(op.as_str());
                }
                self.render(*right, Some((op, Side::Right)), f);
                if grouped {
                    f.push(')');
                }
            }
        }
    }
}

/// Whether a child combinator must be parenthesized to keep the source grouping.
fn needs_parens(child: BinaryOperator, parent: BinaryOperator, side: Side) -> bool {
    let (c, p) = (child.precedence(), parent.precedence());
    if c != p {
        return c < p;
    }
    match side {
        Side::Left => parent.is_right_assoc(),
        Side::Right => !parent.is_right_assoc(),
    }
}

fn massage(node: &TranslatedNode, slot: usize) -> Option<Massaged> {
    match node {
        TranslatedNode::Number(v) if !v.is_finite() => {
            tracing::debug!(value = v, "Datadog formulas have no infinite or NaN literal");
            None
        }
        TranslatedNode::Number(v) => Some(Massaged::Number(*v)),
        TranslatedNode::SelectorQuery(q) => Some(Massaged::Query {
            query: q.clone(),
            slot,
        }),
        TranslatedNode::AggregatedQuery {
            aggregator,
            inner,
            labels,
        } => {
            let grouping = if labels.is_empty() {
                String::new()
            } else {
                format!(" by {{{}}}", labels.join(", "))
            };
            let inner = massage(inner, slot)?;
            aggregate(inner, aggregator, &grouping)
        }
        TranslatedNode::BinaryCombinator { left, op, right } => Some(Massaged::Combine {
            left: Box::new(massage(left, slot)?),
            op: *op,
            right: Box::new(massage(right, slot + 1)?),
        }),
        TranslatedNode::FunctionApplication {
            func,
            source_func,
            inner,
            extra_args,
        } => {
            if !extra_args.is_empty() {
                tracing::debug!(
                    func = %source_func,
                    dropped = extra_args.len(),
                    "dropping extra function arguments"
                );
            }
            let inner = match massage(inner, slot)? {
                Massaged::Number(v) => Massaged::Query {
                    query: v.to_string(),
                    slot,
                },
                other => other,
            };
            Some(Massaged::Apply {
                func: *func,
                inner: Box::new(inner),
            })
        }
    }
}

/// Rewrite every leaf query under `m` to `{aggregator}:{query}{grouping}`.
///
/// Numbers and combinators cannot be space-aggregated in a single Datadog query.
fn aggregate(m: Massaged, aggregator: &str, grouping: &str) -> Option<Massaged> {
    match m {
        Massaged::Query { query, slot } => Some(Massaged::Query {
            query: format!("{aggregator}:{query}{grouping}"),
            slot,
        }),
        Massaged::Apply { func, inner } => Some(Massaged::Apply {
            func,
            inner: Box::new(aggregate(*inner, aggregator, grouping)?),
        }),
        Massaged::Number(_) | Massaged::Combine { .. } => {
            tracing::debug!(
                %aggregator,
                "aggregation over a scalar or formula is not representable"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/translate/flatten.rs"]
mod tests;
