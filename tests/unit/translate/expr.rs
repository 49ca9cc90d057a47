use super::*;
use crate::promql::parse;

fn tr(src: &str) -> Option<TranslatedNode> {
    translate(&parse(src).unwrap())
}

fn selq(s: &str) -> Box<TranslatedNode> {
    Box::new(TranslatedNode::SelectorQuery(s.to_owned()))
}

#[test]
fn numbers_are_identity() {
    for v in [0.0, 1.0, -2.5, 1e9, f64::INFINITY] {
        assert_eq!(
            translate(&Expr::NumberLiteral(v)),
            Some(TranslatedNode::Number(v))
        );
    }
}

#[test]
fn bare_metric_gets_wildcard() {
    assert_eq!(tr("cpu"), Some(TranslatedNode::SelectorQuery("cpu{*}".to_owned())));
    assert_eq!(tr("cpu{}"), Some(TranslatedNode::SelectorQuery("cpu{*}".to_owned())));
}

#[test]
fn selectors_are_joined_and_lowercased_but_metric_is_not() {
    assert_eq!(
        tr(r#"Node_CPU{Host="Web-1", org="x", env=~"prod.*"}"#),
        Some(TranslatedNode::SelectorQuery(
            "Node_CPU{host:web-1, $org, env:prod}".to_owned()
        ))
    );
}

#[test]
fn aggregator_wraps_first_body_element() {
    assert_eq!(
        tr("avg by (host) (cpu)"),
        Some(TranslatedNode::AggregatedQuery {
            aggregator: "avg".to_owned(),
            inner: selq("cpu{*}"),
            labels: vec!["host".to_owned()],
        })
    );
}

#[test]
fn without_grouping_drops_labels() {
    match tr("sum without (pod) (cpu)") {
        Some(TranslatedNode::AggregatedQuery { labels, .. }) => assert!(labels.is_empty()),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn binary_recurses_both_sides() {
    assert_eq!(
        tr("a / 100"),
        Some(TranslatedNode::BinaryCombinator {
            left: selq("a{*}"),
            op: BinaryOperator::Div,
            right: Box::new(TranslatedNode::Number(100.0)),
        })
    );
}

#[test]
fn function_maps_name_and_keeps_extra_args_raw() {
    match tr("clamp_max(cpu, 100)") {
        Some(TranslatedNode::FunctionApplication {
            func,
            source_func,
            inner,
            extra_args,
        }) => {
            assert_eq!(func, Some("clamp_max"));
            assert_eq!(source_func, "clamp_max");
            assert_eq!(inner, selq("cpu{*}"));
            assert_eq!(extra_args, vec![Expr::NumberLiteral(100.0)]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn unmapped_function_is_absent_but_reported() {
    let node = tr("histogram_quantile(0.9, rate(lat_bucket[5m]))").unwrap();
    match &node {
        TranslatedNode::FunctionApplication { func, inner, .. } => {
            assert_eq!(*func, None);
            assert_eq!(**inner, TranslatedNode::Number(0.9));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(node.unmapped_functions(), vec!["histogram_quantile"]);
}

#[test]
fn unmapped_functions_are_collected_through_the_tree() {
    let node = tr("irate(a[1m]) + sum(abs(idelta(b[1m])))").unwrap();
    assert_eq!(node.unmapped_functions(), vec!["irate", "idelta"]);
}

#[test]
fn string_literals_are_untranslatable() {
    assert_eq!(translate(&Expr::StringLiteral("x".to_owned())), None);
    assert_eq!(tr(r#"label_join("a", "b")"#), None);
    // Absence propagates through combinators.
    assert_eq!(tr(r#"up + label_join("a", "b")"#), None);
}

#[test]
fn empty_bodies_are_untranslatable() {
    assert_eq!(tr("time()"), None);
    let agg = Expr::Aggregator {
        aggregator: "sum".to_owned(),
        body: Vec::new(),
        grouping: Grouping::None,
    };
    assert_eq!(translate(&agg), None);
}

#[test]
fn matcher_operators_are_not_represented() {
    for op in ["=", "!=", "=~", "!~"] {
        assert_eq!(
            tr(&format!(r#"cpu{{host{op}"web"}}"#)),
            Some(TranslatedNode::SelectorQuery("cpu{host:web}".to_owned())),
            "{op}"
        );
    }
}
