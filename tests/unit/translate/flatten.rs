use super::*;
use crate::datadog::model::DataSource;
use crate::promql::parse;
use crate::translate::expr::translate;

fn node(src: &str) -> TranslatedNode {
    translate(&parse(src).unwrap()).unwrap()
}

fn flatten_all(naming: NamingScheme, targets: &[&str]) -> FlattenedQueries {
    let mut f = Flattener::new(naming);
    for (i, src) in targets.iter().enumerate() {
        f.push(&node(src), i);
    }
    f.finish()
}

fn formulas(out: &FlattenedQueries) -> Vec<&str> {
    out.formulas.iter().map(|f| f.formula.as_str()).collect()
}

fn names(out: &FlattenedQueries) -> Vec<&str> {
    out.queries.iter().map(|q| q.name.as_str()).collect()
}

#[test]
fn binary_of_two_selectors() {
    for naming in [NamingScheme::Sequential, NamingScheme::Positional] {
        let out = flatten_all(naming, &["a + b"]);
        assert_eq!(formulas(&out), vec!["query0+query1"]);
        assert_eq!(out.queries.len(), 2);
        assert_eq!(out.queries[0], NamedQuery::new("a{*}", "query0"));
        assert_eq!(out.queries[1], NamedQuery::new("b{*}", "query1"));
        assert!(out.queries.iter().all(|q| q.data_source == DataSource::Metrics));
    }
}

#[test]
fn aggregation_rewrites_query_with_grouping() {
    let out = flatten_all(NamingScheme::Sequential, &["avg by (host) (cpu)"]);
    assert_eq!(out.queries[0].query, "avg:cpu{*} by {host}");
    assert!(out.queries[0].query.ends_with("cpu{*} by {host}"));
    assert_eq!(formulas(&out), vec!["query0"]);

    let out = flatten_all(NamingScheme::Sequential, &["max(cpu)"]);
    assert_eq!(out.queries[0].query, "max:cpu{*}");
}

#[test]
fn rate_becomes_per_second() {
    let out = flatten_all(
        NamingScheme::Sequential,
        &[r#"rate(http_requests_total{status="500"}[5m])"#],
    );
    assert_eq!(formulas(&out), vec!["per_second(query0)"]);
    assert_eq!(out.queries.len(), 1);
    assert!(out.queries[0].query.starts_with("http_requests_total{"));
    assert_eq!(out.queries[0].query, "http_requests_total{status:500}");
}

#[test]
fn aggregation_keeps_inner_function() {
    let out = flatten_all(NamingScheme::Sequential, &["sum(rate(x[5m])) by (host)"]);
    assert_eq!(out.queries[0].query, "sum:x{*} by {host}");
    assert_eq!(formulas(&out), vec!["per_second(query0)"]);
}

#[test]
fn functions_inside_combinators_are_kept() {
    let out = flatten_all(NamingScheme::Sequential, &["rate(a[5m]) / rate(b[5m])"]);
    assert_eq!(formulas(&out), vec!["per_second(query0)/per_second(query1)"]);
}

#[test]
fn functions_wrap_combinators() {
    let out = flatten_all(NamingScheme::Sequential, &["abs(a - b)"]);
    assert_eq!(formulas(&out), vec!["abs(query0-query1)"]);
}

#[test]
fn unmapped_function_leaves_empty_token() {
    let out = flatten_all(NamingScheme::Sequential, &["topk(3, cpu)"]);
    assert_eq!(formulas(&out), vec!["(query0)"]);
    assert_eq!(out.queries[0].query, "3");

    let out = flatten_all(NamingScheme::Sequential, &["irate(cpu[1m])"]);
    assert_eq!(formulas(&out), vec!["(query0)"]);
    assert_eq!(out.queries[0].query, "cpu{*}");
}

#[test]
fn extra_arguments_are_dropped() {
    let out = flatten_all(NamingScheme::Sequential, &["clamp_min(cpu, 0)"]);
    assert_eq!(formulas(&out), vec!["clamp_min(query0)"]);
    assert_eq!(out.queries.len(), 1);
}

#[test]
fn grouping_survives_flattening() {
    let out = flatten_all(
        NamingScheme::Sequential,
        &["(a + b) * c", "a - (b - c)", "a + b * c", "a - b - c", "2 ^ 3 ^ a"],
    );
    assert_eq!(
        formulas(&out),
        vec![
            "(query0+query1)*query2",
            "query3-(query4-query5)",
            "query6+query7*query8",
            "query9-query10-query11",
            "2^3^query12",
        ]
    );
}

#[test]
fn numbers_and_word_operators_render_literally() {
    let out = flatten_all(
        NamingScheme::Sequential,
        &["a * 100", "a / 0.5", "a and b", "a > 1e3"],
    );
    assert_eq!(
        formulas(&out),
        vec![
            "query0*100",
            "query1/0.5",
            "query2 and query3",
            "query4>1000"
        ]
    );
}

#[test]
fn positional_naming_collides_in_nested_trees() {
    let out = flatten_all(NamingScheme::Positional, &["(a + b) + c"]);
    assert_eq!(formulas(&out), vec!["query0+query1+query1"]);
    assert_eq!(names(&out), vec!["query0", "query1", "query1"]);
}

#[test]
fn positional_naming_collides_across_targets() {
    let out = flatten_all(NamingScheme::Positional, &["a + b", "c"]);
    assert_eq!(names(&out), vec!["query0", "query1", "query1"]);
    assert_eq!(formulas(&out), vec!["query0+query1", "query1"]);
}

#[test]
fn sequential_naming_is_unique_per_widget() {
    let out = flatten_all(
        NamingScheme::Sequential,
        &["(a + b) + c", "c", "rate(d[1m]) / (e - f)"],
    );
    let mut seen = names(&out);
    assert_eq!(seen.len(), 7);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 7);
    assert_eq!(
        formulas(&out),
        vec![
            "query0+query1+query2",
            "query3",
            "per_second(query4)/(query5-query6)"
        ]
    );
}

#[test]
fn skipped_targets_append_nothing() {
    let mut f = Flattener::new(NamingScheme::Sequential);
    assert_eq!(f.push(&node("42"), 0), PushOutcome::NumericOnly);
    assert_eq!(f.push(&node("sum(a + b)"), 1), PushOutcome::Untranslatable);
    assert_eq!(f.push(&node("sum(5)"), 2), PushOutcome::Untranslatable);
    assert_eq!(f.push(&node("a"), 3), PushOutcome::Emitted);
    let out = f.finish();
    assert_eq!(names(&out), vec!["query0"]);
    assert_eq!(formulas(&out), vec!["query0"]);
}

#[test]
fn positional_names_follow_target_index() {
    let mut f = Flattener::new(NamingScheme::Positional);
    f.push(&node("a"), 2);
    let out = f.finish();
    assert_eq!(names(&out), vec!["query2"]);
}

#[test]
fn negative_literals_are_grouped_after_operators() {
    let out = flatten_all(
        NamingScheme::Sequential,
        &["a - -5", "-5 + a", "a * -2", "a ^ -1"],
    );
    assert_eq!(
        formulas(&out),
        vec!["query0-(-5)", "-5+query1", "query2*(-2)", "query3^(-1)"]
    );
}

#[test]
fn non_finite_literals_are_untranslatable() {
    let mut f = Flattener::new(NamingScheme::Sequential);
    assert_eq!(f.push(&node("a > Inf"), 0), PushOutcome::Untranslatable);
    assert_eq!(f.push(&node("a + NaN"), 1), PushOutcome::Untranslatable);
    assert_eq!(f.push(&node("-Inf"), 2), PushOutcome::Untranslatable);
    assert_eq!(f.push(&node("abs(inf)"), 3), PushOutcome::Untranslatable);
    assert_eq!(f.push(&node("a > 1"), 4), PushOutcome::Emitted);
    let out = f.finish();
    assert_eq!(formulas(&out), vec!["query0>1"]);
}
