use super::*;
use crate::promql::ast::MatchOp;

fn matcher(label: &str, op: MatchOp, value: &str) -> Selector {
    Selector {
        label: label.to_owned(),
        op,
        value: value.to_owned(),
    }
}

#[test]
fn org_labels_become_template_variables() {
    for op in [
        MatchOp::Equal,
        MatchOp::NotEqual,
        MatchOp::Regex,
        MatchOp::NotRegex,
    ] {
        for value in ["", "acme", "$org", "a..b"] {
            assert_eq!(
                translate_selector(&matcher("organization", op, value)),
                "$organization"
            );
            assert_eq!(translate_selector(&matcher("org", op, value)), "$org");
        }
    }
}

#[test]
fn other_labels_keep_label_and_cleaned_value() {
    assert_eq!(
        translate_selector(&matcher("status", MatchOp::Regex, "5..")),
        "status:5*"
    );
    assert_eq!(
        translate_selector(&matcher("path", MatchOp::Equal, "/api//v1")),
        "path:/api/v1"
    );
    assert_eq!(
        translate_selector(&matcher("host", MatchOp::NotEqual, "web-1")),
        "host:web-1"
    );
}

#[test]
fn cleaning_applies_rules_in_order() {
    assert_eq!(clean_value(".*"), "");
    assert_eq!(clean_value("prod-.*"), "prod-");
    assert_eq!(clean_value("4.."), "4*");
    // `..` wins over `.*` because it runs first.
    assert_eq!(clean_value("a..*"), "a**");
    assert_eq!(clean_value("GET|POST"), "GET|POST");
}

#[test]
fn cleaning_is_idempotent() {
    for v in [
        "..", "...", "....", ".*", "..*", "...*", ".*.*", "a.*.b", "/.*/", "//", "///", "////",
        "x..y.*z//w", "5..|4..", "",
    ] {
        let once = clean_value(v);
        assert_eq!(clean_value(&once), once, "not idempotent for {v:?}");
    }
}
