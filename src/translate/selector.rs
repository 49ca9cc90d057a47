use crate::promql::ast::Selector;

/// Rewrite one label matcher into a Datadog filter fragment.
///
/// `organization` and `org` map to the `$organization` / `$org` template-variable shorthand
/// regardless of operator and value. Every other matcher becomes `label:value` with the value
/// cleaned by [`clean_value`]; the operator is not represented.
pub fn translate_selector(selector: &Selector) -> String {
    match selector.label.as_str() {
        "organization" => "$organization".to_owned(),
        "org" => "$org".to_owned(),
        label => format!("{label}:{}", clean_value(&selector.value)),
    }
}

/// Approximate a PromQL regex value as a Datadog glob.
///
/// In order: `..` becomes `*`, `.*` is removed, and repeated slashes collapse to one. Other
/// regex metacharacters pass through unchanged.
pub fn clean_value(value: &str) -> String {
    let mut out = value.replace("..", "*").replace(".*", "");
    while out.contains("//") {
        out = out.replace("//", "/");
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/translate/selector.rs"]
mod tests;
