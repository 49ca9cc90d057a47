/// PromQL function name → Datadog formula function name.
const FUNCTION_MAP: &[(&str, &str)] = &[
    ("abs", "abs"),
    ("clamp_min", "clamp_min"),
    ("clamp_max", "clamp_max"),
    ("deriv", "derivative"),
    ("log2", "log2"),
    ("log10", "log10"),
    ("delta", "dt"),
    ("rate", "per_second"),
];

/// Map a PromQL function name; `None` when Datadog has no listed equivalent.
pub fn map_function(name: &str) -> Option<&'static str> {
    FUNCTION_MAP
        .iter()
        .find(|(src, _)| *src == name)
        .map(|(_, dst)| *dst)
}
