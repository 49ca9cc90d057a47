use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::error::{GrafdogError, GrafdogResult};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
/// The subset of a Grafana dashboard that the converter reads.
///
/// Every field defaults when missing or `null`; unknown fields are ignored.
pub struct GrafanaDashboard {
    /// Dashboard title.
    #[serde(default)]
    pub title: Option<String>,
    /// Template variable definitions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub templating: Templating,
    /// Top-level panels in dashboard order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub panels: Vec<Panel>,
}

impl GrafanaDashboard {
    /// Parse a dashboard from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GrafdogResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| GrafdogError::input(format!("parse Grafana dashboard JSON: {e}")))
    }

    /// Parse a dashboard from a JSON string.
    pub fn from_json(s: &str) -> GrafdogResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| GrafdogError::input(format!("parse Grafana dashboard JSON: {e}")))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
/// `templating` block.
pub struct Templating {
    /// Variables.
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: Vec<TemplateVar>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// One template variable; only its name is used.
pub struct TemplateVar {
    /// Variable name as referenced with `$name`. Empty when the source has none.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
/// A panel, or a row containing panels.
pub struct Panel {
    /// Panel type (`row`, `text`, `graph`, `timeseries`, ...).
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Panel title.
    #[serde(default)]
    pub title: Option<String>,
    /// Children of a collapsed row.
    #[serde(default, deserialize_with = "null_as_default")]
    pub panels: Vec<Panel>,
    /// `true` when a row is collapsed and holds its children in `panels`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub collapsed: bool,
    /// Query targets.
    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Vec<Target>,
}

impl Panel {
    /// Row containers become group widgets.
    pub fn is_row(&self) -> bool {
        self.kind == "row"
    }

    /// Text panels have no queries.
    pub fn is_text(&self) -> bool {
        self.kind == "text"
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
/// One panel query.
pub struct Target {
    /// PromQL expression. Targets of other data sources have none.
    #[serde(default)]
    pub expr: Option<String>,
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "../../tests/unit/grafana/model.rs"]
mod tests;
