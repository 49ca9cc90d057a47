use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Datadog query data source; only metrics queries are produced.
pub enum DataSource {
    /// `"metrics"`
    #[default]
    Metrics,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One independently executable sub-query, referenced from formulas by `name`.
pub struct NamedQuery {
    /// Datadog metric query, e.g. `sum:cpu{host:a} by {env}`.
    pub query: String,
    /// Name unique within one widget request.
    pub name: String,
    /// Always [`DataSource::Metrics`].
    pub data_source: DataSource,
}

impl NamedQuery {
    /// Build a metrics query.
    pub fn new(query: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            name: name.into(),
            data_source: DataSource::Metrics,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Formula combining named sub-queries.
pub struct Formula {
    /// Formula text, e.g. `per_second(query0)/query1`.
    pub formula: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Flattened queries of one widget: one formula per translated source target.
pub struct FlattenedQueries {
    /// Sub-queries in formula order.
    pub queries: Vec<NamedQuery>,
    /// Formulas in source target order.
    pub formulas: Vec<Formula>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Dashboard and group layout.
pub enum LayoutType {
    /// `"ordered"`
    #[default]
    Ordered,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Shape of a timeseries response.
pub enum ResponseFormat {
    /// `"timeseries"`
    #[default]
    Timeseries,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One request of a timeseries widget.
pub struct TimeseriesRequest {
    /// Sub-queries.
    pub queries: Vec<NamedQuery>,
    /// Formulas over `queries`.
    pub formulas: Vec<Formula>,
    /// Always [`ResponseFormat::Timeseries`].
    pub response_format: ResponseFormat,
}

impl From<FlattenedQueries> for TimeseriesRequest {
    fn from(f: FlattenedQueries) -> Self {
        Self {
            queries: f.queries,
            formulas: f.formulas,
            response_format: ResponseFormat::Timeseries,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// A dashboard widget.
pub struct Widget {
    /// Widget definition, tagged by `type`.
    pub definition: WidgetDefinition,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// Supported widget definitions.
pub enum WidgetDefinition {
    /// Container of other widgets (from a Grafana row).
    Group {
        /// Group title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Always ordered.
        layout_type: LayoutType,
        /// Child widgets.
        widgets: Vec<Widget>,
    },
    /// Timeseries chart.
    Timeseries {
        /// Chart title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        /// Exactly one request per converted panel.
        requests: Vec<TimeseriesRequest>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Dashboard template variable.
pub struct TemplateVariable {
    /// Variable name.
    pub name: String,
    /// Tag prefix the variable filters on.
    pub prefix: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// A Datadog dashboard document.
pub struct DatadogDashboard {
    /// Dashboard title, omitted when the source had none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Top-level widgets.
    pub widgets: Vec<Widget>,
    /// Always empty.
    pub description: String,
    /// Always ordered.
    pub layout_type: LayoutType,
    /// Always `false`.
    pub is_read_only: bool,
    /// Template variables derived from Grafana templating.
    pub template_variables: Vec<TemplateVariable>,
    /// Always empty.
    pub notify_list: Vec<String>,
}

impl DatadogDashboard {
    /// Dashboard with the fixed metadata and the given content.
    pub fn new(
        title: Option<String>,
        widgets: Vec<Widget>,
        template_variables: Vec<TemplateVariable>,
    ) -> Self {
        Self {
            title,
            widgets,
            description: String::new(),
            layout_type: LayoutType::Ordered,
            is_read_only: false,
            template_variables,
            notify_list: Vec::new(),
        }
    }
}
