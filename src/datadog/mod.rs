//! Datadog dashboard target schema.

pub(crate) mod model;

pub use model::{
    DataSource, DatadogDashboard, FlattenedQueries, Formula, LayoutType, NamedQuery,
    ResponseFormat, TemplateVariable, TimeseriesRequest, Widget, WidgetDefinition,
};
