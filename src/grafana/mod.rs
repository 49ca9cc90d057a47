//! Grafana dashboard source schema.

pub(crate) mod model;

pub use model::{GrafanaDashboard, Panel, Target, TemplateVar, Templating};
