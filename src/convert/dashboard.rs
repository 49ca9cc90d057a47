use rayon::prelude::*;

use crate::convert::diagnostics::Diagnostic;
use crate::convert::opts::ConvertOpts;
use crate::convert::widget::WidgetAssembler;
use crate::datadog::model::{DatadogDashboard, TemplateVariable, Widget};
use crate::foundation::error::{GrafdogError, GrafdogResult};
use crate::grafana::model::{GrafanaDashboard, Panel};

/// A converted dashboard together with everything that was dropped or approximated.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    /// The Datadog dashboard.
    pub dashboard: DatadogDashboard,
    /// Per-target diagnostics in dashboard order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// Serialize the dashboard, pretty-printed or on one line.
    pub fn dashboard_json(&self, pretty: bool) -> GrafdogResult<String> {
        let out = if pretty {
            serde_json::to_string_pretty(&self.dashboard)
        } else {
            serde_json::to_string(&self.dashboard)
        };
        out.map_err(|e| GrafdogError::serde(format!("serialize Datadog dashboard: {e}")))
    }

    /// Number of targets that produced no formula.
    pub fn dropped_targets(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.kind.is_dropped())
            .count()
    }
}

/// Convert a parsed Grafana dashboard.
///
/// Per-target failures are recovered and reported in [`Conversion::diagnostics`]; the only
/// errors are invalid options (`threads: Some(0)`) and a failing thread pool.
#[tracing::instrument(skip(src, opts), fields(panels = src.panels.len()))]
pub fn convert(src: &GrafanaDashboard, opts: &ConvertOpts) -> GrafdogResult<Conversion> {
    let adopted;
    let panels = if opts.adopt_row_siblings {
        adopted = adopt_row_siblings(&src.panels);
        adopted.as_slice()
    } else {
        src.panels.as_slice()
    };

    let converted: Vec<(Option<Widget>, Vec<Diagnostic>)> = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        pool.install(|| panels.par_iter().map(|p| convert_panel(p, opts)).collect())
    } else {
        panels.iter().map(|p| convert_panel(p, opts)).collect()
    };

    let mut widgets = Vec::with_capacity(converted.len());
    let mut diagnostics = Vec::new();
    for (widget, mut diags) in converted {
        widgets.extend(widget);
        diagnostics.append(&mut diags);
    }

    let template_variables = src
        .templating
        .list
        .iter()
        .filter(|v| {
            if v.name.is_empty() {
                tracing::debug!("skipping template variable without a name");
            }
            !v.name.is_empty()
        })
        .map(|v| {
            let name = v.name.to_lowercase();
            TemplateVariable {
                prefix: name.clone(),
                name,
            }
        })
        .collect();

    tracing::debug!(
        widgets = widgets.len(),
        diagnostics = diagnostics.len(),
        "dashboard converted"
    );
    Ok(Conversion {
        dashboard: DatadogDashboard::new(src.title.clone(), widgets, template_variables),
        diagnostics,
    })
}

/// Parse Grafana dashboard JSON and convert it.
pub fn convert_str(json: &str, opts: &ConvertOpts) -> GrafdogResult<Conversion> {
    let src = GrafanaDashboard::from_json(json)?;
    convert(&src, opts)
}

/// Convert Grafana dashboard JSON to a Datadog dashboard JSON value, degrading to an empty
/// object when anything fails.
pub fn convert_json_lossy(json: &str, opts: &ConvertOpts) -> serde_json::Value {
    let value = convert_str(json, opts).and_then(|c| {
        serde_json::to_value(&c.dashboard).map_err(|e| GrafdogError::serde(e.to_string()))
    });
    match value {
        Ok(v) => v,
        Err(err) => {
            tracing::error!(%err, "conversion failed, returning empty dashboard");
            serde_json::Value::Object(serde_json::Map::new())
        }
    }
}

fn convert_panel(panel: &Panel, opts: &ConvertOpts) -> (Option<Widget>, Vec<Diagnostic>) {
    let mut asm = WidgetAssembler::new(opts);
    let widget = asm.assemble(panel);
    (widget, asm.into_diagnostics())
}

/// Grafana stores the children of an expanded row as the top-level panels after it. Move
/// them into the row so it converts to a populated group.
pub(crate) fn adopt_row_siblings(panels: &[Panel]) -> Vec<Panel> {
    let mut out = Vec::with_capacity(panels.len());
    let mut open: Option<Panel> = None;
    for panel in panels {
        if panel.is_row() {
            out.extend(open.take());
            if !panel.collapsed && panel.panels.is_empty() {
                open = Some(panel.clone());
            } else {
                out.push(panel.clone());
            }
            continue;
        }
        match open.as_mut() {
            Some(row) => row.panels.push(panel.clone()),
            None => out.push(panel.clone()),
        }
    }
    out.extend(open);
    out
}

fn build_thread_pool(threads: Option<usize>) -> GrafdogResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(GrafdogError::input(
            "conversion option 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GrafdogError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/convert/dashboard.rs"]
mod tests;
