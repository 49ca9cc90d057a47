use crate::convert::diagnostics::{Diagnostic, DiagnosticKind};
use crate::convert::opts::ConvertOpts;
use crate::datadog::model::{LayoutType, TimeseriesRequest, Widget, WidgetDefinition};
use crate::grafana::model::{Panel, Target};
use crate::promql;
use crate::translate::expr::translate;
use crate::translate::flatten::{Flattener, PushOutcome};

/// Turns Grafana panels into Datadog widgets, collecting diagnostics along the way.
pub struct WidgetAssembler<'a> {
    opts: &'a ConvertOpts,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> WidgetAssembler<'a> {
    /// Assembler using `opts`.
    pub fn new(opts: &'a ConvertOpts) -> Self {
        Self {
            opts,
            diagnostics: Vec::new(),
        }
    }

    /// Assemble one panel.
    ///
    /// Rows become groups over their assembled children. Text panels and panels without
    /// targets produce no widget. Anything else becomes one timeseries widget whose request
    /// holds the targets that survived translation, possibly none.
    pub fn assemble(&mut self, panel: &Panel) -> Option<Widget> {
        if panel.is_row() {
            let widgets = panel
                .panels
                .iter()
                .filter_map(|child| self.assemble(child))
                .collect();
            return Some(Widget {
                definition: WidgetDefinition::Group {
                    title: panel.title.clone(),
                    layout_type: LayoutType::Ordered,
                    widgets,
                },
            });
        }
        if panel.is_text() || panel.targets.is_empty() {
            return None;
        }

        let mut flattener = Flattener::new(self.opts.naming);
        for (index, target) in panel.targets.iter().enumerate() {
            self.push_target(&mut flattener, panel, index, target);
        }
        Some(Widget {
            definition: WidgetDefinition::Timeseries {
                title: panel.title.clone(),
                requests: vec![TimeseriesRequest::from(flattener.finish())],
            },
        })
    }

    /// Diagnostics collected so far, in panel order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn push_target(
        &mut self,
        flattener: &mut Flattener,
        panel: &Panel,
        index: usize,
        target: &Target,
    ) {
        let Some(src) = target.expr.as_deref() else {
            self.report(panel, index, "", DiagnosticKind::MissingExpr);
            return;
        };

        let expr = match promql::parse(src) {
            Ok(expr) => expr,
            Err(err) => {
                tracing::warn!(
                    panel = ?panel.title,
                    target = index,
                    %err,
                    "dropping unparsable target"
                );
                let kind = DiagnosticKind::ParseFailed {
                    offset: err.offset,
                    message: err.message,
                };
                self.report(panel, index, src, kind);
                return;
            }
        };

        let Some(node) = translate(&expr) else {
            tracing::warn!(
                panel = ?panel.title,
                target = index,
                query = src,
                "dropping untranslatable target"
            );
            self.report(panel, index, src, DiagnosticKind::Untranslatable);
            return;
        };

        let unmapped: Vec<String> = node
            .unmapped_functions()
            .into_iter()
            .map(str::to_owned)
            .collect();
        if !unmapped.is_empty() && self.opts.strict_functions {
            tracing::warn!(
                panel = ?panel.title,
                target = index,
                functions = ?unmapped,
                "dropping target with unmapped functions"
            );
            let kind = DiagnosticKind::RejectedFunctions { functions: unmapped };
            self.report(panel, index, src, kind);
            return;
        }
        for function in unmapped {
            tracing::warn!(
                panel = ?panel.title,
                target = index,
                %function,
                "function has no Datadog mapping"
            );
            self.report(panel, index, src, DiagnosticKind::UnmappedFunction { function });
        }

        match flattener.push(&node, index) {
            PushOutcome::Emitted => {}
            PushOutcome::Untranslatable => {
                self.report(panel, index, src, DiagnosticKind::Untranslatable);
            }
            PushOutcome::NumericOnly => {
                self.report(panel, index, src, DiagnosticKind::NumericOnly);
            }
        }
    }

    fn report(&mut self, panel: &Panel, target: usize, query: &str, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic {
            panel: panel.title.clone(),
            target,
            query: query.to_owned(),
            kind,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/convert/widget.rs"]
mod tests;
