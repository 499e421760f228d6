/*
 * page/features.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Client feature configuration.
 */

use vizdown_rexpr::RCall;

use super::prepare::PreparedPage;
use crate::chunk::CodeChunk;
use crate::context::CompileContext;
use crate::spec::NodeKind;

/// Client-side features a page needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features {
    pub modals: bool,
    pub inputs: bool,
    pub linked_inputs: bool,
    pub show_when: bool,
    pub url_params: bool,
    pub chart_export: bool,
    pub sidebar: bool,
    pub deferred_charts: bool,
    pub min_cell_size: Option<u64>,
    pub cross_tab: bool,
}

impl Features {
    pub fn detect(prepared: &PreparedPage, ctx: &CompileContext) -> Self {
        let page = ctx.page;
        let mut features = Features {
            url_params: page.url_params,
            chart_export: page.chart_export,
            sidebar: prepared.sidebar.is_some(),
            deferred_charts: page.lazy_load_charts,
            min_cell_size: page.min_cell_size,
            cross_tab: !prepared.cross_tab_vars.is_empty(),
            ..Features::default()
        };

        for node in prepared.all_nodes() {
            match node.kind {
                NodeKind::Modal => features.modals = true,
                NodeKind::Input => {
                    features.inputs = true;
                    if node.has("cascade_parent") {
                        features.linked_inputs = true;
                    }
                }
                NodeKind::Viz => {
                    features.chart_export |= node.flag("export");
                    features.cross_tab |= node.has("cross_tab_filter_vars");
                }
                _ => {}
            }
            features.show_when |= node.show_when.is_some();
        }

        features
    }

    fn flags(&self) -> [(&'static str, bool); 9] {
        [
            ("modals", self.modals),
            ("inputs", self.inputs),
            ("linked_inputs", self.linked_inputs),
            ("show_when", self.show_when),
            ("url_params", self.url_params),
            ("chart_export", self.chart_export),
            ("sidebar", self.sidebar),
            ("deferred_charts", self.deferred_charts),
            ("cross_tab", self.cross_tab),
        ]
    }

    /// The `enable_features(...)` call. Accessibility is always on; other
    /// features only appear when enabled.
    pub fn call(&self, ctx: &CompileContext) -> RCall {
        let mut call = RCall::new(ctx.runtime_fn("enable_features")).arg("accessibility", true);
        for (name, enabled) in self.flags() {
            if enabled {
                call.push_arg(name, true);
            }
            if name == "deferred_charts"
                && let Some(size) = self.min_cell_size
            {
                call.push_arg("min_cell_size", size);
            }
        }
        call.arg("namespace", ctx.slug.as_str())
    }
}

pub fn render_features(prepared: &PreparedPage, ctx: &CompileContext) -> Vec<String> {
    let features = Features::detect(prepared, ctx);
    tracing::debug!(?features, "page features");
    CodeChunk::new()
        .label("features")
        .asis()
        .lines(features.call(ctx).lines())
        .into_lines()
}
