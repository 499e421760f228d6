/*
 * blocks/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Content block renderers.
 */

//! Content block renderers.
//!
//! One function per block kind, each turning a [`Node`] into output lines.
//! Renderers never see layout: headings, rows and tabs are the layout
//! module's job, as is wrapping blocks in `show_when` markers.
//!
//! Unknown kinds render nothing, so pages written for a newer runtime
//! still compile.

pub mod containers;
pub mod inputs;
pub mod media;
pub mod metrics;
pub mod tables;
pub mod text;

use vizdown_rexpr::{RCall, RValue};

use crate::chunk::CodeChunk;
use crate::context::CompileContext;
use crate::error::Result;
use crate::spec::{Node, NodeKind};

/// Render one block.
///
/// `next` is the following sibling, which inputs inspect to link cascading
/// selections.
pub fn render_block(
    node: &Node,
    next: Option<&Node>,
    ctx: &mut CompileContext,
) -> Result<Vec<String>> {
    match &node.kind {
        NodeKind::Text => Ok(text::render_text(node)),
        NodeKind::Quote => Ok(text::render_quote(node)),
        NodeKind::Html => Ok(text::render_html(node)),
        NodeKind::Spacer => Ok(text::render_spacer(node)),
        NodeKind::Badge => Ok(text::render_badge(node)),
        NodeKind::Divider => Ok(text::render_divider(node, ctx)),
        NodeKind::Code => Ok(text::render_code(node)),
        NodeKind::Image => Ok(media::render_image(node)),
        NodeKind::Video => Ok(media::render_video(node)),
        NodeKind::Iframe => Ok(media::render_iframe(node)),
        NodeKind::Callout => Ok(containers::render_callout(node)),
        NodeKind::Card => Ok(containers::render_card(node)),
        NodeKind::Accordion => Ok(containers::render_accordion(node)),
        NodeKind::Modal => Ok(containers::render_modal(node, ctx)),
        NodeKind::Table
        | NodeKind::Gt
        | NodeKind::Reactable
        | NodeKind::Dt
        | NodeKind::Hc
        | NodeKind::Widget
        | NodeKind::Ggplot => Ok(tables::render_table(node, ctx)),
        NodeKind::Metric => Ok(metrics::render_metric(node, ctx)),
        NodeKind::ValueBox => Ok(metrics::render_value_box(node, ctx)),
        NodeKind::ValueBoxRow => Ok(metrics::render_value_box_row(node, ctx)),
        NodeKind::SparklineCard => Ok(metrics::render_sparkline_card(node, ctx)),
        NodeKind::SparklineCardRow => Ok(metrics::render_sparkline_card_row(node, ctx)),
        NodeKind::Input => inputs::render_input(node, next, ctx),
        NodeKind::InputRow => inputs::render_input_row(node, ctx),
        NodeKind::Viz => crate::viz::generate(node, ctx),
        NodeKind::LayoutRow
        | NodeKind::LayoutColumn
        | NodeKind::Tabgroup
        | NodeKind::Collection => crate::layout::render_stream(std::slice::from_ref(node), ctx),
        NodeKind::Pagination | NodeKind::Sidebar => Ok(Vec::new()),
        NodeKind::Unknown(kind) => {
            tracing::debug!(kind = %kind, "skipping block of unknown type");
            Ok(Vec::new())
        }
    }
}

/// An `output: asis` chunk calling a runtime helper.
pub(crate) fn helper_chunk(label: &str, call: RCall, ctx: &mut CompileContext) -> Vec<String> {
    CodeChunk::new()
        .label(ctx.next_label(label))
        .asis()
        .lines(call.lines())
        .into_lines()
}

/// A call whose named arguments are the node's parameters, minus `skip`.
pub(crate) fn call_from_params(function: String, node: &Node, skip: &[&str]) -> RCall {
    let mut call = RCall::new(function);
    for (key, value) in &node.params {
        if value.is_null() || skip.contains(&key.as_str()) {
            continue;
        }
        call.push_arg(key.as_str(), value.clone());
    }
    call
}

/// A node's parameters as a named list.
pub(crate) fn params_as_list(node: &Node) -> RValue {
    RValue::Map(
        node.params
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMode;
    use crate::options::CompileOptions;
    use crate::spec::PageSpec;

    #[test]
    fn test_unknown_kind_renders_nothing() {
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let node = Node::new(NodeKind::Unknown("hologram".to_string())).with("content", "x");
        assert!(render_block(&node, None, &mut ctx).unwrap().is_empty());
        assert!(render_block(&Node::pagination(), None, &mut ctx).unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_text() {
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let lines = render_block(&Node::text("Hello\n\nWorld"), None, &mut ctx).unwrap();
        assert_eq!(lines, vec!["Hello", "", "World"]);
    }
}
