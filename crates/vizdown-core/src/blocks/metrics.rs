/*
 * blocks/metrics.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Metrics, value boxes and sparkline cards.
 */

use vizdown_rexpr::{RCall, RValue};

use super::{call_from_params, helper_chunk, params_as_list};
use crate::context::CompileContext;
use crate::spec::Node;

pub fn render_metric(node: &Node, ctx: &mut CompileContext) -> Vec<String> {
    let call = call_from_params(ctx.runtime_fn("render_metric"), node, &[]);
    helper_chunk("metric", call, ctx)
}

pub fn render_value_box(node: &Node, ctx: &mut CompileContext) -> Vec<String> {
    let call = call_from_params(ctx.runtime_fn("render_value_box"), node, &[]);
    helper_chunk("value-box", call, ctx)
}

pub fn render_sparkline_card(node: &Node, ctx: &mut CompileContext) -> Vec<String> {
    let call = call_from_params(ctx.runtime_fn("render_sparkline_card"), node, &[]);
    helper_chunk("sparkline-card", call, ctx)
}

/// Row helpers take their boxes as a list of named lists, followed by the
/// row's own parameters.
fn row_call(function: String, node: &Node) -> RCall {
    let mut sorted = node.items.clone();
    crate::spec::sort_by_insertion(&mut sorted);
    let boxes = RValue::List(sorted.iter().map(params_as_list).collect());

    let mut call = RCall::new(function).positional(boxes);
    for (key, value) in &node.params {
        if !value.is_null() {
            call.push_arg(key.as_str(), value.clone());
        }
    }
    call
}

pub fn render_value_box_row(node: &Node, ctx: &mut CompileContext) -> Vec<String> {
    let call = row_call(ctx.runtime_fn("render_value_box_row"), node);
    helper_chunk("value-box-row", call, ctx)
}

pub fn render_sparkline_card_row(node: &Node, ctx: &mut CompileContext) -> Vec<String> {
    let call = row_call(ctx.runtime_fn("render_sparkline_card_row"), node);
    helper_chunk("sparkline-card-row", call, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMode;
    use crate::options::CompileOptions;
    use crate::spec::{NodeKind, PageSpec};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_box() {
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let node = Node::new(NodeKind::ValueBox)
            .with("title", "Respondents")
            .with("value", 1204i64)
            .with("icon", "people");
        assert_eq!(
            render_value_box(&node, &mut ctx),
            vec![
                "```{r}",
                "#| label: value-box-1",
                "#| echo: false",
                "#| output: asis",
                "vizkit::render_value_box(",
                "  title = 'Respondents',",
                "  value = 1204L,",
                "  icon = 'people'",
                ")",
                "```",
            ]
        );
    }

    #[test]
    fn test_value_box_row_orders_boxes() {
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let node = Node::new(NodeKind::ValueBoxRow).with_items(vec![
            Node::new(NodeKind::ValueBox).with("title", "B").with_index(2),
            Node::new(NodeKind::ValueBox).with("title", "A").with_index(1),
        ]);
        let lines = render_value_box_row(&node, &mut ctx);
        assert_eq!(lines[4], "vizkit::render_value_box_row(");
        assert_eq!(lines[5], "  list(list(title = 'A'), list(title = 'B'))");
    }

    #[test]
    fn test_metric_call() {
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let node = Node::new(NodeKind::Metric).with("value", 0.5).with("format", "percent");
        let lines = render_metric(&node, &mut ctx);
        assert!(lines.contains(&"vizkit::render_metric(".to_string()));
        assert!(lines.contains(&"  value = 0.5,".to_string()));
    }
}
