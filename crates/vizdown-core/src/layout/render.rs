/*
 * layout/render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Renders a layout tree to lines.
 */

use vizdown_rexpr::RValue;

use crate::blocks;
use crate::condition::apply_show_when;
use crate::context::CompileContext;
use crate::error::Result;
use crate::markup::{heading, push_block, quote_attr};
use crate::viz;

use super::{Direction, LayoutMode, LayoutNode, ManualLayout, TabSet};

/// Render a layout tree.
pub fn render(nodes: &[LayoutNode], ctx: &mut CompileContext) -> Result<Vec<String>> {
    render_nodes(nodes, 0, ctx)
}

/// `depth` is the number of enclosing tabsets.
fn render_nodes(
    nodes: &[LayoutNode],
    depth: usize,
    ctx: &mut CompileContext,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for node in nodes {
        let block = render_node(node, depth, ctx)?;
        push_block(&mut lines, block);
    }
    Ok(lines)
}

fn render_node(node: &LayoutNode, depth: usize, ctx: &mut CompileContext) -> Result<Vec<String>> {
    match node {
        LayoutNode::Block { node, next } => {
            let lines = blocks::render_block(node, next.as_ref(), ctx)?;
            apply_show_when(node.show_when.as_deref(), lines)
        }
        LayoutNode::Viz(node) => {
            let level = ctx.mode.viz_heading_level(depth);
            viz::generate_with_heading(node, Some(level), ctx)
        }
        LayoutNode::Tabs(set) => render_tabs(set, depth, ctx),
        LayoutNode::Row(children) => {
            let content = render_nodes(children, depth, ctx)?;
            match ctx.mode {
                LayoutMode::Flat => Ok(content),
                LayoutMode::Dashboard => {
                    let mut lines = vec!["### Row".to_string()];
                    push_block(&mut lines, content);
                    Ok(lines)
                }
            }
        }
        LayoutNode::Manual(manual) => render_manual(manual, depth, ctx),
        LayoutNode::Section(children) => render_nodes(children, depth, ctx),
    }
}

fn render_tabs(set: &TabSet, depth: usize, ctx: &mut CompileContext) -> Result<Vec<String>> {
    if set.tabs.is_empty() {
        return apply_show_when(set.show_when.as_deref(), Vec::new());
    }

    let mut lines = Vec::new();
    if let Some(title) = &set.title {
        lines.push(heading(ctx.mode.viz_heading_level(depth), title));
        lines.push(String::new());
    }

    let level = ctx.mode.tab_heading_level(depth);
    lines.push("::: {.panel-tabset}".to_string());
    for tab in &set.tabs {
        lines.push(String::new());
        lines.push(heading(level, &tab.label));
        let content = render_nodes(&tab.content, depth + 1, ctx)?;
        push_block(&mut lines, content);
    }
    lines.push(String::new());
    lines.push(":::".to_string());

    apply_show_when(set.show_when.as_deref(), lines)
}

fn size_attr(manual: &ManualLayout, key: &str) -> Option<String> {
    manual
        .node
        .param(key)
        .map(RValue::display_text)
        .filter(|s| !s.trim().is_empty())
}

fn render_manual(
    manual: &ManualLayout,
    depth: usize,
    ctx: &mut CompileContext,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    match (manual.direction, ctx.mode) {
        (Direction::Column, LayoutMode::Dashboard) => {
            let mut marker = "## Column".to_string();
            if let Some(width) = size_attr(manual, "width") {
                marker.push_str(&format!(" {{width={}}}", quote_attr(&width)));
            }
            lines.push(marker);
            let content = render_nodes(&manual.children, depth, ctx)?;
            push_block(&mut lines, content);
        }
        (Direction::Row, LayoutMode::Dashboard) => {
            let mut marker = "### Row".to_string();
            if let Some(height) = size_attr(manual, "height") {
                marker.push_str(&format!(" {{height={}}}", quote_attr(&height)));
            }
            lines.push(marker);
            let content = render_nodes(&manual.children, depth, ctx)?;
            push_block(&mut lines, content);
        }
        (Direction::Column, LayoutMode::Flat) => {
            match size_attr(manual, "width") {
                Some(width) => lines.push(format!(
                    "::: {{.column style={}}}",
                    quote_attr(&format!("width: {};", width))
                )),
                None => lines.push("::: {.column}".to_string()),
            }
            let content = render_nodes(&manual.children, depth, ctx)?;
            push_block(&mut lines, content);
            lines.push(String::new());
            lines.push(":::".to_string());
        }
        (Direction::Row, LayoutMode::Flat) => {
            lines.push(format!(
                ":::: {{layout-ncol={}}}",
                manual.children.len().max(1)
            ));
            for child in &manual.children {
                let content = render_node(child, depth, ctx)?;
                lines.push(String::new());
                lines.push("::: {.layout-cell}".to_string());
                push_block(&mut lines, content);
                lines.push(String::new());
                lines.push(":::".to_string());
            }
            lines.push(String::new());
            lines.push("::::".to_string());
        }
    }

    apply_show_when(manual.node.show_when.as_deref(), lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::layout::render_stream;
    use crate::options::CompileOptions;
    use crate::spec::{Node, NodeKind, PageSpec};
    use pretty_assertions::assert_eq;

    fn render_with(items: &[Node], mode: LayoutMode) -> Result<Vec<String>> {
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, mode);
        render_stream(items, &mut ctx)
    }

    #[test]
    fn test_tabset_markup() {
        let items = vec![
            Node::text("Age text").with_tabgroup("age").with_index(0),
            Node::text("Gender text").with_tabgroup("gender").with_index(1),
        ];
        assert_eq!(
            render_with(&items, LayoutMode::Flat).unwrap(),
            vec![
                "::: {.panel-tabset}",
                "",
                "### age",
                "",
                "Age text",
                "",
                "### gender",
                "",
                "Gender text",
                "",
                ":::",
            ]
        );
    }

    #[test]
    fn test_viz_heading_levels() {
        let items = vec![
            Node::viz("bar").with("title", "Top").with_index(0),
            Node::viz("bar")
                .with("title", "Nested")
                .with_tabgroup("t")
                .with_index(1),
        ];
        let lines = render_with(&items, LayoutMode::Flat).unwrap();
        assert!(lines.contains(&"## Top".to_string()));
        assert!(lines.contains(&"### t".to_string()));
        assert!(lines.contains(&"#### Nested".to_string()));

        let lines = render_with(&items, LayoutMode::Dashboard).unwrap();
        assert!(lines.contains(&"#### Top".to_string()));
        assert!(lines.contains(&"##### Nested".to_string()));
        assert_eq!(lines[0], "### Row");
    }

    #[test]
    fn test_block_show_when() {
        let items = vec![Node::text("Only for MA").with_show_when("degree == 'MA'")];
        let lines = render_with(&items, LayoutMode::Flat).unwrap();
        assert_eq!(
            lines,
            vec![
                "<div class=\"viz-show-when\" data-show-when=\"{&quot;op&quot;:&quot;eq&quot;,&quot;val&quot;:&quot;MA&quot;,&quot;var&quot;:&quot;degree&quot;}\">",
                "",
                "Only for MA",
                "",
                "</div>",
            ]
        );
    }

    #[test]
    fn test_invalid_show_when_is_an_error() {
        let items = vec![Node::text("x").with_show_when("a + b")];
        let err = render_with(&items, LayoutMode::Flat).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedOperator { .. }));
    }

    #[test]
    fn test_flat_layout_row() {
        let row = Node::new(NodeKind::LayoutRow)
            .with_items(vec![Node::text("left"), Node::text("right")]);
        assert_eq!(
            render_with(&[row], LayoutMode::Flat).unwrap(),
            vec![
                ":::: {layout-ncol=2}",
                "",
                "::: {.layout-cell}",
                "",
                "left",
                "",
                ":::",
                "",
                "::: {.layout-cell}",
                "",
                "right",
                "",
                ":::",
                "",
                "::::",
            ]
        );
    }

    #[test]
    fn test_dashboard_column_width() {
        let column = Node::new(NodeKind::LayoutColumn)
            .with("width", "40%")
            .with_items(vec![Node::text("side")]);
        let lines = render_with(&[column], LayoutMode::Dashboard).unwrap();
        assert_eq!(lines[0], "## Column {width=\"40%\"}");
        assert!(lines.contains(&"### Row".to_string()));
    }
}
