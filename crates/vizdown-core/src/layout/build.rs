/*
 * layout/build.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Builds the layout tree from an ordered node stream.
 */

use crate::blocks::inputs::is_cascade_child;
use crate::context::CompileContext;
use crate::error::{CompileError, Result};
use crate::hierarchy::{self, Flat, TabContainer};
use crate::spec::{Node, NodeKind, sort_by_insertion};

use super::{Direction, LayoutMode, LayoutNode, ManualLayout, TabPanel, TabSet};

/// Build the layout tree for `items`, which must already be in authoring
/// order.
pub fn build(items: &[Node], ctx: &CompileContext) -> Result<Vec<LayoutNode>> {
    let nodes = assemble(items, ctx)?;
    Ok(match ctx.mode {
        LayoutMode::Dashboard => group_rows(nodes, ctx.options.row_size()),
        LayoutMode::Flat => nodes,
    })
}

/// Charts, pagination markers and tab-grouped blocks are collected into
/// runs so the hierarchy builder can merge their tab paths. Everything
/// else is converted where it stands.
fn is_batched(node: &Node) -> bool {
    node.is_viz() || node.is_pagination() || node.is_tabgrouped()
}

fn assemble(items: &[Node], ctx: &CompileContext) -> Result<Vec<LayoutNode>> {
    let mut out = Vec::new();
    let mut batch: Vec<Node> = Vec::new();

    for (i, node) in items.iter().enumerate() {
        if is_batched(node) {
            batch.push(node.clone());
            continue;
        }
        flush_batch(&mut batch, &mut out, ctx)?;
        convert(node, items.get(i + 1), ctx, &mut out)?;
    }
    flush_batch(&mut batch, &mut out, ctx)?;

    Ok(out)
}

fn flush_batch(
    batch: &mut Vec<Node>,
    out: &mut Vec<LayoutNode>,
    ctx: &CompileContext,
) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }
    let nodes = std::mem::take(batch);

    if !nodes.iter().any(Node::is_pagination) {
        out.extend(convert_flat(hierarchy::group(nodes), ctx)?);
        return Ok(());
    }

    let mut sections = vec![Vec::new()];
    for node in nodes {
        if node.is_pagination() {
            sections.push(Vec::new());
        } else if let Some(current) = sections.last_mut() {
            current.push(node);
        }
    }
    tracing::trace!(sections = sections.len(), "splitting at pagination markers");

    for section in sections.into_iter().filter(|s| !s.is_empty()) {
        let content = convert_flat(hierarchy::group(section), ctx)?;
        out.push(LayoutNode::Section(content));
    }
    Ok(())
}

/// Convert one node in place, with `next` as its following sibling.
fn convert(
    node: &Node,
    next: Option<&Node>,
    ctx: &CompileContext,
    out: &mut Vec<LayoutNode>,
) -> Result<()> {
    match node.kind {
        NodeKind::Viz => out.push(LayoutNode::Viz(node.clone())),
        NodeKind::Pagination | NodeKind::Sidebar => {}
        NodeKind::Collection => {
            let mut items = node.items.clone();
            sort_by_insertion(&mut items);
            out.extend(assemble(&items, ctx)?);
        }
        NodeKind::Tabgroup => out.push(LayoutNode::Tabs(explicit_tabs(node, ctx)?)),
        NodeKind::LayoutRow => out.push(manual(node, Direction::Row, ctx)?),
        NodeKind::LayoutColumn => out.push(manual(node, Direction::Column, ctx)?),
        _ => out.push(LayoutNode::Block {
            node: node.clone(),
            next: next.filter(|n| is_cascade_child(node, n)).cloned(),
        }),
    }
    Ok(())
}

fn convert_flat(flat: Vec<Flat<Node>>, ctx: &CompileContext) -> Result<Vec<LayoutNode>> {
    let mut out = Vec::new();
    let mut entries = flat.into_iter().peekable();
    while let Some(entry) = entries.next() {
        match entry {
            Flat::Item(node) => {
                let next = match entries.peek() {
                    Some(Flat::Item(next)) => Some(next),
                    _ => None,
                };
                convert(&node, next, ctx, &mut out)?;
            }
            Flat::Tabs(container) => out.push(LayoutNode::Tabs(tab_set(container, ctx)?)),
        }
    }
    Ok(out)
}

fn tab_set(container: TabContainer<Node>, ctx: &CompileContext) -> Result<TabSet> {
    let mut tabs = Vec::with_capacity(container.tabs.len());
    for tab in container.tabs {
        let content = convert_flat(tab.content, ctx)?;
        let label = ctx
            .configured_tab_label(&tab.name, &tab.path)
            .or_else(|| first_tabset_title(&content))
            .unwrap_or(tab.name);
        tabs.push(TabPanel { label, content });
    }
    Ok(TabSet {
        tabs,
        ..TabSet::default()
    })
}

/// `title_tabset` of the first chart directly inside a tab.
fn first_tabset_title(content: &[LayoutNode]) -> Option<String> {
    content.iter().find_map(|node| match node {
        LayoutNode::Viz(viz) => viz.text_param("title_tabset").map(str::to_string),
        _ => None,
    })
}

/// An authored `tabgroup` block. Items that carry their own tab paths keep
/// them; the rest each get a tab named after their title.
fn explicit_tabs(node: &Node, ctx: &CompileContext) -> Result<TabSet> {
    let mut items = node.items.clone();
    sort_by_insertion(&mut items);

    let items: Vec<Node> = items
        .into_iter()
        .enumerate()
        .map(|(i, mut item)| {
            if !item.is_tabgrouped() {
                let label = item
                    .title()
                    .or_else(|| item.text_param("label"))
                    .map(|s| s.replace('/', "-"))
                    .unwrap_or_else(|| format!("Tab {}", i + 1));
                item.tabgroup = Some(label);
            }
            item
        })
        .collect();

    let mut set = TabSet::default();
    for entry in hierarchy::group(items) {
        if let Flat::Tabs(container) = entry {
            set = tab_set(container, ctx)?;
        }
    }
    set.title = node.title().map(str::to_string);
    set.show_when = node.show_when.clone();
    Ok(set)
}

fn manual(node: &Node, direction: Direction, ctx: &CompileContext) -> Result<LayoutNode> {
    let mut children = node.items.clone();
    sort_by_insertion(&mut children);

    let children = match direction {
        Direction::Row => {
            validate_row(&children)?;
            let mut out = Vec::with_capacity(children.len());
            for (i, child) in children.iter().enumerate() {
                convert(child, children.get(i + 1), ctx, &mut out)?;
            }
            out
        }
        Direction::Column => {
            let nodes = assemble(&children, ctx)?;
            match ctx.mode {
                LayoutMode::Dashboard => group_rows(nodes, ctx.options.row_size()),
                LayoutMode::Flat => nodes,
            }
        }
    };

    let mut attrs = node.clone();
    attrs.items.clear();
    Ok(LayoutNode::Manual(ManualLayout {
        direction,
        node: attrs,
        children,
    }))
}

/// Rows place their children side by side, so nothing inside may split the
/// flow.
fn validate_row(children: &[Node]) -> Result<()> {
    for (index, child) in children.iter().enumerate() {
        if child.is_pagination() {
            return Err(CompileError::LayoutRow {
                index,
                message: "pagination markers cannot appear inside a layout_row".to_string(),
            });
        }
        if child.is_tabgrouped() {
            return Err(CompileError::LayoutRow {
                index,
                message: format!(
                    "tabgroup '{}' cannot appear inside a layout_row",
                    child.tabgroup.as_deref().unwrap_or_default()
                ),
            });
        }
    }
    Ok(())
}

/// Group top-level content into dashboard rows: charts `row_size` at a time,
/// consecutive blocks together, tabsets alone.
fn group_rows(nodes: Vec<LayoutNode>, row_size: usize) -> Vec<LayoutNode> {
    let mut out = Vec::new();
    let mut charts = Vec::new();
    let mut blocks = Vec::new();

    for node in nodes {
        match node {
            LayoutNode::Viz(_) => {
                flush_row(&mut blocks, &mut out);
                charts.push(node);
                if charts.len() >= row_size {
                    flush_row(&mut charts, &mut out);
                }
            }
            LayoutNode::Block { .. } => {
                flush_row(&mut charts, &mut out);
                blocks.push(node);
            }
            LayoutNode::Tabs(_) => {
                flush_row(&mut charts, &mut out);
                flush_row(&mut blocks, &mut out);
                out.push(LayoutNode::Row(vec![node]));
            }
            LayoutNode::Section(children) => {
                flush_row(&mut charts, &mut out);
                flush_row(&mut blocks, &mut out);
                out.push(LayoutNode::Section(group_rows(children, row_size)));
            }
            LayoutNode::Manual(_) | LayoutNode::Row(_) => {
                flush_row(&mut charts, &mut out);
                flush_row(&mut blocks, &mut out);
                out.push(node);
            }
        }
    }
    flush_row(&mut charts, &mut out);
    flush_row(&mut blocks, &mut out);
    out
}

fn flush_row(run: &mut Vec<LayoutNode>, out: &mut Vec<LayoutNode>) {
    if !run.is_empty() {
        out.push(LayoutNode::Row(std::mem::take(run)));
    }
}
