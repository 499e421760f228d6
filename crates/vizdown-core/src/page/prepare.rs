/*
 * page/prepare.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Assembles the content stream of a page.
 */

//! Content preparation.
//!
//! A page's content comes from three lists authored independently:
//! `content_blocks`, `items` and `visualizations`. They are merged into one
//! stream ordered by insertion index. Collections are spliced in place and
//! `sidebar` nodes are lifted out, since a sidebar is rendered apart from
//! the main flow. The page spec itself is never modified.

use crate::error::Result;
use crate::spec::{Node, NodeKind, PageSpec, SidebarSpec, sort_by_insertion, walk};

use super::crosstab;

/// A page's content, ready for layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedPage {
    pub content: Vec<Node>,
    pub sidebar: Option<SidebarSpec>,
    /// Filter variables propagated to charts.
    pub cross_tab_vars: Vec<String>,
}

impl PreparedPage {
    /// Nodes in the main stream and the sidebar, depth first.
    pub fn all_nodes(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        walk(&self.content, &mut |node| out.push(node));
        if let Some(sidebar) = &self.sidebar {
            walk(&sidebar.items, &mut |node| out.push(node));
        }
        out
    }

    /// True when some node needs an R chunk.
    pub fn has_r_content(&self) -> bool {
        self.all_nodes().iter().any(|n| n.kind.emits_r())
    }

    /// True when there is a manual `layout_column` at the top level.
    pub fn has_manual_column(&self) -> bool {
        self.content
            .iter()
            .any(|n| n.kind == NodeKind::LayoutColumn)
    }
}

pub fn prepare(page: &PageSpec) -> Result<PreparedPage> {
    let stream = merged_stream(page);
    let mut sidebar = page.sidebar.clone();
    let mut content = Vec::with_capacity(stream.len());
    splice(stream, &mut content, &mut sidebar);

    let cross_tab_vars = crosstab::collect(page, sidebar.as_ref(), &content)?;
    if !cross_tab_vars.is_empty() {
        tracing::debug!(vars = ?cross_tab_vars, "propagating cross-tab filter variables");
        crosstab::inject(&mut content, &cross_tab_vars);
    }

    Ok(PreparedPage {
        content,
        sidebar,
        cross_tab_vars,
    })
}

/// `content_blocks`, then `items`, then `visualizations`, in insertion
/// order. Visualizations are dropped when `content_blocks` already holds
/// charts, since both describe the same charts.
fn merged_stream(page: &PageSpec) -> Vec<Node> {
    let mut has_charts = false;
    walk(&page.content_blocks, &mut |node| has_charts |= node.is_viz());

    let mut stream: Vec<Node> = page
        .content_blocks
        .iter()
        .chain(&page.items)
        .cloned()
        .collect();
    if has_charts {
        if !page.visualizations.is_empty() {
            tracing::debug!(
                skipped = page.visualizations.len(),
                "content blocks already contain charts, skipping visualizations"
            );
        }
    } else {
        stream.extend(page.visualizations.iter().cloned());
    }

    sort_by_insertion(&mut stream);
    stream
}

fn splice(stream: Vec<Node>, out: &mut Vec<Node>, sidebar: &mut Option<SidebarSpec>) {
    for node in stream {
        match node.kind {
            NodeKind::Collection => {
                let mut items = node.items;
                sort_by_insertion(&mut items);
                splice(items, out, sidebar);
            }
            NodeKind::Sidebar => {
                if sidebar.is_some() {
                    tracing::warn!("page already has a sidebar, ignoring sidebar block");
                } else {
                    *sidebar = Some(SidebarSpec::from_node(&node));
                }
            }
            _ => out.push(node),
        }
    }
}
