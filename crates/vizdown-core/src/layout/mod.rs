/*
 * layout/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Tabset and layout assembler.
 */

//! Layout assembly.
//!
//! Page content is laid out in two passes:
//!
//! 1. [`build()`] turns an ordered stream of nodes into a tree of
//!    [`LayoutNode`]s: tab containers from tabgroup paths, sections from
//!    pagination markers, and (in dashboard mode) grid rows.
//! 2. [`render()`] walks the finished tree once and produces lines.
//!
//! Two modes change the output. [`LayoutMode::Flat`] produces a plain
//! document with chart titles at `##`. [`LayoutMode::Dashboard`] targets
//! Quarto's dashboard grid: content is grouped under `### Row` markers and
//! chart titles sit at `####`.

pub mod build;
pub mod render;

pub use build::build;
pub use render::render;

use crate::context::CompileContext;
use crate::error::Result;
use crate::spec::Node;

/// Output layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Plain document.
    Flat,
    /// Dashboard grid with explicit column and row markers.
    Dashboard,
}

impl LayoutMode {
    /// Heading level of tabs in a tabset nested inside `depth` others.
    pub fn tab_heading_level(self, depth: usize) -> usize {
        let base = match self {
            LayoutMode::Flat => 3,
            LayoutMode::Dashboard => 4,
        };
        base + depth
    }

    /// Heading level of chart titles inside `depth` tabsets.
    pub fn viz_heading_level(self, depth: usize) -> usize {
        match (self, depth) {
            (LayoutMode::Flat, 0) => 2,
            (LayoutMode::Dashboard, 0) => 4,
            (mode, depth) => mode.tab_heading_level(depth - 1) + 1,
        }
    }
}

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    /// A content block. `next` is the following sibling when it can link to
    /// this block (cascading inputs).
    Block { node: Node, next: Option<Node> },
    /// A chart.
    Viz(Node),
    Tabs(TabSet),
    /// Dashboard grid row built automatically.
    Row(Vec<LayoutNode>),
    /// An authored `layout_row` or `layout_column`.
    Manual(ManualLayout),
    /// Content between pagination markers.
    Section(Vec<LayoutNode>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabSet {
    pub title: Option<String>,
    pub show_when: Option<String>,
    pub tabs: Vec<TabPanel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabPanel {
    pub label: String,
    pub content: Vec<LayoutNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Row,
    Column,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManualLayout {
    pub direction: Direction,
    /// The authored node, for its attributes (`width`, `height`, `show_when`).
    pub node: Node,
    pub children: Vec<LayoutNode>,
}

/// Build and render a stream of nodes.
pub fn render_stream(items: &[Node], ctx: &mut CompileContext) -> Result<Vec<String>> {
    let tree = build(items, ctx)?;
    render(&tree, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(LayoutMode::Flat.viz_heading_level(0), 2);
        assert_eq!(LayoutMode::Flat.tab_heading_level(0), 3);
        assert_eq!(LayoutMode::Flat.viz_heading_level(1), 4);
        assert_eq!(LayoutMode::Flat.tab_heading_level(1), 4);

        assert_eq!(LayoutMode::Dashboard.viz_heading_level(0), 4);
        assert_eq!(LayoutMode::Dashboard.tab_heading_level(0), 4);
        assert_eq!(LayoutMode::Dashboard.viz_heading_level(1), 5);
        assert_eq!(LayoutMode::Dashboard.tab_heading_level(1), 5);
    }
}
