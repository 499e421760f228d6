/*
 * hierarchy.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Tabgroup hierarchy builder.
 */

//! Tabgroup hierarchy.
//!
//! Items carry an optional slash-delimited `tabgroup` path. [`build`] files
//! each item under its path in a tree of named groups, and [`flatten`]
//! turns that tree back into an ordered list in which every level holds
//! its standalone items plus at most one tab container:
//!
//! ```text
//! intro                 (no tabgroup)      intro
//! age    demographics/age           =>     [tabs]
//! gender demographics/gender                 demographics
//! notes  (no tabgroup)                         [tabs] age | gender
//!                                          notes
//! ```
//!
//! All direct children of a level become tabs of one shared container,
//! never sibling containers. Ordering uses insertion indexes: a container
//! sits where its earliest descendant was authored.

use indexmap::IndexMap;

use crate::spec::Node;

/// Something that can be placed in a tab hierarchy.
pub trait Placed {
    fn insertion_index(&self) -> Option<usize>;

    /// Non-empty path segments; empty means "no tabgroup".
    fn tabgroup_path(&self) -> Vec<String>;
}

impl Placed for Node {
    fn insertion_index(&self) -> Option<usize> {
        self.insertion_index
    }

    fn tabgroup_path(&self) -> Vec<String> {
        Node::tabgroup_path(self)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// One level of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode<T> {
    /// Items placed directly at this level, with their effective index.
    pub items: Vec<(usize, T)>,
    /// Named sub-groups in first-seen order.
    pub children: IndexMap<String, HierarchyNode<T>>,
    /// Smallest index of anything at or below this level.
    pub min_index: usize,
}

impl<T> Default for HierarchyNode<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            children: IndexMap::new(),
            min_index: usize::MAX,
        }
    }
}

/// A flattened entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Flat<T> {
    Item(T),
    Tabs(TabContainer<T>),
}

/// The single tab container of one level.
#[derive(Debug, Clone, PartialEq)]
pub struct TabContainer<T> {
    /// Minimum index over all tabs.
    pub index: usize,
    pub tabs: Vec<Tab<T>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tab<T> {
    /// Path segment name.
    pub name: String,
    /// Full path from the root, joined with `/`.
    pub path: String,
    pub index: usize,
    pub content: Vec<Flat<T>>,
}

/// Build the hierarchy. Items without an insertion index get their
/// position in `items`.
pub fn build<T: Placed>(items: impl IntoIterator<Item = T>) -> HierarchyNode<T> {
    let mut root = HierarchyNode::default();

    for (position, item) in items.into_iter().enumerate() {
        let index = item.insertion_index().unwrap_or(position);
        let path = item.tabgroup_path();

        let mut node = &mut root;
        node.min_index = node.min_index.min(index);
        for segment in path {
            node = node.children.entry(segment).or_default();
            node.min_index = node.min_index.min(index);
        }
        node.items.push((index, item));
    }

    root
}

/// Flatten a hierarchy into an ordered list.
pub fn flatten<T>(node: HierarchyNode<T>) -> Vec<Flat<T>> {
    flatten_at(node, "")
}

fn flatten_at<T>(node: HierarchyNode<T>, prefix: &str) -> Vec<Flat<T>> {
    let HierarchyNode {
        mut items,
        children,
        ..
    } = node;

    items.sort_by_key(|(index, _)| *index);

    let container = if children.is_empty() {
        None
    } else {
        let mut children: Vec<(String, HierarchyNode<T>)> = children.into_iter().collect();
        children.sort_by_key(|(_, child)| child.min_index);

        let tabs: Vec<Tab<T>> = children
            .into_iter()
            .map(|(name, child)| {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", prefix, name)
                };
                let index = child.min_index;
                let content = flatten_at(child, &path);
                Tab {
                    name,
                    path,
                    index,
                    content,
                }
            })
            .collect();
        let index = tabs.iter().map(|t| t.index).min().unwrap_or(usize::MAX);
        Some(TabContainer { index, tabs })
    };

    let mut out = Vec::with_capacity(items.len() + 1);
    let mut container = container;
    for (index, item) in items {
        if let Some(c) = container.take_if(|c| c.index < index) {
            out.push(Flat::Tabs(c));
        }
        out.push(Flat::Item(item));
    }
    if let Some(c) = container {
        out.push(Flat::Tabs(c));
    }
    out
}

/// [`build`] followed by [`flatten`].
pub fn group<T: Placed>(items: impl IntoIterator<Item = T>) -> Vec<Flat<T>> {
    flatten(build(items))
}

/// Depth-first list of the items in flattened output order.
pub fn items_in_order<T>(flat: &[Flat<T>]) -> Vec<&T> {
    let mut out = Vec::new();
    collect_items(flat, &mut out);
    out
}

fn collect_items<'a, T>(flat: &'a [Flat<T>], out: &mut Vec<&'a T>) {
    for entry in flat {
        match entry {
            Flat::Item(item) => out.push(item),
            Flat::Tabs(container) => {
                for tab in &container.tabs {
                    collect_items(&tab.content, out);
                }
            }
        }
    }
}
