/*
 * spec/node.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Generic spec node: a typed key-value map.
 */

//! Spec nodes.
//!
//! A node is what page authors write for every content block and chart:
//!
//! ```yaml
//! type: viz
//! viz_type: bar
//! x_var: degree
//! title: Degrees
//! tabgroup: demographics/education
//! .insertion_index: 4
//! ```
//!
//! The `type` key selects a [`NodeKind`]. A handful of structural keys are
//! lifted into typed fields; everything else lands in [`Node::params`] in
//! authoring order.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use vizdown_rexpr::RValue;

/// Sort key for nodes without an insertion index.
pub const UNORDERED: usize = usize::MAX;

/// The `type` discriminator of a spec node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Image,
    Callout,
    Divider,
    Code,
    Card,
    Accordion,
    Iframe,
    Video,
    Table,
    Gt,
    Reactable,
    Dt,
    Hc,
    Widget,
    Ggplot,
    Spacer,
    Html,
    Quote,
    Badge,
    Metric,
    ValueBox,
    ValueBoxRow,
    SparklineCard,
    SparklineCardRow,
    LayoutColumn,
    LayoutRow,
    Input,
    InputRow,
    Modal,
    Viz,
    Pagination,
    Tabgroup,
    /// A group of nodes spliced into the surrounding stream in place.
    Collection,
    /// A sidebar declared inside page content.
    Sidebar,
    /// Any other type. Deserializes fine and renders nothing.
    Unknown(String),
}

impl NodeKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "text" => NodeKind::Text,
            "image" => NodeKind::Image,
            "callout" => NodeKind::Callout,
            "divider" => NodeKind::Divider,
            "code" => NodeKind::Code,
            "card" => NodeKind::Card,
            "accordion" => NodeKind::Accordion,
            "iframe" => NodeKind::Iframe,
            "video" => NodeKind::Video,
            "table" => NodeKind::Table,
            "gt" => NodeKind::Gt,
            "reactable" => NodeKind::Reactable,
            "DT" => NodeKind::Dt,
            "hc" => NodeKind::Hc,
            "widget" => NodeKind::Widget,
            "ggplot" => NodeKind::Ggplot,
            "spacer" => NodeKind::Spacer,
            "html" => NodeKind::Html,
            "quote" => NodeKind::Quote,
            "badge" => NodeKind::Badge,
            "metric" => NodeKind::Metric,
            "value_box" => NodeKind::ValueBox,
            "value_box_row" => NodeKind::ValueBoxRow,
            "sparkline_card" => NodeKind::SparklineCard,
            "sparkline_card_row" => NodeKind::SparklineCardRow,
            "layout_column" => NodeKind::LayoutColumn,
            "layout_row" => NodeKind::LayoutRow,
            "input" => NodeKind::Input,
            "input_row" => NodeKind::InputRow,
            "modal" => NodeKind::Modal,
            "viz" => NodeKind::Viz,
            "pagination" => NodeKind::Pagination,
            "tabgroup" | "content_tabset" => NodeKind::Tabgroup,
            "collection" => NodeKind::Collection,
            "sidebar" => NodeKind::Sidebar,
            other => NodeKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Image => "image",
            NodeKind::Callout => "callout",
            NodeKind::Divider => "divider",
            NodeKind::Code => "code",
            NodeKind::Card => "card",
            NodeKind::Accordion => "accordion",
            NodeKind::Iframe => "iframe",
            NodeKind::Video => "video",
            NodeKind::Table => "table",
            NodeKind::Gt => "gt",
            NodeKind::Reactable => "reactable",
            NodeKind::Dt => "DT",
            NodeKind::Hc => "hc",
            NodeKind::Widget => "widget",
            NodeKind::Ggplot => "ggplot",
            NodeKind::Spacer => "spacer",
            NodeKind::Html => "html",
            NodeKind::Quote => "quote",
            NodeKind::Badge => "badge",
            NodeKind::Metric => "metric",
            NodeKind::ValueBox => "value_box",
            NodeKind::ValueBoxRow => "value_box_row",
            NodeKind::SparklineCard => "sparkline_card",
            NodeKind::SparklineCardRow => "sparkline_card_row",
            NodeKind::LayoutColumn => "layout_column",
            NodeKind::LayoutRow => "layout_row",
            NodeKind::Input => "input",
            NodeKind::InputRow => "input_row",
            NodeKind::Modal => "modal",
            NodeKind::Viz => "viz",
            NodeKind::Pagination => "pagination",
            NodeKind::Tabgroup => "tabgroup",
            NodeKind::Collection => "collection",
            NodeKind::Sidebar => "sidebar",
            NodeKind::Unknown(s) => s,
        }
    }

    /// Kinds whose renderers emit R chunks.
    pub fn emits_r(&self) -> bool {
        matches!(
            self,
            NodeKind::Viz
                | NodeKind::Table
                | NodeKind::Gt
                | NodeKind::Reactable
                | NodeKind::Dt
                | NodeKind::Hc
                | NodeKind::Widget
                | NodeKind::Ggplot
                | NodeKind::Metric
                | NodeKind::ValueBox
                | NodeKind::ValueBoxRow
                | NodeKind::SparklineCard
                | NodeKind::SparklineCardRow
                | NodeKind::Input
                | NodeKind::InputRow
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KindVisitor;

        impl Visitor<'_> for KindVisitor {
            type Value = NodeKind;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a node type string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<NodeKind, E> {
                Ok(NodeKind::parse(v))
            }
        }

        deserializer.deserialize_str(KindVisitor)
    }
}

/// One content block, chart or structural container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Global authoring order.
    #[serde(
        default,
        rename = ".insertion_index",
        alias = "insertion_index",
        skip_serializing_if = "Option::is_none"
    )]
    pub insertion_index: Option<usize>,

    /// Slash-delimited position in a nested tab hierarchy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabgroup: Option<String>,

    /// Conditional-visibility expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pagination_break: bool,

    /// Children of containers (rows, columns, tab groups, collections...).
    #[serde(default, alias = "blocks", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Node>,

    /// Every other key, in authoring order.
    #[serde(flatten)]
    pub params: IndexMap<String, RValue>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            insertion_index: None,
            tabgroup: None,
            show_when: None,
            pagination_break: false,
            items: Vec::new(),
            params: IndexMap::new(),
        }
    }

    /// A chart node of the given `viz_type`.
    pub fn viz(viz_type: &str) -> Self {
        Self::new(NodeKind::Viz).with("viz_type", viz_type)
    }

    pub fn text(content: &str) -> Self {
        Self::new(NodeKind::Text).with("content", content)
    }

    /// A pagination marker.
    pub fn pagination() -> Self {
        let mut node = Self::new(NodeKind::Pagination);
        node.pagination_break = true;
        node
    }

    pub fn with(mut self, key: &str, value: impl Into<RValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.insertion_index = Some(index);
        self
    }

    pub fn with_tabgroup(mut self, path: &str) -> Self {
        self.tabgroup = Some(path.to_string());
        self
    }

    pub fn with_show_when(mut self, expr: &str) -> Self {
        self.show_when = Some(expr.to_string());
        self
    }

    pub fn with_items(mut self, items: Vec<Node>) -> Self {
        self.items = items;
        self
    }

    pub fn param(&self, key: &str) -> Option<&RValue> {
        self.params.get(key).filter(|v| !v.is_null())
    }

    pub fn has(&self, key: &str) -> bool {
        self.param(key).is_some()
    }

    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(RValue::as_str)
    }

    /// A string parameter that is present and non-blank.
    pub fn text_param(&self, key: &str) -> Option<&str> {
        self.str_param(key).filter(|s| !s.trim().is_empty())
    }

    /// A boolean flag, `false` when absent or not a boolean.
    pub fn flag(&self, key: &str) -> bool {
        self.param(key).and_then(RValue::as_bool).unwrap_or(false)
    }

    pub fn title(&self) -> Option<&str> {
        self.text_param("title")
    }

    pub fn viz_type(&self) -> Option<&str> {
        self.text_param("viz_type")
    }

    pub fn sort_key(&self) -> usize {
        self.insertion_index.unwrap_or(UNORDERED)
    }

    /// Non-empty tabgroup path segments.
    pub fn tabgroup_path(&self) -> Vec<&str> {
        self.tabgroup
            .as_deref()
            .map(|path| {
                path.split('/')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_tabgrouped(&self) -> bool {
        !self.tabgroup_path().is_empty()
    }

    pub fn is_viz(&self) -> bool {
        self.kind == NodeKind::Viz
    }

    pub fn is_pagination(&self) -> bool {
        self.kind == NodeKind::Pagination || self.pagination_break
    }
}

/// Stable sort by insertion index; unindexed nodes keep their relative
/// order at the end.
pub fn sort_by_insertion(nodes: &mut [Node]) {
    nodes.sort_by_key(Node::sort_key);
}

/// Depth-first visit of `nodes` and everything nested in their `items`.
pub fn walk<'a>(nodes: &'a [Node], visit: &mut impl FnMut(&'a Node)) {
    for node in nodes {
        visit(node);
        walk(&node.items, visit);
    }
}

/// Mutable variant of [`walk`].
pub fn walk_mut(nodes: &mut [Node], visit: &mut impl FnMut(&mut Node)) {
    for node in nodes {
        visit(node);
        walk_mut(&mut node.items, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_viz_node() {
        let yaml = r#"
type: viz
viz_type: bar
x_var: degree
.insertion_index: 4
tabgroup: demographics/education
"#;
        let node: Node = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(node.kind, NodeKind::Viz);
        assert_eq!(node.insertion_index, Some(4));
        assert_eq!(node.viz_type(), Some("bar"));
        assert_eq!(node.tabgroup_path(), vec!["demographics", "education"]);
        let keys: Vec<_> = node.params.keys().cloned().collect();
        assert_eq!(keys, vec!["viz_type", "x_var"]);
    }

    #[test]
    fn test_insertion_index_alias_and_blocks_alias() {
        let json = r#"{"type": "layout_row", "insertion_index": 2,
                       "blocks": [{"type": "text", "content": "hi"}]}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.insertion_index, Some(2));
        assert_eq!(node.items.len(), 1);
        assert_eq!(node.items[0].kind, NodeKind::Text);
    }

    #[test]
    fn test_unknown_kind_and_alias() {
        let node: Node = serde_json::from_str(r#"{"type": "hologram"}"#).unwrap();
        assert_eq!(node.kind, NodeKind::Unknown("hologram".to_string()));
        assert_eq!(NodeKind::parse("content_tabset"), NodeKind::Tabgroup);
        assert_eq!(NodeKind::parse("DT").as_str(), "DT");
    }

    #[test]
    fn test_sort_by_insertion_is_stable() {
        let mut nodes = vec![
            Node::text("a"),
            Node::text("b").with_index(5),
            Node::text("c"),
            Node::text("d").with_index(1),
        ];
        sort_by_insertion(&mut nodes);
        let order: Vec<_> = nodes.iter().map(|n| n.str_param("content").unwrap()).collect();
        assert_eq!(order, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_empty_tabgroup_segments_ignored() {
        assert_eq!(
            Node::text("x").with_tabgroup("a//b/").tabgroup_path(),
            vec!["a", "b"]
        );
        assert!(!Node::text("x").with_tabgroup("/").is_tabgrouped());
    }

    #[test]
    fn test_null_params_read_as_absent() {
        let node = Node::viz("bar").with("title", RValue::Null);
        assert!(!node.has("title"));
        assert_eq!(node.title(), None);
    }
}
