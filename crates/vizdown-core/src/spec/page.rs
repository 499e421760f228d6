/*
 * spec/page.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Page spec: one output document.
 */

//! Page specs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::node::{Node, NodeKind};
use crate::markup::slugify;

/// Everything needed to compile one page.
///
/// The compiler never mutates a `PageSpec`; it works on copies of the
/// content lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    pub name: String,
    pub title: Option<String>,
    /// Iconify icon name shown before the title.
    pub icon: Option<String>,
    /// Verbatim markdown emitted before the content.
    pub text: Option<String>,
    pub data_path: Option<DataSource>,
    pub content_blocks: Vec<Node>,
    pub visualizations: Vec<Node>,
    #[serde(rename = ".items", alias = "items")]
    pub items: Vec<Node>,
    pub sidebar: Option<SidebarSpec>,
    /// Display labels for tabgroup path segments.
    pub tabgroup_labels: IndexMap<String, String>,

    pub lazy_load_charts: bool,
    pub lazy_load_margin: Option<String>,
    pub lazy_load_tabs: bool,
    pub lazy_debug: bool,
    pub overlay: bool,
    pub overlay_theme: Option<String>,
    pub overlay_text: Option<String>,
    pub overlay_duration: Option<u64>,
    pub backend: Option<String>,
    pub contextual_viz_errors: bool,
    pub embed_full_data: bool,
    pub url_params: bool,
    pub chart_export: bool,
    pub min_cell_size: Option<u64>,
    pub cache: bool,
}

impl PageSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Identifier-safe page name, used for namespacing and file names.
    pub fn slug(&self) -> String {
        let slug = slugify(&self.name);
        if slug.is_empty() {
            "page".to_string()
        } else {
            slug
        }
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.name)
    }

    /// Datasets loaded by the setup chunk. A single path is bound to
    /// `default_name`.
    pub fn datasets(&self, default_name: &str) -> Vec<Dataset> {
        match &self.data_path {
            None => Vec::new(),
            Some(DataSource::Single(path)) => vec![Dataset::new(default_name, path)],
            Some(DataSource::Named(map)) => map
                .iter()
                .map(|(name, path)| Dataset::new(name, path))
                .collect(),
        }
    }

    pub fn has_data(&self) -> bool {
        match &self.data_path {
            None => false,
            Some(DataSource::Single(path)) => !path.trim().is_empty(),
            Some(DataSource::Named(map)) => !map.is_empty(),
        }
    }
}

/// Where a page's data comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSource {
    /// One dataset, by path or URL.
    Single(String),
    /// Several datasets, keyed by variable name.
    Named(IndexMap<String, String>),
}

/// File format of a dataset, from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Parquet,
    Rds,
}

/// A dataset bound to a variable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dataset {
    pub name: String,
    pub path: String,
}

impl Dataset {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.trim().to_string(),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }

    pub fn format(&self) -> DataFormat {
        let path = self.path.split(['?', '#']).next().unwrap_or_default();
        if path.to_ascii_lowercase().ends_with(".rds") {
            DataFormat::Rds
        } else {
            DataFormat::Parquet
        }
    }
}

/// Variable name for a dataset referenced by path from a single chart.
///
/// `data/survey_2024.parquet` -> `data_survey_2024`.
pub fn dataset_name_for_path(path: &str) -> String {
    let file = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let stem = file.split('.').next().unwrap_or_default();
    let stem = slugify(stem).replace('-', "_");
    if stem.is_empty() {
        "data_file".to_string()
    } else {
        format!("data_{}", stem)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarPosition {
    #[default]
    Left,
    Right,
}

/// A dashboard sidebar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarSpec {
    pub position: SidebarPosition,
    pub title: Option<String>,
    pub width: Option<String>,
    pub open: Option<bool>,
    #[serde(alias = "blocks")]
    pub items: Vec<Node>,
}

impl SidebarSpec {
    /// Read a sidebar declared as a `sidebar` node inside page content.
    pub fn from_node(node: &Node) -> Self {
        let position = match node.str_param("position") {
            Some("right") => SidebarPosition::Right,
            _ => SidebarPosition::Left,
        };
        let width = node.param("width").map(|w| match w {
            vizdown_rexpr::RValue::Int(px) => format!("{}px", px),
            other => other.display_text(),
        });
        Self {
            position,
            title: node.text_param("title").map(str::to_string),
            width,
            open: node.param("open").and_then(|v| v.as_bool()),
            items: node.items.clone(),
        }
    }

    /// Filter variables declared by the sidebar's inputs.
    pub fn inputs(&self) -> impl Iterator<Item = &Node> {
        self.items.iter().filter(|n| n.kind == NodeKind::Input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_from_yaml() {
        let yaml = r#"
name: Survey Overview
data_path: data/survey.parquet
lazy_load_charts: true
sidebar:
  title: Filters
  blocks:
    - type: input
      filter_var: degree
content_blocks:
  - type: text
    content: Hello
.items:
  - type: divider
"#;
        let page: PageSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(page.slug(), "survey-overview");
        assert!(page.lazy_load_charts);
        assert_eq!(page.items.len(), 1);
        let sidebar = page.sidebar.as_ref().unwrap();
        assert_eq!(sidebar.position, SidebarPosition::Left);
        assert_eq!(sidebar.inputs().count(), 1);
        assert_eq!(
            page.datasets("data"),
            vec![Dataset::new("data", "data/survey.parquet")]
        );
    }

    #[test]
    fn test_named_datasets() {
        let page: PageSpec =
            serde_yaml::from_str("data_path:\n  waves: w.rds\n  people: https://x.org/p.parquet")
                .unwrap();
        let sets = page.datasets("data");
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].name, "waves");
        assert_eq!(sets[0].format(), DataFormat::Rds);
        assert!(!sets[0].is_remote());
        assert!(sets[1].is_remote());
        assert_eq!(sets[1].format(), DataFormat::Parquet);
    }

    #[test]
    fn test_dataset_name_for_path() {
        assert_eq!(dataset_name_for_path("data/survey_2024.parquet"), "data_survey_2024");
        assert_eq!(dataset_name_for_path("https://x.org/My File.rds?raw=1"), "data_my_file");
    }

    #[test]
    fn test_sidebar_from_node() {
        let node = Node::new(NodeKind::Sidebar)
            .with("position", "right")
            .with("width", 300i64)
            .with_items(vec![Node::new(NodeKind::Input)]);
        let sidebar = SidebarSpec::from_node(&node);
        assert_eq!(sidebar.position, SidebarPosition::Right);
        assert_eq!(sidebar.width.as_deref(), Some("300px"));
        assert_eq!(sidebar.items.len(), 1);
    }

    #[test]
    fn test_slug_fallback() {
        assert_eq!(PageSpec::new("!!!").slug(), "page");
        assert_eq!(PageSpec::new("Über Uns").display_title(), "Über Uns");
    }
}
