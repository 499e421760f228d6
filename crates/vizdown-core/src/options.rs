/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compiler configuration.
 */

//! Compiler configuration.
//!
//! Options are usually loaded from a YAML file by the CLI. All fields have
//! defaults, so an empty file (or no file) yields a working configuration:
//!
//! ```yaml
//! runtime-package: vizkit
//! default-backend: highcharter
//! dashboard-row-size: 2
//! empty-page-text: This page has no content yet.
//! default-dataset: data
//! ```

use serde::{Deserialize, Serialize};

/// Settings shared by every page compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompileOptions {
    /// R package providing the `viz_*` renderers and helper functions.
    pub runtime_package: String,

    /// Chart backend assumed by the runtime when none is requested.
    pub default_backend: String,

    /// Maximum number of standalone charts per dashboard row.
    pub dashboard_row_size: usize,

    /// Sentence emitted for pages with no content at all.
    pub empty_page_text: String,

    /// Variable name of the page's dataset in the generated code.
    pub default_dataset: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            runtime_package: "vizkit".to_string(),
            default_backend: "highcharter".to_string(),
            dashboard_row_size: 2,
            empty_page_text: "This page has no content yet.".to_string(),
            default_dataset: "data".to_string(),
        }
    }
}

impl CompileOptions {
    /// Namespace a runtime function: `render_input` -> `vizkit::render_input`.
    pub fn runtime_fn(&self, name: &str) -> String {
        format!("{}::{}", self.runtime_package, name)
    }

    /// Row size, never below one.
    pub fn row_size(&self) -> usize {
        self.dashboard_row_size.max(1)
    }
}
