/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Per-compilation state.
 */

//! Compilation context.
//!
//! A [`CompileContext`] is created at the start of every page compilation
//! and dropped at the end. It owns the only mutable state of a run (the
//! chunk label counter and the filter map), so compiling the same page
//! twice yields identical text and pages can be compiled on separate
//! threads.

use crate::layout::LayoutMode;
use crate::options::CompileOptions;
use crate::spec::PageSpec;
use crate::viz::filter::FilterMap;

pub struct CompileContext<'a> {
    pub options: &'a CompileOptions,
    pub page: &'a PageSpec,
    pub mode: LayoutMode,
    /// Page slug, used for namespacing.
    pub slug: String,
    /// Filtered datasets derived in the setup chunk.
    pub filters: FilterMap,
    /// Variable name of the page's default dataset.
    pub dataset: String,
    counter: usize,
}

impl<'a> CompileContext<'a> {
    pub fn new(options: &'a CompileOptions, page: &'a PageSpec, mode: LayoutMode) -> Self {
        let dataset = match &page.data_path {
            Some(crate::spec::DataSource::Named(map)) => map
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| options.default_dataset.clone()),
            _ => options.default_dataset.clone(),
        };
        Self {
            options,
            page,
            mode,
            slug: page.slug(),
            filters: FilterMap::default(),
            dataset,
            counter: 0,
        }
    }

    /// A fresh chunk label: `<base>-<n>`, where `n` counts every label
    /// handed out in this run.
    pub fn next_label(&mut self, base: &str) -> String {
        self.counter += 1;
        format!("{}-{}", base, self.counter)
    }

    /// Number of labels handed out so far.
    pub fn label_count(&self) -> usize {
        self.counter
    }

    /// Display label for a tab, from the page's `tabgroup_labels` (full path
    /// first, then the segment name).
    pub fn tab_label(&self, name: &str, path: &str) -> String {
        self.configured_tab_label(name, path)
            .unwrap_or_else(|| name.to_string())
    }

    /// The `tabgroup_labels` entry for a tab, if the page configures one.
    pub fn configured_tab_label(&self, name: &str, path: &str) -> Option<String> {
        let labels = &self.page.tabgroup_labels;
        labels.get(path).or_else(|| labels.get(name)).cloned()
    }

    /// Namespaced runtime function name.
    pub fn runtime_fn(&self, name: &str) -> String {
        self.options.runtime_fn(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_unique_per_run() {
        let options = CompileOptions::default();
        let page = PageSpec::new("Overview");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        assert_eq!(ctx.next_label("viz-bar-age"), "viz-bar-age-1");
        assert_eq!(ctx.next_label("viz-bar-age"), "viz-bar-age-2");
        assert_eq!(ctx.next_label("input"), "input-3");

        let mut fresh = CompileContext::new(&options, &page, LayoutMode::Flat);
        assert_eq!(fresh.next_label("viz-bar-age"), "viz-bar-age-1");
    }

    #[test]
    fn test_tab_label_lookup() {
        let options = CompileOptions::default();
        let mut page = PageSpec::new("p");
        page.tabgroup_labels.insert("demo".to_string(), "Demographics".to_string());
        page.tabgroup_labels.insert("demo/age".to_string(), "Age groups".to_string());
        let ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        assert_eq!(ctx.tab_label("demo", "demo"), "Demographics");
        assert_eq!(ctx.tab_label("age", "demo/age"), "Age groups");
        assert_eq!(ctx.tab_label("other", "demo/other"), "other");
    }
}
