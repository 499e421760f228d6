/*
 * page/setup.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The page's setup chunk.
 */

//! Setup chunk.
//!
//! Runs before any content and produces no output. In order it attaches
//! the runtime package, sets global defaults, loads datasets, derives the
//! filtered datasets registered for the page's charts and reads
//! out-of-band objects.

use indexmap::IndexSet;
use vizdown_rexpr::{RCall, RValue};

use super::prepare::PreparedPage;
use crate::blocks::tables::{object_file, preload_line};
use crate::chunk::CodeChunk;
use crate::context::CompileContext;
use crate::spec::{DataFormat, Dataset, dataset_name_for_path};

/// Statement binding a dataset to its variable.
pub fn load_line(dataset: &Dataset) -> String {
    let path = dataset.path.as_str();
    let reader = match (dataset.format(), dataset.is_remote()) {
        (DataFormat::Parquet, _) => RCall::new("arrow::read_parquet").positional(path),
        (DataFormat::Rds, false) => RCall::new("readRDS").positional(path),
        (DataFormat::Rds, true) => {
            let connection = RCall::new("url").positional(path);
            let gz = RCall::new("gzcon").positional(connection);
            RCall::new("readRDS").positional(gz)
        }
    };
    format!("{} <- {}", dataset.name, reader.format_inline())
}

/// Datasets referenced by `data_path` on individual charts.
fn chart_datasets(prepared: &PreparedPage) -> Vec<Dataset> {
    let mut seen = IndexSet::new();
    for node in prepared.all_nodes() {
        if node.is_viz()
            && !node.has("data")
            && let Some(path) = node.text_param("data_path")
        {
            seen.insert(Dataset::new(&dataset_name_for_path(path), path));
        }
    }
    seen.into_iter().collect()
}

/// The setup chunk, or nothing when the page has no data and no R content.
pub fn render_setup(prepared: &PreparedPage, ctx: &CompileContext) -> Vec<String> {
    let page = ctx.page;
    let package = ctx.options.runtime_package.as_str();

    let mut body = vec![format!("library({})", package)];

    if let Some(backend) = page.backend.as_deref().filter(|b| !b.trim().is_empty()) {
        let option = format!("{}.backend", package);
        body.push(RCall::new("options").arg(option, backend).format_inline());
    }

    let datasets = page.datasets(&ctx.options.default_dataset);
    body.extend(datasets.iter().map(load_line));
    body.extend(chart_datasets(prepared).iter().map(load_line));

    for entry in ctx.filters.entries() {
        let call = RCall::new("dplyr::filter")
            .positional(RValue::raw(entry.source.as_str()))
            .positional(RValue::raw(entry.expr.as_str()));
        body.push(format!("{} <- {}", entry.name, call.format_inline()));
    }

    let mut files = IndexSet::new();
    for node in prepared.all_nodes() {
        if let Some(path) = object_file(node) {
            files.insert(path);
        }
    }
    body.extend(files.into_iter().map(preload_line));

    if body.len() == 1 && !prepared.has_r_content() {
        tracing::debug!("no data or R content, omitting setup chunk");
        return Vec::new();
    }

    CodeChunk::new()
        .label("setup")
        .hidden()
        .lines(body)
        .into_lines()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMode;
    use crate::options::CompileOptions;
    use crate::page::prepare::prepare;
    use crate::spec::{DataSource, Node, NodeKind, PageSpec};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_lines() {
        let cases = [
            ("data/s.parquet", "data <- arrow::read_parquet('data/s.parquet')"),
            (
                "https://x.org/s.parquet",
                "data <- arrow::read_parquet('https://x.org/s.parquet')",
            ),
            ("data/s.rds", "data <- readRDS('data/s.rds')"),
            (
                "https://x.org/s.rds?raw=1",
                "data <- readRDS(gzcon(url('https://x.org/s.rds?raw=1')))",
            ),
        ];
        for (path, expected) in cases {
            assert_eq!(load_line(&Dataset::new("data", path)), expected);
        }
    }

    #[test]
    fn test_full_setup_chunk() {
        let options = CompileOptions::default();
        let mut page = PageSpec::new("p");
        page.backend = Some("echarts4r".to_string());
        page.data_path = Some(DataSource::Single("data/survey.parquet".to_string()));
        page.content_blocks = vec![
            Node::viz("bar").with("filter", "~ wave == 2"),
            Node::viz("bar").with("data_path", "extra/panel.rds"),
            Node::new(NodeKind::Gt).with("table_file", "tables/t1.rds"),
        ];
        let prepared = prepare(&page).unwrap();
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let filtered = crate::viz::register_filter(&prepared.content[0], &mut ctx).unwrap();

        let lines = render_setup(&prepared, &ctx);
        assert_eq!(
            &lines[..4],
            &["```{r}", "#| label: setup", "#| echo: false", "#| include: false"]
        );
        assert_eq!(lines[4], "library(vizkit)");
        assert_eq!(lines[5], "options(vizkit.backend = 'echarts4r')");
        assert_eq!(lines[6], "data <- arrow::read_parquet('data/survey.parquet')");
        assert_eq!(lines[7], "data_panel <- readRDS('extra/panel.rds')");
        assert_eq!(lines[8], format!("{} <- dplyr::filter(data, wave == 2)", filtered));
        assert!(lines[9].starts_with("preloaded_t1_"));
        assert_eq!(lines[10], "```");
    }

    #[test]
    fn test_filter_on_expression_source_is_valid_r() {
        let options = CompileOptions::default();
        let mut page = PageSpec::new("p");
        page.content_blocks = vec![
            Node::viz("bar")
                .with("data", vizdown_rexpr::RValue::raw("head(data, 10)"))
                .with("filter", "~ x > 5"),
        ];
        let prepared = prepare(&page).unwrap();
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let filtered = crate::viz::register_filter(&prepared.content[0], &mut ctx).unwrap();

        let lines = render_setup(&prepared, &ctx);
        assert!(filtered.starts_with("head_data_10_filtered_"));
        assert!(lines.contains(&format!(
            "{} <- dplyr::filter(head(data, 10), x > 5)",
            filtered
        )));
    }

    #[test]
    fn test_setup_omitted_without_data_or_r() {
        let options = CompileOptions::default();
        let mut page = PageSpec::new("p");
        page.content_blocks = vec![Node::text("just prose")];
        let prepared = prepare(&page).unwrap();
        let ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        assert!(render_setup(&prepared, &ctx).is_empty());
    }

    #[test]
    fn test_setup_kept_for_r_content() {
        let options = CompileOptions::default();
        let mut page = PageSpec::new("p");
        page.content_blocks = vec![Node::new(NodeKind::Metric).with("value", 3i64)];
        let prepared = prepare(&page).unwrap();
        let ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let lines = render_setup(&prepared, &ctx);
        assert_eq!(lines[4], "library(vizkit)");
    }
}
