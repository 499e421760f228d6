/*
 * viz/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Visualization code generator.
 */

//! Visualization code generator.
//!
//! Turns one `viz` node into an R chunk that builds the chart:
//!
//! ```r
//! result <- tryCatch({
//!   vizkit::viz_bar(
//!     data = data_filtered_3c59dc04,
//!     x_var = 'degree'
//!   )
//! }, error = function(e) {
//!   stop(paste0('Visualization failed (\'Degrees\', type \'bar\'): ', conditionMessage(e)), call. = FALSE)
//! })
//! result <- vizkit::force_height(result, 450L)
//! result
//! ```
//!
//! Post-processing statements always run in the same order: height,
//! export, reference lines, annotations, cross-tab embedding, fixed-height
//! container. The container changes the object's outer shape, so it comes
//! last.

pub mod filter;
pub mod registry;

use indexmap::IndexMap;
use vizdown_rexpr::{RCall, RValue, format_name, quote_string};

use crate::chunk::CodeChunk;
use crate::condition::wrap_show_when;
use crate::context::CompileContext;
use crate::error::{CompileError, Result};
use crate::markup::{heading, push_block, quote_attr, slugify, text_lines};
use crate::spec::{Node, dataset_name_for_path};

/// Generate a chart without a heading.
pub fn generate(node: &Node, ctx: &mut CompileContext) -> Result<Vec<String>> {
    generate_with_heading(node, None, ctx)
}

/// Generate a chart, with its title as a heading at `heading_level` when
/// both are present.
pub fn generate_with_heading(
    node: &Node,
    heading_level: Option<usize>,
    ctx: &mut CompileContext,
) -> Result<Vec<String>> {
    let viz_type = node
        .viz_type()
        .ok_or_else(|| CompileError::invalid("viz node without a viz_type"))?;

    tracing::debug!(viz_type, title = node.title().unwrap_or(""), "generating chart");

    let mut params = node.params.clone();
    registry::apply_aliases(&mut params);

    let data = resolve_data(node, viz_type, &params, ctx);
    let chunk = build_chunk(node, viz_type, &params, &data, ctx);

    let mut lines = Vec::new();
    if let (Some(level), Some(title)) = (heading_level, node.title()) {
        lines.push(heading(level, title));
    }

    let text = node.text_param("text").map(text_lines);
    let below = node.str_param("text_position") == Some("below");
    if let (Some(text), false) = (&text, below) {
        push_block(&mut lines, text.clone());
    }

    let chunk_lines = chunk.into_lines();
    if ctx.page.lazy_load_charts {
        push_block(&mut lines, lazy_wrap(chunk_lines, ctx));
    } else {
        push_block(&mut lines, chunk_lines);
    }

    if let (Some(text), true) = (text, below) {
        push_block(&mut lines, text);
    }

    match &node.show_when {
        Some(expr) => wrap_show_when(expr, lines),
        None => Ok(lines),
    }
}

/// The data argument: a dataset name, a filtered dataset, or a verbatim
/// expression, optionally piped through `tidyr::drop_na`.
fn resolve_data(
    node: &Node,
    viz_type: &str,
    params: &IndexMap<String, RValue>,
    ctx: &mut CompileContext,
) -> String {
    let mut data = register_filter(node, ctx).unwrap_or_else(|| source_dataset(node, ctx));

    if node.flag("drop_na_vars") {
        let vars = registry::used_variables(viz_type, params);
        if !vars.is_empty() {
            data = format!(
                "tidyr::drop_na({}, dplyr::all_of({}))",
                data,
                vizdown_rexpr::serialize(&RValue::strings(vars))
            );
        }
    }

    data
}

/// Register a chart's `filter` predicate, returning the name of the
/// filtered dataset. `None` when the chart has no filter.
pub fn register_filter(node: &Node, ctx: &mut CompileContext) -> Option<String> {
    let expr = node.param("filter").and_then(RValue::as_code)?;
    if expr.trim().trim_start_matches('~').trim().is_empty() {
        return None;
    }
    let source = source_dataset(node, ctx);
    Some(ctx.filters.register(&source, expr))
}

/// Name of the dataset a chart reads before filtering.
pub fn source_dataset(node: &Node, ctx: &CompileContext) -> String {
    match node.param("data") {
        Some(RValue::Str(name)) if !name.trim().is_empty() => {
            format_name(name.trim()).into_owned()
        }
        Some(RValue::Raw(code)) => code.clone(),
        _ => match node.text_param("data_path") {
            Some(path) => dataset_name_for_path(path),
            None => ctx.dataset.clone(),
        },
    }
}

fn build_call(
    viz_type: &str,
    params: &IndexMap<String, RValue>,
    data: &str,
    ctx: &CompileContext,
) -> RCall {
    let function = registry::function_for(viz_type, &ctx.options.runtime_package);
    let mut call = RCall::new(function).arg("data", RValue::raw(data));

    for (key, value) in params {
        if registry::is_excluded(key) || value.is_null() {
            continue;
        }
        call.push_arg(key.as_str(), value.clone());
    }

    for (key, value) in registry::injected_defaults(viz_type) {
        if !params.contains_key(key) {
            call.push_arg(key, value);
        }
    }

    if !params.contains_key("backend")
        && let Some(backend) = ctx.page.backend.as_deref()
        && backend != ctx.options.default_backend
    {
        call.push_arg("backend", backend);
    }

    call
}

fn error_message(
    node: &Node,
    viz_type: &str,
    params: &IndexMap<String, RValue>,
    ctx: &CompileContext,
) -> String {
    let title = node.title().unwrap_or("untitled");
    let mut message = format!("Visualization failed ('{}', type '{}'", title, viz_type);
    if ctx.page.contextual_viz_errors {
        let vars = registry::used_variables(viz_type, params);
        if !vars.is_empty() {
            message.push_str(&format!("; variables: {}", vars.join(", ")));
        }
    }
    message.push_str("): ");
    message
}

fn build_chunk(
    node: &Node,
    viz_type: &str,
    params: &IndexMap<String, RValue>,
    data: &str,
    ctx: &mut CompileContext,
) -> CodeChunk {
    let call = build_call(viz_type, params, data, ctx);
    let message = error_message(node, viz_type, params, ctx);

    let mut body = vec!["result <- tryCatch({".to_string()];
    body.extend(call.lines().into_iter().map(|l| format!("  {}", l)));
    body.push("}, error = function(e) {".to_string());
    body.push(format!(
        "  stop(paste0({}, conditionMessage(e)), call. = FALSE)",
        quote_string(&message)
    ));
    body.push("})".to_string());
    body.extend(post_process(node, viz_type, params, data, ctx));
    body.push("result".to_string());

    let label = ctx.next_label(&label_base(node, viz_type, params));
    CodeChunk::new()
        .label(label)
        .cache(node.flag("cache") || ctx.page.cache)
        .lines(body)
}

/// `viz-<type>-<slug of title or first variable>`.
fn label_base(node: &Node, viz_type: &str, params: &IndexMap<String, RValue>) -> String {
    let subject = node
        .title()
        .map(str::to_string)
        .or_else(|| registry::used_variables(viz_type, params).into_iter().next())
        .map(|s| slugify(&s))
        .unwrap_or_default();
    let type_slug = slugify(viz_type);
    if subject.is_empty() {
        format!("viz-{}", type_slug)
    } else {
        format!("viz-{}-{}", type_slug, subject)
    }
}

fn assign(call: RCall) -> String {
    format!("result <- {}", call.format_inline())
}

fn post_process(
    node: &Node,
    viz_type: &str,
    params: &IndexMap<String, RValue>,
    data: &str,
    ctx: &CompileContext,
) -> Vec<String> {
    let mut lines = Vec::new();
    let result = || RValue::raw("result");

    // (a) height
    if let Some(height) = node.param("height") {
        lines.push(assign(
            RCall::new(ctx.runtime_fn("force_height"))
                .positional(result())
                .positional(height.clone()),
        ));
    }

    // (b) export button
    if node.flag("export") || ctx.page.chart_export {
        lines.push(assign(
            RCall::new(ctx.runtime_fn("enable_export")).positional(result()),
        ));
    }

    // (c) reference lines
    for entry in entries_of(node.param("reference_lines")) {
        let (axis, value_key) = if entry.contains_key("y") {
            ("y", "y")
        } else {
            ("x", "x")
        };
        let mut call = RCall::new(ctx.runtime_fn("add_reference_line"))
            .positional(result())
            .arg("axis", axis);
        if let Some(value) = entry.get(value_key) {
            call.push_arg("value", value.clone());
        }
        for (key, value) in entry {
            if key != "x" && key != "y" {
                call.push_arg(key.as_str(), value.clone());
            }
        }
        lines.push(assign(call));
    }

    // (d) annotations
    for entry in entries_of(node.param("annotations")) {
        let mut call = RCall::new(ctx.runtime_fn("add_annotation")).positional(result());
        for (key, value) in entry {
            call.push_arg(key.as_str(), value.clone());
        }
        lines.push(assign(call));
    }

    // (e) cross-tab embedding
    let filter_vars = node
        .param("cross_tab_filter_vars")
        .and_then(RValue::as_str_list)
        .unwrap_or_default();
    if !filter_vars.is_empty() && registry::supports_cross_tab(viz_type) {
        let mut call = RCall::new(ctx.runtime_fn("embed_cross_tab"))
            .positional(result())
            .arg("data", RValue::raw(data))
            .arg("filter_vars", RValue::strings(filter_vars))
            .arg("viz_type", viz_type);
        for key in registry::variable_params(viz_type, params) {
            call.push_arg(key, params[key].clone());
        }
        lines.push(assign(call));
    }

    // (f) fixed-height container
    let fixed = match node.param("fixed_height") {
        Some(RValue::Bool(true)) => node.param("height").cloned(),
        Some(RValue::Bool(false)) | None => None,
        Some(other) => Some(other.clone()),
    };
    if let Some(height) = fixed {
        lines.push(assign(
            RCall::new(ctx.runtime_fn("fixed_height_container"))
                .positional(result())
                .arg("height", height),
        ));
    }

    lines
}

/// A list of named entries, or a single named entry.
fn entries_of(value: Option<&RValue>) -> Vec<&IndexMap<String, RValue>> {
    match value {
        Some(RValue::Map(map)) => vec![map],
        Some(RValue::List(items)) => items.iter().filter_map(RValue::as_map).collect(),
        _ => Vec::new(),
    }
}

fn lazy_wrap(chunk: Vec<String>, ctx: &CompileContext) -> Vec<String> {
    let open = match ctx.page.lazy_load_margin.as_deref() {
        Some(margin) => format!("::: {{.viz-lazy data-margin={}}}", quote_attr(margin)),
        None => "::: {.viz-lazy}".to_string(),
    };
    let mut lines = Vec::with_capacity(chunk.len() + 4);
    lines.push(open);
    lines.push(String::new());
    lines.extend(chunk);
    lines.push(String::new());
    lines.push(":::".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMode;
    use crate::options::CompileOptions;
    use crate::spec::PageSpec;
    use pretty_assertions::assert_eq;

    fn render(node: &Node, page: &PageSpec) -> Vec<String> {
        let options = CompileOptions::default();
        let mut ctx = CompileContext::new(&options, page, LayoutMode::Flat);
        generate(node, &mut ctx).unwrap()
    }

    #[test]
    fn test_basic_bar_chart() {
        let node = Node::viz("bar").with("x_var", "degree").with("title", "Degrees");
        let lines = render(&node, &PageSpec::new("p"));
        assert_eq!(
            lines,
            vec![
                "```{r}",
                "#| label: viz-bar-degrees-1",
                "#| echo: false",
                "result <- tryCatch({",
                "  vizkit::viz_bar(",
                "    data = data,",
                "    x_var = 'degree'",
                "  )",
                "}, error = function(e) {",
                "  stop(paste0('Visualization failed (\\'Degrees\\', type \\'bar\\'): ', conditionMessage(e)), call. = FALSE)",
                "})",
                "result",
                "```",
            ]
        );
    }

    #[test]
    fn test_heading_and_text_below() {
        let node = Node::viz("pie")
            .with("x_var", "region")
            .with("title", "Regions")
            .with("text", "Source: survey")
            .with("text_position", "below");
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let lines = generate_with_heading(&node, Some(2), &mut ctx).unwrap();
        assert_eq!(lines[0], "## Regions");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "```{r}");
        assert_eq!(lines.last().unwrap(), "Source: survey");
    }

    #[test]
    fn test_aliased_types_inject_defaults() {
        let lines = render(&Node::viz("donut").with("x_var", "a"), &PageSpec::new("p"));
        assert!(lines.contains(&"  vizkit::viz_pie(".to_string()));
        assert!(lines.contains(&"    inner_size = '50%'".to_string()));

        let lines = render(
            &Node::viz("pyramid").with("x_var", "a").with("reversed", false),
            &PageSpec::new("p"),
        );
        assert!(lines.contains(&"    reversed = FALSE".to_string()));
        assert!(!lines.contains(&"    reversed = TRUE".to_string()));
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let lines = render(&Node::viz("my_chart").with("x_var", "a"), &PageSpec::new("p"));
        assert!(lines.contains(&"  my_chart(".to_string()));
        assert!(lines.contains(&"#| label: viz-my-chart-a-1".to_string()));
    }

    #[test]
    fn test_legacy_aliases_match_modern_output() {
        let legacy = Node::viz("stackedbars")
            .with("questions", RValue::strings(["q1", "q2"]))
            .with("color_palette", RValue::strings(["#000"]));
        let modern = Node::viz("stackedbars")
            .with("x_vars", RValue::strings(["q1", "q2"]))
            .with("colors", RValue::strings(["#000"]));
        assert_eq!(
            render(&legacy, &PageSpec::new("p")),
            render(&modern, &PageSpec::new("p"))
        );
    }

    #[test]
    fn test_filter_and_drop_na() {
        let node = Node::viz("bar")
            .with("x_var", "degree")
            .with("weight_var", "wt")
            .with("filter", RValue::formula("~ wave == 2"))
            .with("drop_na_vars", true);
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let lines = generate(&node, &mut ctx).unwrap();
        let name = ctx.filters.entries().next().unwrap().name.clone();
        assert!(lines.contains(&format!(
            "    data = tidyr::drop_na({}, dplyr::all_of(c('degree', 'wt'))),",
            name
        )));
    }

    #[test]
    fn test_post_processing_order() {
        let mut ref_line = IndexMap::new();
        ref_line.insert("y".to_string(), RValue::Int(50));
        ref_line.insert("label".to_string(), RValue::from("Target"));
        let mut note = IndexMap::new();
        note.insert("x".to_string(), RValue::from("2020"));
        note.insert("text".to_string(), RValue::from("Launch"));

        let node = Node::viz("bar")
            .with("x_var", "degree")
            .with("height", 400i64)
            .with("export", true)
            .with("reference_lines", RValue::List(vec![RValue::Map(ref_line)]))
            .with("annotations", RValue::Map(note))
            .with("cross_tab_filter_vars", RValue::strings(["region"]))
            .with("fixed_height", true);
        let lines = render(&node, &PageSpec::new("p"));
        let post: Vec<&str> = lines
            .iter()
            .filter(|l| l.starts_with("result <- vizkit::"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            post,
            vec![
                "result <- vizkit::force_height(result, 400L)",
                "result <- vizkit::enable_export(result)",
                "result <- vizkit::add_reference_line(result, axis = 'y', value = 50L, label = 'Target')",
                "result <- vizkit::add_annotation(result, x = '2020', text = 'Launch')",
                "result <- vizkit::embed_cross_tab(result, data = data, filter_vars = c('region'), viz_type = 'bar', x_var = 'degree')",
                "result <- vizkit::fixed_height_container(result, height = 400L)",
            ]
        );
        assert_eq!(lines[lines.len() - 2], "result");
        assert!(!lines.iter().any(|l| l.contains("    height =")));
    }

    #[test]
    fn test_cross_tab_skipped_for_unsupported_type() {
        let node = Node::viz("scatter")
            .with("x_var", "a")
            .with("y_var", "b")
            .with("cross_tab_filter_vars", RValue::strings(["region"]));
        let lines = render(&node, &PageSpec::new("p"));
        assert!(!lines.iter().any(|l| l.contains("embed_cross_tab")));
    }

    #[test]
    fn test_page_flags() {
        let mut page = PageSpec::new("p");
        page.backend = Some("plotly".to_string());
        page.cache = true;
        page.lazy_load_charts = true;
        page.contextual_viz_errors = true;
        let lines = render(&Node::viz("bar").with("x_var", "degree"), &page);
        assert_eq!(lines[0], "::: {.viz-lazy}");
        assert!(lines.contains(&"#| cache: true".to_string()));
        assert!(lines.contains(&"    backend = 'plotly'".to_string()));
        assert!(lines.iter().any(|l| l.contains("variables: degree")));
        assert_eq!(lines.last().unwrap(), ":::");
    }

    #[test]
    fn test_default_backend_not_repeated() {
        let mut page = PageSpec::new("p");
        page.backend = Some("highcharter".to_string());
        let lines = render(&Node::viz("bar").with("x_var", "degree"), &page);
        assert!(!lines.iter().any(|l| l.contains("backend")));
    }

    #[test]
    fn test_show_when_wraps_chart() {
        let node = Node::viz("bar").with("x_var", "degree").with_show_when("wave == 2");
        let lines = render(&node, &PageSpec::new("p"));
        assert!(lines[0].starts_with("<div class=\"viz-show-when\""));
        assert_eq!(lines.last().unwrap(), "</div>");
    }

    #[test]
    fn test_missing_viz_type_is_an_error() {
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let node = Node::new(crate::spec::NodeKind::Viz);
        assert!(matches!(generate(&node, &mut ctx), Err(CompileError::InvalidSpec(_))));
    }

    #[test]
    fn test_data_sources() {
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        assert_eq!(source_dataset(&Node::viz("bar").with("data", "waves"), &ctx), "waves");
        assert_eq!(
            source_dataset(&Node::viz("bar").with("data", RValue::raw("head(data, 10)")), &ctx),
            "head(data, 10)"
        );
        assert_eq!(
            source_dataset(&Node::viz("bar").with("data_path", "extra/people.parquet"), &ctx),
            "data_people"
        );
        assert_eq!(source_dataset(&Node::viz("bar"), &ctx), "data");
        assert_eq!(
            source_dataset(&Node::viz("bar").with("data", "wave 2"), &ctx),
            "`wave 2`"
        );
    }

    #[test]
    fn test_filter_on_expression_source() {
        let node = Node::viz("bar")
            .with("x_var", "degree")
            .with("data", RValue::raw("head(data, 10)"))
            .with("filter", RValue::formula("~ x > 5"));
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Flat);
        let lines = generate(&node, &mut ctx).unwrap();

        let entry = ctx.filters.entries().next().unwrap().clone();
        assert!(entry.name.starts_with("head_data_10_filtered_"));
        assert_eq!(entry.source, "head(data, 10)");
        assert!(lines.contains(&format!("    data = {},", entry.name)));
    }
}
