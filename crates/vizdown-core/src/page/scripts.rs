/*
 * page/scripts.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Data embedding, loading overlay and lazy-load scripts.
 */

use vizdown_rexpr::{RCall, RValue};

use crate::chunk::CodeChunk;
use crate::context::CompileContext;

fn script_chunk(label: &str, calls: Vec<RCall>) -> Vec<String> {
    let mut chunk = CodeChunk::new().label(label).asis();
    for call in calls {
        for line in call.lines() {
            chunk.push_line(line);
        }
    }
    chunk.into_lines()
}

/// Embed every page dataset for client-side use.
pub fn render_embed_data(ctx: &CompileContext) -> Vec<String> {
    if !ctx.page.embed_full_data || !ctx.page.has_data() {
        return Vec::new();
    }
    let calls = ctx
        .page
        .datasets(&ctx.options.default_dataset)
        .into_iter()
        .map(|dataset| {
            RCall::new(ctx.runtime_fn("embed_data"))
                .positional(RValue::raw(dataset.name.as_str()))
                .arg("name", dataset.name)
        })
        .collect();
    script_chunk("embed-data", calls)
}

/// Loading overlay and lazy-load bootstrap.
pub fn render_loading_scripts(ctx: &CompileContext) -> Vec<String> {
    let page = ctx.page;
    let mut calls = Vec::new();

    if page.overlay {
        calls.push(
            RCall::new(ctx.runtime_fn("loading_overlay"))
                .arg_opt("theme", page.overlay_theme.as_deref())
                .arg_opt("text", page.overlay_text.as_deref())
                .arg_opt("duration", page.overlay_duration),
        );
    }

    if page.lazy_load_charts || page.lazy_load_tabs {
        calls.push(
            RCall::new(ctx.runtime_fn("lazy_load_script"))
                .arg_opt("margin", page.lazy_load_margin.as_deref())
                .arg("charts", page.lazy_load_charts)
                .arg("tabs", page.lazy_load_tabs),
        );
    }

    if calls.is_empty() {
        return Vec::new();
    }
    script_chunk("loading-scripts", calls)
}

/// Debug hook for lazy loading.
pub fn render_debug_script(ctx: &CompileContext) -> Vec<String> {
    if !ctx.page.lazy_debug {
        return Vec::new();
    }
    script_chunk(
        "lazy-debug",
        vec![RCall::new(ctx.runtime_fn("lazy_debug_script"))],
    )
}
