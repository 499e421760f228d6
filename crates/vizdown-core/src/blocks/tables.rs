/*
 * blocks/tables.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Tables and pre-rendered widgets.
 */

//! Tables, widgets and plots.
//!
//! These blocks print an R object. The object is either an inline
//! expression (`object`) or a file saved out of band (`table_file`,
//! `hc_file`, `widget_file`, `plot_file`). Files are read once by the page's
//! setup chunk into a `preloaded_*` variable; the block only references it.

use sha2::{Digest, Sha256};
use vizdown_rexpr::{RCall, RValue};

use crate::chunk::CodeChunk;
use crate::context::CompileContext;
use crate::markup::slugify;
use crate::spec::{Node, NodeKind};

/// Keys that point at out-of-band object files.
pub const FILE_KEYS: &[&str] = &["table_file", "hc_file", "widget_file", "plot_file"];

/// The object file a block references, if any.
pub fn object_file(node: &Node) -> Option<&str> {
    FILE_KEYS.iter().find_map(|key| node.text_param(key))
}

/// Variable holding a preloaded object: `preloaded_<stem>_<hash6>`.
pub fn preload_var(path: &str) -> String {
    let stem = path
        .rsplit('/')
        .next()
        .and_then(|file| file.split('.').next())
        .map(|s| slugify(s).replace('-', "_"))
        .unwrap_or_default();
    let hash = hex::encode(Sha256::digest(path.as_bytes()));
    if stem.is_empty() {
        format!("preloaded_{}", &hash[..6])
    } else {
        format!("preloaded_{}_{}", stem, &hash[..6])
    }
}

/// Setup statement reading an object file.
pub fn preload_line(path: &str) -> String {
    format!(
        "{} <- {}",
        preload_var(path),
        RCall::new("readRDS").positional(path).format_inline()
    )
}

fn object_expr(node: &Node) -> Option<String> {
    if let Some(path) = object_file(node) {
        return Some(preload_var(path));
    }
    node.param("object")
        .and_then(RValue::as_code)
        .filter(|code| !code.trim().is_empty())
        .map(|code| code.trim().to_string())
}

pub fn render_table(node: &Node, ctx: &mut CompileContext) -> Vec<String> {
    let Some(object) = object_expr(node) else {
        tracing::warn!(kind = %node.kind, "table block without object or file");
        return Vec::new();
    };
    let object = RValue::raw(object);

    let statement = match node.kind {
        NodeKind::Table => RCall::new("knitr::kable")
            .positional(object)
            .arg_opt("caption", node.text_param("caption"))
            .format_inline(),
        NodeKind::Dt if node.has("options") => RCall::new("DT::datatable")
            .positional(object)
            .arg_opt("options", node.param("options").cloned())
            .format_inline(),
        NodeKind::Reactable if node.has("options") => {
            let mut call = RCall::new("reactable::reactable").positional(object);
            match node.param("options") {
                Some(RValue::Map(options)) => {
                    for (key, value) in options {
                        call.push_arg(key.as_str(), value.clone());
                    }
                }
                Some(other) => call.push_arg("options", other.clone()),
                None => {}
            }
            call.format_inline()
        }
        _ => vizdown_rexpr::serialize(&object),
    };

    let label = format!("{}-block", slugify(node.kind.as_str()));
    let mut chunk = CodeChunk::new().label(ctx.next_label(&label));
    if let Some(width) = node.param("fig_width") {
        chunk = chunk.option("fig-width", width.display_text());
    }
    if let Some(height) = node.param("fig_height") {
        chunk = chunk.option("fig-height", height.display_text());
    }
    chunk.line(statement).into_lines()
}
