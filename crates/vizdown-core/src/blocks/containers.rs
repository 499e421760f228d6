/*
 * blocks/containers.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Callouts, cards, accordions and modals.
 */

use crate::context::CompileContext;
use crate::markup::{escape_html, quote_attr, slugify, text_lines};
use crate::spec::Node;

/// Known callout types in Quarto.
const CALLOUT_TYPES: &[&str] = &["note", "warning", "tip", "caution", "important"];

fn body(node: &Node) -> Vec<String> {
    node.str_param("content")
        .or_else(|| node.str_param("text"))
        .map(text_lines)
        .unwrap_or_default()
}

pub fn render_callout(node: &Node) -> Vec<String> {
    let requested = node
        .str_param("callout_type")
        .or_else(|| node.str_param("style"))
        .unwrap_or("note");
    let callout_type = if CALLOUT_TYPES.contains(&requested) {
        requested
    } else {
        tracing::warn!(callout_type = requested, "unknown callout type, using note");
        "note"
    };

    let mut attrs = format!(".callout-{}", callout_type);
    if let Some(collapse) = node.param("collapse").and_then(|v| v.as_bool()) {
        attrs.push_str(&format!(" collapse=\"{}\"", collapse));
    }
    if let Some(icon) = node.param("icon").and_then(|v| v.as_bool()) {
        attrs.push_str(&format!(" icon=\"{}\"", icon));
    }

    let mut lines = vec![format!("::: {{{}}}", attrs)];
    if let Some(title) = node.title() {
        lines.push(format!("## {}", title));
        lines.push(String::new());
    }
    lines.extend(body(node));
    lines.push(":::".to_string());
    lines
}

pub fn render_card(node: &Node) -> Vec<String> {
    let mut open = ":::: {.card".to_string();
    if let Some(title) = node.title() {
        open.push_str(&format!(" title={}", quote_attr(title)));
    }
    open.push('}');

    let mut lines = vec![open];
    lines.extend(body(node));
    if let Some(footer) = node.text_param("footer") {
        lines.push(String::new());
        lines.push("::: {.card-footer}".to_string());
        lines.extend(text_lines(footer));
        lines.push(":::".to_string());
    }
    lines.push("::::".to_string());
    lines
}

pub fn render_accordion(node: &Node) -> Vec<String> {
    let open = if node.flag("open") { "<details open>" } else { "<details>" };
    let title = node.title().unwrap_or("Details");

    let mut lines = vec![
        open.to_string(),
        format!("<summary>{}</summary>", escape_html(title)),
        String::new(),
    ];
    lines.extend(body(node));
    lines.push(String::new());
    lines.push("</details>".to_string());
    lines
}

/// A hidden container opened by links pointing at `#<modal_id>`.
pub fn render_modal(node: &Node, ctx: &mut CompileContext) -> Vec<String> {
    let id = node
        .text_param("modal_id")
        .map(slugify)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| ctx.next_label("modal"));

    let mut lines = vec![format!(
        "::: {{#{} .modal-content style=\"display: none;\"}}",
        id
    )];
    if let Some(title) = node.title() {
        lines.push(format!("<div class=\"modal-title\">{}</div>", escape_html(title)));
        lines.push(String::new());
    }
    lines.extend(body(node));
    lines.push(":::".to_string());
    lines
}
