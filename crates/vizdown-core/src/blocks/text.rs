/*
 * blocks/text.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Text-like blocks: text, quote, html, spacer, badge, divider, code.
 */

use vizdown_rexpr::RCall;

use super::helper_chunk;
use crate::context::CompileContext;
use crate::markup::{escape_html, escape_markdown, fence_for, slugify, text_lines};
use crate::spec::Node;

const DIVIDER_STYLES: &[&str] = &["thick", "dashed", "dotted"];

pub fn render_text(node: &Node) -> Vec<String> {
    node.str_param("content")
        .map(text_lines)
        .unwrap_or_default()
}

pub fn render_quote(node: &Node) -> Vec<String> {
    let Some(content) = node.str_param("content").or_else(|| node.str_param("quote")) else {
        return Vec::new();
    };
    let mut lines: Vec<String> = content
        .lines()
        .map(|l| if l.is_empty() { ">".to_string() } else { format!("> {}", l) })
        .collect();

    if let Some(attribution) = node.text_param("attribution") {
        let source = match node.text_param("cite") {
            Some(cite) => format!("[{}]({})", attribution, cite),
            None => attribution.to_string(),
        };
        lines.push(">".to_string());
        lines.push(format!("> --- {}", source));
    }
    lines
}

pub fn render_html(node: &Node) -> Vec<String> {
    let Some(content) = node.str_param("content") else {
        return Vec::new();
    };
    let mut lines = vec!["```{=html}".to_string()];
    lines.extend(text_lines(content));
    lines.push("```".to_string());
    lines
}

pub fn render_spacer(node: &Node) -> Vec<String> {
    let height = node
        .param("height")
        .map(|h| h.display_text())
        .unwrap_or_else(|| "2rem".to_string());
    vec![format!(
        "<div class=\"spacer\" style=\"height: {};\"></div>",
        escape_html(&height)
    )]
}

pub fn render_badge(node: &Node) -> Vec<String> {
    let Some(text) = node.text_param("text") else {
        return Vec::new();
    };
    let color = node
        .text_param("color")
        .map(slugify)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "primary".to_string());
    vec![format!("[{}]{{.badge .bg-{}}}", escape_markdown(text), color)]
}

pub fn render_divider(node: &Node, ctx: &mut CompileContext) -> Vec<String> {
    match node.str_param("style") {
        Some(style) if DIVIDER_STYLES.contains(&style) => {
            let mut call = RCall::new(ctx.runtime_fn("styled_divider")).arg("style", style);
            for key in ["color", "thickness", "margin"] {
                if let Some(value) = node.param(key) {
                    call.push_arg(key, value.clone());
                }
            }
            helper_chunk("divider", call, ctx)
        }
        _ => vec!["---".to_string()],
    }
}

pub fn render_code(node: &Node) -> Vec<String> {
    let code = node.str_param("code").or_else(|| node.str_param("content")).unwrap_or("");
    let language = node.text_param("language").unwrap_or("text");
    let fence = fence_for(code);

    let open = match node.text_param("filename") {
        Some(filename) => format!(
            "{}{{.{} filename=\"{}\"}}",
            fence,
            language,
            escape_html(filename)
        ),
        None => format!("{}{}", fence, language),
    };

    let mut lines = vec![open];
    lines.extend(text_lines(code));
    lines.push(fence);
    lines
}
