/*
 * blocks/inputs.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Input widgets.
 */

//! Input widgets.
//!
//! Inputs render as a call to the runtime's `render_input` helper. Inputs
//! can be chained: when an input is immediately followed by one whose
//! `cascade_parent` names it, the parent call carries the child's id and
//! its `options_by_parent` map so the client can narrow the child's
//! options after each selection.

use vizdown_rexpr::{RCall, RValue};

use super::helper_chunk;
use crate::condition::apply_show_when;
use crate::context::CompileContext;
use crate::error::{CompileError, Result};
use crate::markup::{push_block, slugify};
use crate::spec::{Node, NodeKind};

/// Input types the runtime can render.
pub const INPUT_TYPES: &[&str] = &[
    "select_single",
    "select_multiple",
    "checkbox",
    "radio",
    "switch",
    "slider",
    "text",
    "number",
    "button_group",
    "date",
];

const DEFAULT_INPUT_TYPE: &str = "select_multiple";

/// Parameters consumed explicitly; everything else passes through.
const CONSUMED: &[&str] = &[
    "input_id",
    "label",
    "input_type",
    "filter_var",
    "options",
    "option_labels",
    "default",
    "options_by_parent",
];

/// An input's id: `input_id`, or derived from `filter_var`/`label`.
pub fn input_id(node: &Node) -> Option<String> {
    if let Some(id) = node.text_param("input_id") {
        return Some(id.to_string());
    }
    let basis = node
        .param("filter_var")
        .and_then(RValue::as_str_list)
        .and_then(|vars| vars.first().map(|s| s.to_string()))
        .or_else(|| node.text_param("label").map(str::to_string))?;
    let slug = slugify(&basis);
    (!slug.is_empty()).then(|| format!("input-{}", slug))
}

/// Filter variables declared by an input, validated to be a string or a
/// list of strings.
pub fn filter_vars(node: &Node) -> Result<Vec<String>> {
    match node.params.get("filter_var") {
        None | Some(RValue::Null) => Ok(Vec::new()),
        Some(value) => value
            .as_str_list()
            .map(|vars| vars.into_iter().map(str::to_string).collect())
            .ok_or_else(|| CompileError::InvalidFilterVar {
                context: format!(
                    "expected a string or list of strings, got {}",
                    vizdown_rexpr::serialize(value)
                ),
            }),
    }
}

fn validate(node: &Node, id: &str) -> Result<String> {
    let input_type = node
        .text_param("input_type")
        .unwrap_or(DEFAULT_INPUT_TYPE)
        .to_string();
    if !INPUT_TYPES.contains(&input_type.as_str()) {
        return Err(CompileError::UnknownInputType {
            id: id.to_string(),
            input_type,
        });
    }

    if let (Some(options), Some(labels)) = (node.param("options"), node.param("option_labels"))
        && options.len() != labels.len()
    {
        return Err(CompileError::LengthMismatch {
            context: format!("input '{}'", id),
            left: "options".to_string(),
            left_len: options.len(),
            right: "option_labels".to_string(),
            right_len: labels.len(),
        });
    }

    Ok(input_type)
}

/// True when `next` declares itself the cascade child of `node`.
pub fn is_cascade_child(node: &Node, next: &Node) -> bool {
    next.kind == NodeKind::Input
        && match (input_id(node), next.text_param("cascade_parent")) {
            (Some(id), Some(parent)) => id == parent,
            _ => false,
        }
}

pub fn render_input(
    node: &Node,
    next: Option<&Node>,
    ctx: &mut CompileContext,
) -> Result<Vec<String>> {
    let id = input_id(node).unwrap_or_else(|| ctx.next_label("input"));
    let input_type = validate(node, &id)?;

    let mut call = RCall::new(ctx.runtime_fn("render_input"))
        .arg("input_id", id.as_str())
        .arg("label", node.str_param("label").unwrap_or(""))
        .arg("type", input_type);

    let vars = filter_vars(node)?;
    match vars.as_slice() {
        [] => {}
        [single] => call.push_arg("filter_var", single.as_str()),
        many => call.push_arg("filter_var", RValue::strings(many.iter())),
    }

    for key in ["options", "option_labels", "default"] {
        if let Some(value) = node.param(key) {
            call.push_arg(key, value.clone());
        }
    }

    for (key, value) in &node.params {
        if CONSUMED.contains(&key.as_str()) || value.is_null() {
            continue;
        }
        call.push_arg(key.as_str(), value.clone());
    }

    if let Some(child) = next.filter(|n| is_cascade_child(node, n)) {
        let child_id = input_id(child).unwrap_or_default();
        tracing::debug!(parent = %id, child = %child_id, "linking cascading inputs");
        call.push_arg("cascade_child", child_id);
        if let Some(map) = child.param("options_by_parent") {
            call.push_arg("cascade_map", map.clone());
        }
    }

    let mut label = slugify(&id);
    if !label.starts_with("input") {
        label = format!("input-{}", label);
    }
    Ok(helper_chunk(&label, call, ctx))
}

/// Inputs laid out side by side.
pub fn render_input_row(node: &Node, ctx: &mut CompileContext) -> Result<Vec<String>> {
    let mut items = node.items.clone();
    crate::spec::sort_by_insertion(&mut items);

    let mut lines = vec!["::: {.input-row}".to_string()];
    for (i, item) in items.iter().enumerate() {
        let rendered = match item.kind {
            NodeKind::Input => render_input(item, items.get(i + 1), ctx)?,
            _ => super::render_block(item, items.get(i + 1), ctx)?,
        };
        // Charts wrap themselves.
        let rendered = if item.is_viz() {
            rendered
        } else {
            apply_show_when(item.show_when.as_deref(), rendered)?
        };
        push_block(&mut lines, rendered);
    }
    lines.push(String::new());
    lines.push(":::".to_string());
    Ok(lines)
}
