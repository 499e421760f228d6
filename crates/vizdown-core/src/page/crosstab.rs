/*
 * page/crosstab.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Cross-tab filter variable propagation.
 */

//! Cross-tab filter propagation.
//!
//! Every input on a page filters by one or more variables. Charts that can
//! re-aggregate on the client need to know those variables up front, so
//! the `filter_var`s of all inputs (sidebar first, then content) are
//! collected once and written into each chart's `cross_tab_filter_vars`
//! unless the author set it.
//!
//! Whether the variables exist in a chart's dataset is not checked here;
//! a missing column only shows up when the document is executed.

use indexmap::IndexSet;
use vizdown_rexpr::RValue;

use crate::blocks::inputs::filter_vars;
use crate::error::{CompileError, Result};
use crate::spec::{Node, NodeKind, PageSpec, SidebarSpec, walk, walk_mut};

/// Filter variables of every input, deduplicated in discovery order.
pub fn collect(
    page: &PageSpec,
    sidebar: Option<&SidebarSpec>,
    content: &[Node],
) -> Result<Vec<String>> {
    let mut vars = IndexSet::new();

    let groups = sidebar
        .map(|s| ("sidebar", s.items.as_slice()))
        .into_iter()
        .chain(std::iter::once(("content", content)));
    for (group, items) in groups {
        for (index, item) in items.iter().enumerate() {
            let found = input_vars(item).map_err(|source| CompileError::ContentItem {
                page: page.name.clone(),
                group,
                index,
                source: Box::new(source),
            })?;
            vars.extend(found);
        }
    }

    Ok(vars.into_iter().collect())
}

fn input_vars(item: &Node) -> Result<Vec<String>> {
    let mut inputs = Vec::new();
    walk(std::slice::from_ref(item), &mut |node| {
        if node.kind == NodeKind::Input {
            inputs.push(node);
        }
    });

    let mut vars = Vec::new();
    for input in inputs {
        vars.extend(filter_vars(input)?);
    }
    Ok(vars)
}

/// Set `cross_tab_filter_vars` on every chart that does not have it.
pub fn inject(content: &mut [Node], vars: &[String]) {
    walk_mut(content, &mut |node| {
        if node.is_viz() && !node.has("cross_tab_filter_vars") {
            node.params.insert(
                "cross_tab_filter_vars".to_string(),
                RValue::strings(vars.iter()),
            );
        }
    });
}
