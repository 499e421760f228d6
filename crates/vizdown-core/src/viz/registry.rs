/*
 * viz/registry.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Static tables describing the chart types the runtime knows.
 */

//! Chart type tables.
//!
//! Everything the generator needs to know about a `viz_type` lives here:
//! the runtime function it maps to, defaults injected for aliased types,
//! and the variables each chart reads from its data.

use indexmap::IndexMap;
use vizdown_rexpr::RValue;

/// A known chart type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VizType {
    pub name: &'static str,
    /// Runtime function, without the package prefix.
    pub function: &'static str,
    /// Parameters naming data columns.
    pub variables: &'static [&'static str],
}

const VIZ_TYPES: &[VizType] = &[
    VizType {
        name: "bar",
        function: "viz_bar",
        variables: &["x_var", "group_var", "weight_var"],
    },
    VizType {
        name: "stackedbar",
        function: "viz_stackedbar",
        variables: &["x_var", "stack_var", "weight_var"],
    },
    VizType {
        name: "stackedbars",
        function: "viz_stackedbars",
        variables: &["x_vars", "stack_var", "weight_var"],
    },
    VizType {
        name: "histogram",
        function: "viz_histogram",
        variables: &["x_var", "group_var", "weight_var"],
    },
    VizType {
        name: "heatmap",
        function: "viz_heatmap",
        variables: &["x_var", "y_var", "value_var", "weight_var"],
    },
    VizType {
        name: "timeline",
        function: "viz_timeline",
        variables: &["time_var", "y_var", "group_var", "weight_var"],
    },
    VizType {
        name: "scatter",
        function: "viz_scatter",
        variables: &["x_var", "y_var", "color_var", "size_var"],
    },
    VizType {
        name: "treemap",
        function: "viz_treemap",
        variables: &["group_var", "subgroup_var", "value_var"],
    },
    VizType {
        name: "map",
        function: "viz_map",
        variables: &["location_var", "value_var"],
    },
    VizType {
        name: "pie",
        function: "viz_pie",
        variables: &["x_var", "weight_var"],
    },
    VizType {
        name: "donut",
        function: "viz_pie",
        variables: &["x_var", "weight_var"],
    },
    VizType {
        name: "funnel",
        function: "viz_funnel",
        variables: &["x_var", "value_var"],
    },
    VizType {
        name: "pyramid",
        function: "viz_funnel",
        variables: &["x_var", "value_var"],
    },
    VizType {
        name: "density",
        function: "viz_density",
        variables: &["x_var", "group_var", "weight_var"],
    },
    VizType {
        name: "boxplot",
        function: "viz_boxplot",
        variables: &["x_var", "y_var", "group_var"],
    },
    VizType {
        name: "lollipop",
        function: "viz_lollipop",
        variables: &["x_var", "y_var", "group_var"],
    },
    VizType {
        name: "dumbbell",
        function: "viz_dumbbell",
        variables: &["x_var", "low_var", "high_var"],
    },
    VizType {
        name: "gauge",
        function: "viz_gauge",
        variables: &["value_var"],
    },
    VizType {
        name: "waffle",
        function: "viz_waffle",
        variables: &["x_var", "weight_var"],
    },
    VizType {
        name: "sankey",
        function: "viz_sankey",
        variables: &["from_var", "to_var", "value_var"],
    },
];

/// Types whose charts can be re-aggregated client-side from a cross-tab.
pub const CROSS_TAB_TYPES: &[&str] = &[
    "bar",
    "stackedbar",
    "stackedbars",
    "pie",
    "donut",
    "timeline",
    "histogram",
    "heatmap",
];

/// Legacy parameter names and their modern replacements.
pub const PARAM_ALIASES: &[(&str, &str)] = &[
    ("questions", "x_vars"),
    ("question_labels", "x_var_labels"),
    ("response_var", "y_var"),
    ("color_palette", "colors"),
    ("stack_var_order", "stack_order"),
];

/// Keys consumed by the generator itself and never passed to the chart
/// function.
const EXCLUDED_PARAMS: &[&str] = &[
    "viz_type",
    "title",
    "title_tabset",
    "data",
    "data_path",
    "filter",
    "drop_na_vars",
    "height",
    "fixed_height",
    "text",
    "text_position",
    "cross_tab_filter_vars",
    "reference_lines",
    "annotations",
    "export",
    "cache",
    "nested_children",
];

pub fn lookup(viz_type: &str) -> Option<&'static VizType> {
    VIZ_TYPES.iter().find(|t| t.name == viz_type)
}

/// Function to call for `viz_type`. Known types are namespaced with
/// `package`; anything else is called by its literal name.
pub fn function_for(viz_type: &str, package: &str) -> String {
    match lookup(viz_type) {
        Some(t) => format!("{}::{}", package, t.function),
        None => viz_type.to_string(),
    }
}

/// Arguments added for aliased types unless the author set them.
pub fn injected_defaults(viz_type: &str) -> Vec<(&'static str, RValue)> {
    match viz_type {
        "donut" => vec![("inner_size", RValue::from("50%"))],
        "pyramid" => vec![("reversed", RValue::Bool(true))],
        _ => Vec::new(),
    }
}

pub fn supports_cross_tab(viz_type: &str) -> bool {
    CROSS_TAB_TYPES.contains(&viz_type)
}

pub fn is_excluded(key: &str) -> bool {
    EXCLUDED_PARAMS.contains(&key) || PARAM_ALIASES.iter().any(|(old, _)| *old == key)
}

/// Copy legacy parameters to their modern names. An explicit modern value
/// always wins.
pub fn apply_aliases(params: &mut IndexMap<String, RValue>) {
    for (old, new) in PARAM_ALIASES {
        if params.contains_key(*new) {
            continue;
        }
        if let Some(value) = params.get(*old).cloned() {
            params.insert((*new).to_string(), value);
        }
    }
}

/// Variable-naming parameters a chart of this type reads. Unknown types use
/// every `*_var`/`*_vars` key.
pub fn variable_params<'a>(viz_type: &str, params: &'a IndexMap<String, RValue>) -> Vec<&'a str> {
    match lookup(viz_type) {
        Some(t) => params
            .keys()
            .map(String::as_str)
            .filter(|k| t.variables.contains(k))
            .collect(),
        None => params
            .keys()
            .map(String::as_str)
            .filter(|k| k.ends_with("_var") || k.ends_with("_vars"))
            .collect(),
    }
}

/// Column names a chart uses, deduplicated in parameter order.
pub fn used_variables(viz_type: &str, params: &IndexMap<String, RValue>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let keys: Vec<&str> = match lookup(viz_type) {
        Some(t) => t.variables.to_vec(),
        None => variable_params(viz_type, params),
    };
    for key in keys {
        let Some(names) = params.get(key).and_then(RValue::as_str_list) else {
            continue;
        };
        for name in names {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        }
    }
    out
}
