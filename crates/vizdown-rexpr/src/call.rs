/*
 * call.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Builder for R function calls.

use crate::serialize::{format_name, serialize};
use crate::value::RValue;

/// A function call with positional and named arguments.
///
/// Arguments keep the order in which they were added.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RCall {
    function: String,
    args: Vec<(Option<String>, RValue)>,
}

impl RCall {
    /// Start a call to `function`, which may be namespaced (`pkg::fn`).
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// Add a named argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<RValue>) -> Self {
        self.push_arg(name, value);
        self
    }

    /// Add a named argument only when `value` is `Some`.
    pub fn arg_opt(mut self, name: impl Into<String>, value: Option<impl Into<RValue>>) -> Self {
        if let Some(value) = value {
            self.push_arg(name, value);
        }
        self
    }

    /// Add an unnamed argument.
    pub fn positional(mut self, value: impl Into<RValue>) -> Self {
        self.args.push((None, value.into()));
        self
    }

    pub fn push_arg(&mut self, name: impl Into<String>, value: impl Into<RValue>) {
        self.args.push((Some(name.into()), value.into()));
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn has_arg(&self, name: &str) -> bool {
        self.args
            .iter()
            .any(|(n, _)| n.as_deref() == Some(name))
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    fn format_arg(name: Option<&str>, value: &RValue) -> String {
        match name {
            Some(name) => format!("{} = {}", format_name(name), serialize(value)),
            None => serialize(value),
        }
    }

    /// One argument per line, indented by two spaces.
    pub fn format(&self) -> String {
        self.lines().join("\n")
    }

    /// The whole call on a single line.
    pub fn format_inline(&self) -> String {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|(name, value)| Self::format_arg(name.as_deref(), value))
            .collect();
        format!("{}({})", self.function, args.join(", "))
    }

    /// The multi-line form split into lines, for embedding into a chunk body
    /// at a given indentation.
    pub fn lines(&self) -> Vec<String> {
        if self.args.is_empty() {
            return vec![format!("{}()", self.function)];
        }

        let mut lines = Vec::with_capacity(self.args.len() + 2);
        lines.push(format!("{}(", self.function));
        let last = self.args.len() - 1;
        for (i, (name, value)) in self.args.iter().enumerate() {
            let sep = if i == last { "" } else { "," };
            lines.push(format!(
                "  {}{}",
                Self::format_arg(name.as_deref(), value),
                sep
            ));
        }
        lines.push(")".to_string());
        lines
    }
}

impl From<RCall> for RValue {
    /// A call used as an argument of another call.
    fn from(call: RCall) -> Self {
        RValue::Raw(call.format_inline())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_call() {
        assert_eq!(RCall::new("vizkit::lazy_debug_script").format(), "vizkit::lazy_debug_script()");
        assert_eq!(RCall::new("f").format_inline(), "f()");
    }

    #[test]
    fn test_multiline_format() {
        let call = RCall::new("vizkit::viz_bar")
            .arg("data", RValue::raw("data"))
            .arg("x_var", "degree")
            .arg("horizontal", true);
        assert_eq!(
            call.format(),
            "vizkit::viz_bar(\n  data = data,\n  x_var = 'degree',\n  horizontal = TRUE\n)"
        );
    }

    #[test]
    fn test_inline_with_positional() {
        let call = RCall::new("readRDS").positional("data/survey.rds");
        assert_eq!(call.format_inline(), "readRDS('data/survey.rds')");
    }

    #[test]
    fn test_nested_call_argument() {
        let inner = RCall::new("url").positional("https://x.org/d.rds");
        let outer = RCall::new("gzcon").positional(inner);
        assert_eq!(outer.format_inline(), "gzcon(url('https://x.org/d.rds'))");
    }

    #[test]
    fn test_arg_opt_and_lookup() {
        let call = RCall::new("f")
            .arg_opt("a", Some(1i64))
            .arg_opt("b", None::<i64>);
        assert!(call.has_arg("a"));
        assert!(!call.has_arg("b"));
        assert_eq!(call.format_inline(), "f(a = 1L)");
    }

    #[test]
    fn test_non_syntactic_arg_name() {
        let call = RCall::new("f").arg("my-arg", "v");
        assert_eq!(call.format_inline(), "f(`my-arg` = 'v')");
    }
}
