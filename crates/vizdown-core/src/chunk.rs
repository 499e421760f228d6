/*
 * chunk.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Fenced R code chunks.
 */

//! Builder for fenced R code chunks with `#|` cell options.
//!
//! ````text
//! ```{r}
//! #| label: viz-bar-degrees-1
//! #| echo: false
//! result <- ...
//! ```
//! ````
//!
//! Chunks never echo their source; everything vizdown generates is meant
//! to be run, not read.

/// A fenced `{r}` chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeChunk {
    label: Option<String>,
    options: Vec<(String, String)>,
    body: Vec<String>,
}

impl CodeChunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a `#| key: value` option, replacing an earlier one with the same key.
    pub fn option(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.options.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value,
            None => self.options.push((key.to_string(), value)),
        }
        self
    }

    /// Emit output verbatim as markdown.
    pub fn asis(self) -> Self {
        self.option("output", "asis")
    }

    /// Run the chunk but drop its output.
    pub fn hidden(self) -> Self {
        self.option("include", "false")
    }

    pub fn cache(self, enabled: bool) -> Self {
        if enabled {
            self.option("cache", "true")
        } else {
            self
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    pub fn lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.body.push(line.into());
    }

    pub fn is_empty(&self) -> bool {
        self.body.iter().all(|l| l.trim().is_empty())
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    pub fn into_lines(self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.body.len() + self.options.len() + 4);
        out.push("```{r}".to_string());
        if let Some(label) = &self.label {
            out.push(format!("#| label: {}", label));
        }
        out.push("#| echo: false".to_string());
        for (key, value) in &self.options {
            out.push(format!("#| {}: {}", key, value));
        }
        out.extend(self.body);
        out.push("```".to_string());
        out
    }
}
