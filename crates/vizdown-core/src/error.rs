//! Error types for vizdown-core

use thiserror::Error;

/// Compile-time failures.
///
/// Validation errors abort compilation of the current page. Failures that
/// depend on data (missing columns, bad types) are not detected here; the
/// generated code reports those when the document is executed.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("unsupported operator '{operator}' in show_when condition: {expr}")]
    UnsupportedOperator { operator: String, expr: String },

    #[error("invalid show_when condition '{expr}': {message}")]
    ConditionSyntax { expr: String, message: String },

    #[error("layout_row item {index}: {message}")]
    LayoutRow { index: usize, message: String },

    #[error("input '{id}': unknown input type '{input_type}'")]
    UnknownInputType { id: String, input_type: String },

    #[error("{context}: {left} has {left_len} entries but {right} has {right_len}")]
    LengthMismatch {
        context: String,
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },

    #[error("invalid filter_var: {context}")]
    InvalidFilterVar { context: String },

    /// `group` is `sidebar` or `content`; `index` counts within it.
    #[error("page '{page}', {group} item {index}: {source}")]
    ContentItem {
        page: String,
        group: &'static str,
        index: usize,
        #[source]
        source: Box<CompileError>,
    },

    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    #[error("front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
}

impl CompileError {
    /// Create an invalid-spec error from any message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidSpec(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
