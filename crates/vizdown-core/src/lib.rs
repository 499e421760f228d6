/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compiles declarative dashboard specs into Quarto documents.
//!
//! A page is described by a [`PageSpec`]: content blocks, charts, inputs,
//! layout containers and tab groups, each a [`Node`]. [`PageCompiler`]
//! turns it into `.qmd` text in which charts and tables are fenced R chunks
//! calling a runtime package (`vizkit` by default).
//!
//! # Architecture
//!
//! - [`spec`] - the page and node data model, loaded with serde
//! - [`blocks`] - one renderer per content block kind
//! - [`hierarchy`] - groups items by slash-delimited tabgroup paths
//! - [`viz`] - generates the R chunk for one chart
//! - [`layout`] - builds a layout tree (tabs, rows, sections) and renders it
//! - [`page`] - the staged page compiler
//!
//! Compilation is pure: no file or network I/O happens in this crate, and
//! all mutable state of a run lives in a [`CompileContext`] created for
//! that run.
//!
//! # Example
//!
//! ```
//! use vizdown_core::{Node, PageCompiler, PageSpec};
//!
//! let mut page = PageSpec::new("Overview");
//! page.content_blocks = vec![
//!     Node::text("Results of the 2024 survey."),
//!     Node::viz("bar").with("title", "Degrees").with("x_var", "degree"),
//! ];
//!
//! let qmd = PageCompiler::default().compile(&page)?;
//! assert!(qmd.contains("## Degrees"));
//! assert!(qmd.contains("x_var = 'degree'"));
//! # Ok::<(), vizdown_core::CompileError>(())
//! ```

pub mod blocks;
pub mod chunk;
pub mod condition;
pub mod context;
pub mod error;
pub mod hierarchy;
pub mod layout;
pub mod markup;
pub mod options;
pub mod page;
pub mod spec;
pub mod viz;

pub use vizdown_rexpr;

pub use chunk::CodeChunk;
pub use condition::Condition;
pub use context::CompileContext;
pub use error::{CompileError, Result};
pub use layout::LayoutMode;
pub use options::CompileOptions;
pub use page::{CompiledPage, PageCompiler};
pub use spec::{DataSource, Node, NodeKind, PageSpec, SidebarPosition, SidebarSpec};
