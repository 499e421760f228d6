/*
 * page/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Page compiler.
 */

//! Page compiler.
//!
//! [`PageCompiler::compile`] turns one [`PageSpec`] into the text of a
//! `.qmd` document. Output is assembled in fixed stages:
//!
//! 1. front matter
//! 2. client feature configuration
//! 3. the page's verbatim text
//! 4. the setup chunk
//! 5. full-data embedding
//! 6. loading overlay and lazy-load scripts
//! 7. the lazy-load debug hook
//! 8. a left sidebar, followed by a `## Column` marker
//! 9. the content stream
//! 10. a right sidebar
//! 11. a fallback sentence when the page produced no content
//!
//! A page with a sidebar anywhere is compiled in dashboard mode.

pub mod crosstab;
pub mod features;
pub mod front_matter;
pub mod prepare;
pub mod scripts;
pub mod setup;
pub mod sidebar;

use std::collections::HashMap;

use crate::context::CompileContext;
use crate::error::Result;
use crate::layout::{self, LayoutMode};
use crate::markup::{push_block, text_lines};
use crate::options::CompileOptions;
use crate::spec::{PageSpec, SidebarPosition};

pub use prepare::PreparedPage;

/// One compiled page of a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPage {
    /// Unique within the site; used as the file stem.
    pub slug: String,
    pub text: String,
}

/// Compiles pages with a fixed set of options.
///
/// The compiler holds no per-page state, so one instance can compile any
/// number of pages, including from several threads.
#[derive(Debug, Clone, Default)]
pub struct PageCompiler {
    options: CompileOptions,
}

impl PageCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile one page to document text.
    pub fn compile(&self, page: &PageSpec) -> Result<String> {
        let prepared = prepare::prepare(page)?;
        let mode = if prepared.sidebar.is_some() {
            LayoutMode::Dashboard
        } else {
            LayoutMode::Flat
        };
        tracing::debug!(page = %page.name, ?mode, items = prepared.content.len(), "compiling page");

        let mut ctx = CompileContext::new(&self.options, page, mode);

        // Filtered datasets are derived in the setup chunk, which precedes
        // the charts that use them.
        for node in prepared.all_nodes() {
            if node.is_viz() {
                crate::viz::register_filter(node, &mut ctx);
            }
        }

        let text = page.text.as_deref().filter(|t| !t.trim().is_empty());
        let empty = prepared.content.is_empty() && prepared.sidebar.is_none() && text.is_none();

        tracing::debug!(stage = "front-matter", "emitting stage");
        let mut lines = front_matter::render_front_matter(page, mode)?;

        if !empty {
            tracing::debug!(stage = "features", "emitting stage");
            push_block(&mut lines, features::render_features(&prepared, &ctx));
        }

        if let Some(text) = text {
            push_block(&mut lines, text_lines(text));
        }

        tracing::debug!(stage = "setup", filters = ctx.filters.len(), "emitting stage");
        push_block(&mut lines, setup::render_setup(&prepared, &ctx));

        tracing::debug!(stage = "scripts", "emitting stage");
        push_block(&mut lines, scripts::render_embed_data(&ctx));
        push_block(&mut lines, scripts::render_loading_scripts(&ctx));
        push_block(&mut lines, scripts::render_debug_script(&ctx));

        let mut body = Vec::new();

        let sidebar_spec = prepared.sidebar.as_ref();
        if let Some(spec) = sidebar_spec
            && spec.position == SidebarPosition::Left
        {
            tracing::debug!(stage = "sidebar", position = "left", "emitting stage");
            push_block(&mut body, sidebar::render_sidebar(spec, &mut ctx)?);
        }
        if sidebar_spec.is_some() && !prepared.has_manual_column() {
            push_block(&mut body, vec!["## Column".to_string()]);
        }

        tracing::debug!(stage = "content", "emitting stage");
        push_block(&mut body, layout::render_stream(&prepared.content, &mut ctx)?);

        if let Some(spec) = sidebar_spec
            && spec.position == SidebarPosition::Right
        {
            tracing::debug!(stage = "sidebar", position = "right", "emitting stage");
            push_block(&mut body, sidebar::render_sidebar(spec, &mut ctx)?);
        }

        if body.is_empty() && text.is_none() {
            body.push(self.options.empty_page_text.clone());
        }
        push_block(&mut lines, body);

        tracing::debug!(page = %page.name, chunks = ctx.label_count(), "page compiled");

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }

    /// Compile several pages. Slugs are made unique by suffixing `-2`,
    /// `-3`, ... in page order.
    pub fn compile_site(&self, pages: &[PageSpec]) -> Result<Vec<CompiledPage>> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut out = Vec::with_capacity(pages.len());

        for page in pages {
            let base = page.slug();
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let slug = if *count == 1 {
                base
            } else {
                format!("{}-{}", base, count)
            };

            let text = self.compile(page)?;
            out.push(CompiledPage { slug, text });
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Node, NodeKind, SidebarSpec};

    #[test]
    fn test_empty_page() {
        let compiler = PageCompiler::default();
        let text = compiler.compile(&PageSpec::new("Empty")).unwrap();
        assert_eq!(
            text,
            "---\ntitle: Empty\nformat: html\n---\n\nThis page has no content yet.\n"
        );
    }

    #[test]
    fn test_text_only_page_has_no_fallback() {
        let mut page = PageSpec::new("Notes");
        page.text = Some("Read me.".to_string());
        let text = PageCompiler::default().compile(&page).unwrap();
        assert!(text.contains("\nRead me.\n"));
        assert!(!text.contains("no content yet"));
    }

    #[test]
    fn test_right_sidebar_follows_content() {
        let mut page = PageSpec::new("p");
        page.sidebar = Some(SidebarSpec {
            position: SidebarPosition::Right,
            items: vec![Node::text("side")],
            ..SidebarSpec::default()
        });
        page.content_blocks = vec![Node::text("main")];
        let text = PageCompiler::default().compile(&page).unwrap();
        let column = text.find("## Column").unwrap();
        let main = text.find("main").unwrap();
        let side = text.find("## {.sidebar}").unwrap();
        assert!(column < main && main < side);
    }

    #[test]
    fn test_manual_column_suppresses_marker() {
        let mut page = PageSpec::new("p");
        page.sidebar = Some(SidebarSpec::default());
        page.content_blocks = vec![
            Node::new(NodeKind::LayoutColumn).with_items(vec![Node::text("a")]),
        ];
        let text = PageCompiler::default().compile(&page).unwrap();
        assert_eq!(text.matches("## Column").count(), 1);
    }

    #[test]
    fn test_site_slugs_are_unique() {
        let pages = vec![
            PageSpec::new("Results"),
            PageSpec::new("results"),
            PageSpec::new("Other"),
        ];
        let site = PageCompiler::default().compile_site(&pages).unwrap();
        let slugs: Vec<_> = site.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["results", "results-2", "other"]);
    }
}
