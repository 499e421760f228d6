/*
 * page/sidebar.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Dashboard sidebar.
 */

use crate::blocks::render_block;
use crate::condition::apply_show_when;
use crate::context::CompileContext;
use crate::error::Result;
use crate::markup::{escape_html, push_block, quote_attr};
use crate::spec::{SidebarSpec, sort_by_insertion};

/// A sidebar column. Its blocks are rendered one after another, without
/// rows or tabs.
pub fn render_sidebar(sidebar: &SidebarSpec, ctx: &mut CompileContext) -> Result<Vec<String>> {
    let mut attrs = ".sidebar".to_string();
    if let Some(width) = sidebar.width.as_deref().filter(|w| !w.trim().is_empty()) {
        attrs.push_str(&format!(" width={}", quote_attr(width)));
    }
    if let Some(open) = sidebar.open {
        attrs.push_str(&format!(" open={}", quote_attr(&open.to_string())));
    }

    let mut lines = vec![format!("## {{{}}}", attrs)];
    if let Some(title) = sidebar.title.as_deref().filter(|t| !t.trim().is_empty()) {
        push_block(
            &mut lines,
            vec![format!("<div class=\"sidebar-title\">{}</div>", escape_html(title))],
        );
    }

    let mut items = sidebar.items.clone();
    sort_by_insertion(&mut items);
    for (i, item) in items.iter().enumerate() {
        let mut block = render_block(item, items.get(i + 1), ctx)?;
        if !item.is_viz() {
            block = apply_show_when(item.show_when.as_deref(), block)?;
        }
        push_block(&mut lines, block);
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMode;
    use crate::options::CompileOptions;
    use crate::spec::{Node, NodeKind, PageSpec};

    #[test]
    fn test_sidebar_markup() {
        let options = CompileOptions::default();
        let page = PageSpec::new("p");
        let mut ctx = CompileContext::new(&options, &page, LayoutMode::Dashboard);
        let sidebar = SidebarSpec {
            title: Some("Filters".to_string()),
            width: Some("280px".to_string()),
            items: vec![
                Node::new(NodeKind::Input)
                    .with("input_id", "degree")
                    .with("filter_var", "degree"),
            ],
            ..SidebarSpec::default()
        };
        let lines = render_sidebar(&sidebar, &mut ctx).unwrap();
        assert_eq!(lines[0], "## {.sidebar width=\"280px\"}");
        assert_eq!(lines[2], "<div class=\"sidebar-title\">Filters</div>");
        assert!(lines.contains(&"vizkit::render_input(".to_string()));
    }
}
