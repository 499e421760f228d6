/*
 * page/front_matter.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * YAML front matter.
 */

use serde::Serialize;

use crate::error::Result;
use crate::layout::LayoutMode;
use crate::spec::PageSpec;

#[derive(Serialize)]
struct FrontMatter<'a> {
    title: String,
    format: &'a str,
}

/// Quarto output format for a layout mode.
pub fn format_name(mode: LayoutMode) -> &'static str {
    match mode {
        LayoutMode::Flat => "html",
        LayoutMode::Dashboard => "dashboard",
    }
}

/// The `---` delimited front matter block.
pub fn render_front_matter(page: &PageSpec, mode: LayoutMode) -> Result<Vec<String>> {
    let title = match page.icon.as_deref().map(str::trim) {
        Some(icon) if !icon.is_empty() => {
            format!("{{{{< iconify {} >}}}} {}", icon, page.display_title())
        }
        _ => page.display_title().to_string(),
    };

    let yaml = serde_yaml::to_string(&FrontMatter {
        title,
        format: format_name(mode),
    })?;

    let mut lines = vec!["---".to_string()];
    lines.extend(yaml.lines().map(str::to_string));
    lines.push("---".to_string());
    Ok(lines)
}
