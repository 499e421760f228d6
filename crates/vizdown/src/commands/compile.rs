/*
 * compile.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compile command implementation
 */

//! Compile command implementation.
//!
//! Reads a spec file (one page, or a site of pages under `pages`), compiles
//! every page and writes `<slug>.qmd` next to the input or into the
//! requested output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use vizdown_core::{CompileOptions, CompiledPage, PageCompiler, PageSpec};

/// Arguments for the compile command
#[derive(Debug)]
pub struct CompileArgs {
    pub input: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub stdout: bool,
}

/// Contents of a spec file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SpecFile {
    Site { pages: Vec<PageSpec> },
    Page(Box<PageSpec>),
}

impl SpecFile {
    fn into_pages(self) -> Vec<PageSpec> {
        match self {
            SpecFile::Site { pages } => pages,
            SpecFile::Page(page) => vec![*page],
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load the pages of a spec file.
pub fn load_pages(path: &Path) -> Result<Vec<PageSpec>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read spec file: {}", path.display()))?;

    let spec: SpecFile = if is_json(path) {
        serde_json::from_str(&source)
            .with_context(|| format!("Invalid JSON spec: {}", path.display()))?
    } else {
        serde_yaml::from_str(&source)
            .with_context(|| format!("Invalid YAML spec: {}", path.display()))?
    };

    let pages = spec.into_pages();
    debug!(pages = pages.len(), path = %path.display(), "loaded spec file");
    Ok(pages)
}

/// Load compile options, falling back to defaults without a config file.
pub fn load_options(path: Option<&Path>) -> Result<CompileOptions> {
    let Some(path) = path else {
        return Ok(CompileOptions::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_yaml::from_str(&source)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

fn output_dir(args: &CompileArgs) -> PathBuf {
    match &args.output_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}

fn write_pages(pages: &[CompiledPage], dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let mut written = Vec::with_capacity(pages.len());
    for page in pages {
        let path = dir.join(format!("{}.qmd", page.slug));
        fs::write(&path, &page.text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "compiled page");
        written.push(path);
    }
    Ok(written)
}

/// Execute the compile command
pub fn execute(args: CompileArgs) -> Result<()> {
    let options = load_options(args.config.as_deref())?;
    let pages = load_pages(&args.input)?;
    if pages.is_empty() {
        anyhow::bail!("No pages found in {}", args.input.display());
    }

    let compiler = PageCompiler::new(options);
    let compiled = compiler
        .compile_site(&pages)
        .with_context(|| format!("Failed to compile {}", args.input.display()))?;

    if args.stdout {
        for page in &compiled {
            print!("{}", page.text);
        }
        return Ok(());
    }

    write_pages(&compiled, &output_dir(&args))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SITE: &str = r#"
pages:
  - name: Overview
    content_blocks:
      - type: text
        content: Hello
  - name: Results
    visualizations:
      - type: viz
        viz_type: bar
        x_var: degree
"#;

    #[test]
    fn test_load_single_page_and_site() {
        let temp = TempDir::new().unwrap();

        let single = temp.path().join("page.yml");
        fs::write(&single, "name: Solo\ntitle: Just one\n").unwrap();
        let pages = load_pages(&single).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].display_title(), "Just one");

        let site = temp.path().join("site.yaml");
        fs::write(&site, SITE).unwrap();
        let pages = load_pages(&site).unwrap();
        let names: Vec<_> = pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Overview", "Results"]);
    }

    #[test]
    fn test_load_json_page() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("page.json");
        fs::write(
            &path,
            r#"{"name": "Json", "content_blocks": [{"type": "text", "content": "x"}]}"#,
        )
        .unwrap();
        let pages = load_pages(&path).unwrap();
        assert_eq!(pages[0].content_blocks.len(), 1);
    }

    #[test]
    fn test_missing_input_mentions_path() {
        let err = load_pages(Path::new("/nonexistent/spec.yml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/spec.yml"));
    }

    #[test]
    fn test_config_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vizdown.yml");
        fs::write(&path, "runtime-package: mykit\n").unwrap();
        let options = load_options(Some(&path)).unwrap();
        assert_eq!(options.runtime_package, "mykit");
        assert_eq!(options.default_dataset, "data");
        assert_eq!(load_options(None).unwrap(), CompileOptions::default());
    }

    #[test]
    fn test_execute_writes_one_file_per_page() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("site.yml");
        fs::write(&input, SITE).unwrap();
        let out = temp.path().join("out");

        execute(CompileArgs {
            input,
            output_dir: Some(out.clone()),
            config: None,
            stdout: false,
        })
        .unwrap();

        let overview = fs::read_to_string(out.join("overview.qmd")).unwrap();
        assert!(overview.contains("\nHello\n"));
        let results = fs::read_to_string(out.join("results.qmd")).unwrap();
        assert!(results.contains("vizkit::viz_bar("));
    }

    #[test]
    fn test_execute_reports_compile_errors() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("bad.yml");
        fs::write(
            &input,
            "name: bad\ncontent_blocks:\n  - type: text\n    content: x\n    show_when: 'a %% 2'\n",
        )
        .unwrap();
        let err = execute(CompileArgs {
            input,
            output_dir: Some(temp.path().to_path_buf()),
            config: None,
            stdout: false,
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("Failed to compile"));
        assert!(!temp.path().join("bad.qmd").exists());
    }
}
