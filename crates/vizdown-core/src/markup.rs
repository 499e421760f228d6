/*
 * markup.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Small helpers for emitting Quarto markdown.
 */

//! Markdown and HTML text helpers.

use std::sync::LazyLock;

use regex::Regex;

/// Escape text for HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// A double-quoted, escaped attribute value.
pub fn quote_attr(s: &str) -> String {
    format!("\"{}\"", escape_html(s))
}

/// Escape text placed between inline markdown brackets, such as a badge
/// or an image caption.
pub fn escape_markdown(s: &str) -> String {
    escape_html(s)
        .replace('\\', "\\\\")
        .replace('[', "\\[")
        .replace(']', "\\]")
}

/// Percent-encode the characters that would end a markdown link
/// destination or break out of an HTML attribute.
pub fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.trim().chars() {
        match c {
            ' ' => out.push_str("%20"),
            '"' => out.push_str("%22"),
            '\'' => out.push_str("%27"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            c if c.is_whitespace() => {}
            c => out.push(c),
        }
    }
    out
}

/// Markdown heading; the level is clamped to 1..=6.
pub fn heading(level: usize, text: &str) -> String {
    format!("{} {}", "#".repeat(level.clamp(1, 6)), text.trim())
}

/// Runs of anything other than letters and digits.
static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{N}]+").expect("Invalid regex pattern for slug separators")
});

/// Lowercase, alphanumeric runs joined by `-`.
pub fn slugify(s: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(&s.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// A backtick fence longer than any backtick run inside `code`.
pub fn fence_for(code: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in code.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// Split multi-line text into lines.
pub fn text_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Append `block` to `lines`, separated from previous output by one blank
/// line.
pub fn push_block(lines: &mut Vec<String>, block: Vec<String>) {
    if block.is_empty() {
        return;
    }
    if lines.last().is_some_and(|l| !l.is_empty()) {
        lines.push(String::new());
    }
    lines.extend(block);
}

/// Join blocks with blank lines between them.
pub fn join_blocks(blocks: impl IntoIterator<Item = Vec<String>>) -> Vec<String> {
    let mut lines = Vec::new();
    for block in blocks {
        push_block(&mut lines, block);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(
            escape_markdown("a [b] & <c> \\"),
            "a \\[b\\] &amp; &lt;c&gt; \\\\"
        );
    }

    #[test]
    fn test_escape_url() {
        assert_eq!(
            escape_url(" img/my chart (v2).png?a=1&b=\"<x>\" "),
            "img/my%20chart%20%28v2%29.png?a=1&b=%22%3Cx%3E%22"
        );
        assert_eq!(escape_url("https://x.org/a"), "https://x.org/a");
    }

    #[test]
    fn test_heading_clamps() {
        assert_eq!(heading(2, "Sales"), "## Sales");
        assert_eq!(heading(9, "Deep"), "###### Deep");
        assert_eq!(heading(0, "Top"), "# Top");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Survey Overview"), "survey-overview");
        assert_eq!(slugify("  Age (years) / 2024 "), "age-years-2024");
        assert_eq!(slugify("***"), "");
        assert_eq!(slugify("Région_Nord--2"), "région-nord-2");
    }

    #[test]
    fn test_fence_for() {
        assert_eq!(fence_for("print(1)"), "```");
        assert_eq!(fence_for("use ```r inside"), "````");
    }

    #[test]
    fn test_join_blocks_separates_with_single_blank_line() {
        let lines = join_blocks(vec![
            vec!["a".to_string()],
            vec![],
            vec!["b".to_string(), String::new()],
            vec!["c".to_string()],
        ]);
        assert_eq!(lines, vec!["a", "", "b", "", "c"]);
    }
}
