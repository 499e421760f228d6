/*
 * viz/filter.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Deduplicated filtered datasets.
 */

//! Filtered datasets.
//!
//! A chart's `filter` (for example `~ wave == 2`) is not applied inline.
//! The setup chunk derives one filtered dataset per distinct predicate and
//! source, and every chart using that predicate references the same
//! variable. Predicates are compared after removing whitespace outside
//! string literals, so `~x>5` and `~ x > 5` share a dataset.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use vizdown_rexpr::serialize::is_syntactic_name;

use crate::markup::slugify;

/// One derived dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    /// Variable name of the filtered dataset.
    pub name: String,
    /// Predicate as first written, without the leading `~`.
    pub expr: String,
    /// Dataset being filtered.
    pub source: String,
}

/// Filter entries of one page, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct FilterMap {
    entries: IndexMap<(String, String), FilterEntry>,
}

impl FilterMap {
    /// Register a predicate on `source` and return the variable name to
    /// reference. Registering the same predicate twice returns the same name.
    pub fn register(&mut self, source: &str, expr: &str) -> String {
        let canonical = canonical_filter(expr);
        let key = (canonical, source.to_string());
        if let Some(existing) = self.entries.get(&key) {
            tracing::trace!(name = %existing.name, "filter already registered");
            return existing.name.clone();
        }
        let name = filtered_name(source, &key.0);
        self.entries.insert(
            key,
            FilterEntry {
                name: name.clone(),
                expr: strip_tilde(expr).to_string(),
                source: source.to_string(),
            },
        );
        name
    }

    pub fn entries(&self) -> impl Iterator<Item = &FilterEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn strip_tilde(expr: &str) -> &str {
    let expr = expr.trim();
    expr.strip_prefix('~').map_or(expr, str::trim)
}

/// Canonical form of a predicate: no leading `~`, no whitespace outside
/// quoted strings.
pub fn canonical_filter(expr: &str) -> String {
    let mut out = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in strip_tilde(expr).chars() {
        match quote {
            Some(q) => {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '\'' || c == '"' || c == '`' {
                    quote = Some(c);
                    out.push(c);
                } else if !c.is_whitespace() {
                    out.push(c);
                }
            }
        }
    }
    out
}

/// `<stem>_filtered_<first 8 hex digits of sha256(canonical)>`, where the
/// stem is the source itself when it is a plain R name.
pub fn filtered_name(source: &str, canonical: &str) -> String {
    let digest = Sha256::digest(canonical.as_bytes());
    let hash = hex::encode(digest);
    format!("{}_filtered_{}", name_stem(source), &hash[..8])
}

/// A syntactic R name standing for `source`, which may be an arbitrary
/// expression such as `head(data, 10)` or a backquoted name.
fn name_stem(source: &str) -> String {
    if is_syntactic_name(source) {
        return source.to_string();
    }
    let stem = slugify(source).replace('-', "_");
    match stem.chars().next() {
        None => "data".to_string(),
        Some(c) if !c.is_alphabetic() => format!("data_{}", stem),
        Some(_) => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_filter() {
        assert_eq!(canonical_filter("~ x > 5"), "x>5");
        assert_eq!(canonical_filter("x>5"), "x>5");
        assert_eq!(
            canonical_filter("~ region == 'North East' & wave %in% c(1, 2)"),
            "region=='North East'&wave%in%c(1,2)"
        );
    }

    #[test]
    fn test_same_predicate_same_name() {
        let mut map = FilterMap::default();
        let a = map.register("data", "~x>5");
        let b = map.register("data", "~ x > 5");
        assert_eq!(a, b);
        assert_eq!(map.len(), 1);
        assert!(a.starts_with("data_filtered_"));
        assert_eq!(a.len(), "data_filtered_".len() + 8);

        let entry = map.entries().next().unwrap();
        assert_eq!(entry.expr, "x>5");
        assert_eq!(entry.source, "data");
    }

    #[test]
    fn test_different_sources_are_separate() {
        let mut map = FilterMap::default();
        let a = map.register("data", "x > 5");
        let b = map.register("waves", "x > 5");
        assert_ne!(a, b);
        assert!(b.starts_with("waves_filtered_"));
        assert_eq!(a["data_".len()..], b["waves_".len()..]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_expression_sources_get_valid_names() {
        let mut map = FilterMap::default();
        let name = map.register("head(data, 10)", "~ x > 5");
        assert!(name.starts_with("head_data_10_filtered_"));
        assert!(is_syntactic_name(&name));
        assert_eq!(map.entries().next().unwrap().source, "head(data, 10)");

        assert!(filtered_name("`2024 wave`", "x>5").starts_with("data_2024_wave_filtered_"));
        assert!(filtered_name("`*`", "x>5").starts_with("data_filtered_"));
        assert!(filtered_name("survey.v2", "x>5").starts_with("survey.v2_filtered_"));
    }

    #[test]
    fn test_hash_is_sha256_prefix() {
        let name = filtered_name("data", "x>5");
        let expected = &hex::encode(Sha256::digest(b"x>5"))[..8];
        assert_eq!(name, format!("data_filtered_{}", expected));
    }
}
