/*
 * serialize.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Convert [`RValue`]s into R source text.
//!
//! The output, when evaluated by R, reconstructs the value:
//!
//! | value | R text |
//! |---|---|
//! | `Null` | `NULL` |
//! | `Bool(true)` | `TRUE` |
//! | `Int(3)` | `3L` |
//! | `Int(3_000_000_000)` | `3000000000.0` |
//! | `Float(2.0)` | `2.0` |
//! | `Str("it's")` | `'it\'s'` |
//! | `List([a, b])` | `c('a', 'b')` |
//! | `Map({k: 1})` | `list(k = 1L)` |
//! | `Raw("x")` | `x` |
//! | `Formula("x > 5")` | `~x > 5` |

use std::borrow::Cow;

use crate::value::RValue;

/// R reserved words; these can never be used as bare argument names.
const RESERVED_WORDS: &[&str] = &[
    "if",
    "else",
    "repeat",
    "while",
    "function",
    "for",
    "next",
    "break",
    "TRUE",
    "FALSE",
    "NULL",
    "Inf",
    "NaN",
    "NA",
    "NA_integer_",
    "NA_real_",
    "NA_character_",
    "NA_complex_",
    "in",
];

/// Values R can hold as integers. `i32::MIN` is reserved for `NA_integer_`.
const R_INTEGER_RANGE: std::ops::RangeInclusive<i64> = -(i32::MAX as i64)..=i32::MAX as i64;

/// Serialize a value to an R literal expression.
pub fn serialize(value: &RValue) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &RValue, out: &mut String) {
    match value {
        RValue::Null => out.push_str("NULL"),
        RValue::Bool(true) => out.push_str("TRUE"),
        RValue::Bool(false) => out.push_str("FALSE"),
        RValue::Int(i) if R_INTEGER_RANGE.contains(i) => {
            out.push_str(&i.to_string());
            out.push('L');
        }
        // Outside R's integer range; R would read `L` literals as doubles
        // with a warning.
        RValue::Int(i) => out.push_str(&format_float(*i as f64)),
        RValue::Float(f) => out.push_str(&format_float(*f)),
        RValue::Str(s) => out.push_str(&quote_string(s)),
        RValue::Raw(code) => out.push_str(code),
        RValue::Formula(expr) => {
            let expr = expr.trim();
            if !expr.starts_with('~') {
                out.push('~');
            }
            out.push_str(expr);
        }
        RValue::List(items) => {
            let atomic = items.iter().all(RValue::is_scalar);
            out.push_str(if atomic { "c(" } else { "list(" });
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(item, out);
            }
            out.push(')');
        }
        RValue::Map(entries) => {
            out.push_str("list(");
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&format_name(key));
                out.push_str(" = ");
                write_value(item, out);
            }
            out.push(')');
        }
    }
}

/// Quote a string as a single-quoted R character literal.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Format a double so R reads it back as a double.
///
/// Integral values keep a trailing `.0` so they stay visually distinct
/// from integer literals.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Inf" } else { "-Inf" }.to_string()
    } else {
        // Debug formatting gives the shortest round-trip representation and
        // always includes a decimal point or exponent.
        format!("{:?}", f)
    }
}

/// Format an argument or list name, backquoting it when it is not a
/// syntactic R name.
pub fn format_name(name: &str) -> Cow<'_, str> {
    if is_syntactic_name(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`")))
    }
}

/// Check whether `name` can be written unquoted in R.
pub fn is_syntactic_name(name: &str) -> bool {
    if name.is_empty() || RESERVED_WORDS.contains(&name) {
        return false;
    }

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if first == '.' {
        // ".2x" parses as a number; "." alone and ".x" are names.
        if name.chars().nth(1).is_some_and(|c| c.is_ascii_digit()) {
            return false;
        }
    } else if !first.is_alphabetic() {
        return false;
    }

    chars.all(|c| c.is_alphanumeric() || c == '.' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalars() {
        assert_eq!(serialize(&RValue::Null), "NULL");
        assert_eq!(serialize(&RValue::Bool(true)), "TRUE");
        assert_eq!(serialize(&RValue::Bool(false)), "FALSE");
        assert_eq!(serialize(&RValue::Int(42)), "42L");
        assert_eq!(serialize(&RValue::Int(-3)), "-3L");
        assert_eq!(serialize(&RValue::Float(0.5)), "0.5");
        assert_eq!(serialize(&RValue::Float(2.0)), "2.0");
    }

    #[test]
    fn test_integers_outside_r_range_become_doubles() {
        assert_eq!(serialize(&RValue::Int(2_147_483_647)), "2147483647L");
        assert_eq!(serialize(&RValue::Int(-2_147_483_647)), "-2147483647L");
        assert_eq!(serialize(&RValue::Int(2_147_483_648)), "2147483648.0");
        assert_eq!(serialize(&RValue::Int(-2_147_483_648)), "-2147483648.0");
        assert_eq!(serialize(&RValue::Int(3_000_000_000)), "3000000000.0");
        assert_eq!(
            serialize(&RValue::List(vec![RValue::Int(1), RValue::Int(5_000_000_000)])),
            "c(1L, 5000000000.0)"
        );
    }

    #[test]
    fn test_special_floats() {
        assert_eq!(serialize(&RValue::Float(f64::NAN)), "NaN");
        assert_eq!(serialize(&RValue::Float(f64::INFINITY)), "Inf");
        assert_eq!(serialize(&RValue::Float(f64::NEG_INFINITY)), "-Inf");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(serialize(&RValue::from("it's")), r"'it\'s'");
        assert_eq!(serialize(&RValue::from(r"C:\data")), r"'C:\\data'");
        assert_eq!(serialize(&RValue::from("a\nb\tc")), r"'a\nb\tc'");
        assert_eq!(serialize(&RValue::from("say \"hi\"")), r#"'say "hi"'"#);
    }

    #[test]
    fn test_vectors() {
        assert_eq!(serialize(&RValue::strings(["a", "b"])), "c('a', 'b')");
        assert_eq!(
            serialize(&RValue::List(vec![RValue::Int(1), RValue::Float(2.5)])),
            "c(1L, 2.5)"
        );
        assert_eq!(serialize(&RValue::List(vec![])), "c()");
    }

    #[test]
    fn test_non_atomic_list() {
        let mut inner = IndexMap::new();
        inner.insert("y".to_string(), RValue::Int(50));
        let v = RValue::List(vec![RValue::Map(inner), RValue::Null]);
        assert_eq!(serialize(&v), "list(list(y = 50L), NULL)");
    }

    #[test]
    fn test_named_list() {
        let mut map = IndexMap::new();
        map.insert("label".to_string(), RValue::from("Target"));
        map.insert("my value".to_string(), RValue::Int(1));
        map.insert("if".to_string(), RValue::Bool(true));
        assert_eq!(
            serialize(&RValue::Map(map)),
            "list(label = 'Target', `my value` = 1L, `if` = TRUE)"
        );
    }

    #[test]
    fn test_raw_and_formula() {
        assert_eq!(serialize(&RValue::raw("data_filtered_ab12")), "data_filtered_ab12");
        assert_eq!(serialize(&RValue::formula("x > 5")), "~x > 5");
        assert_eq!(serialize(&RValue::formula("~ x > 5")), "~ x > 5");
    }

    #[test]
    fn test_syntactic_names() {
        assert!(is_syntactic_name("x_var"));
        assert!(is_syntactic_name(".hidden"));
        assert!(is_syntactic_name("."));
        assert!(!is_syntactic_name("2x"));
        assert!(!is_syntactic_name(".2x"));
        assert!(!is_syntactic_name("_x"));
        assert!(!is_syntactic_name("a-b"));
        assert!(!is_syntactic_name("function"));
        assert_eq!(format_name("a`b"), "`a\\`b`");
    }

    #[test]
    fn test_deterministic() {
        let mut map = IndexMap::new();
        map.insert("b".to_string(), RValue::Int(2));
        map.insert("a".to_string(), RValue::Int(1));
        let v = RValue::Map(map);
        assert_eq!(serialize(&v), serialize(&v.clone()));
        assert_eq!(serialize(&v), "list(b = 2L, a = 1L)");
    }
}
