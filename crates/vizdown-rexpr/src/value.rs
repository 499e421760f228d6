/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The value type carried by spec parameters and generated call arguments.
//!
//! Values deserialize from any self-describing serde format (JSON, YAML).
//! Two single-key maps are recognized as code rather than data:
//!
//! - `{"$expr": "..."}` becomes [`RValue::Raw`]
//! - `{"$formula": "..."}` becomes [`RValue::Formula`]

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Map key that marks a verbatim R expression.
pub const EXPR_KEY: &str = "$expr";

/// Map key that marks an R formula.
pub const FORMULA_KEY: &str = "$formula";

/// A value that can be written as an R literal.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RValue {
    /// `NULL`
    #[default]
    Null,

    /// `TRUE` / `FALSE`
    Bool(bool),

    /// An integer, written with the `L` suffix.
    Int(i64),

    /// A double.
    Float(f64),

    /// A character string.
    Str(String),

    /// An unnamed collection: `c(...)` for scalars, `list(...)` otherwise.
    List(Vec<RValue>),

    /// A named list.
    Map(IndexMap<String, RValue>),

    /// Verbatim R code, emitted without quoting.
    Raw(String),

    /// A one-sided formula such as `~ x > 5`.
    Formula(String),
}

impl RValue {
    /// Verbatim R code (a variable name, a call, ...).
    pub fn raw(code: impl Into<String>) -> Self {
        RValue::Raw(code.into())
    }

    /// A one-sided formula. A leading `~` is accepted and not doubled.
    pub fn formula(expr: impl Into<String>) -> Self {
        RValue::Formula(expr.into())
    }

    /// A character vector.
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RValue::List(items.into_iter().map(|s| RValue::Str(s.into())).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RValue::Null)
    }

    /// True for values that can live inside an atomic `c(...)` vector.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            RValue::Bool(_) | RValue::Int(_) | RValue::Float(_) | RValue::Str(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RValue::Int(i) => Some(*i),
            // The upper bound is exclusive: `i64::MAX as f64` rounds up to 2^63.
            RValue::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RValue::Int(i) => Some(*i as f64),
            RValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RValue]> {
        match self {
            RValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, RValue>> {
        match self {
            RValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The source text of anything that reads as code or text: strings,
    /// raw expressions and formulas.
    pub fn as_code(&self) -> Option<&str> {
        match self {
            RValue::Str(s) | RValue::Raw(s) | RValue::Formula(s) => Some(s),
            _ => None,
        }
    }

    /// A string or a list made only of strings, as a vector of `&str`.
    ///
    /// Returns `None` for anything else, including lists with non-string
    /// elements.
    pub fn as_str_list(&self) -> Option<Vec<&str>> {
        match self {
            RValue::Str(s) => Some(vec![s.as_str()]),
            RValue::List(items) => items.iter().map(RValue::as_str).collect(),
            _ => None,
        }
    }

    /// Number of elements when this is a collection; scalars count as one
    /// and `NULL` as zero, following R's `length()`.
    pub fn len(&self) -> usize {
        match self {
            RValue::Null => 0,
            RValue::List(items) => items.len(),
            RValue::Map(map) => map.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A human-readable rendering for markup (not R syntax).
    pub fn display_text(&self) -> String {
        match self {
            RValue::Null => String::new(),
            RValue::Bool(b) => b.to_string(),
            RValue::Int(i) => i.to_string(),
            RValue::Float(f) => f.to_string(),
            RValue::Str(s) | RValue::Raw(s) | RValue::Formula(s) => s.clone(),
            RValue::List(items) => items
                .iter()
                .map(RValue::display_text)
                .collect::<Vec<_>>()
                .join(", "),
            RValue::Map(_) => crate::serialize(self),
        }
    }
}

impl From<&str> for RValue {
    fn from(s: &str) -> Self {
        RValue::Str(s.to_string())
    }
}

impl From<String> for RValue {
    fn from(s: String) -> Self {
        RValue::Str(s)
    }
}

impl From<&String> for RValue {
    fn from(s: &String) -> Self {
        RValue::Str(s.clone())
    }
}

impl From<bool> for RValue {
    fn from(b: bool) -> Self {
        RValue::Bool(b)
    }
}

impl From<i64> for RValue {
    fn from(i: i64) -> Self {
        RValue::Int(i)
    }
}

impl From<i32> for RValue {
    fn from(i: i32) -> Self {
        RValue::Int(i64::from(i))
    }
}

impl From<u64> for RValue {
    fn from(i: u64) -> Self {
        match i64::try_from(i) {
            Ok(i) => RValue::Int(i),
            Err(_) => RValue::Float(i as f64),
        }
    }
}

impl From<usize> for RValue {
    fn from(i: usize) -> Self {
        RValue::from(i as u64)
    }
}

impl From<f64> for RValue {
    fn from(f: f64) -> Self {
        RValue::Float(f)
    }
}

impl From<Vec<RValue>> for RValue {
    fn from(items: Vec<RValue>) -> Self {
        RValue::List(items)
    }
}

impl From<IndexMap<String, RValue>> for RValue {
    fn from(map: IndexMap<String, RValue>) -> Self {
        RValue::Map(map)
    }
}

impl<T: Into<RValue>> From<Option<T>> for RValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(RValue::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// serde
// ---------------------------------------------------------------------------

struct RValueVisitor;

impl<'de> Visitor<'de> for RValueVisitor {
    type Value = RValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar, sequence or map")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<RValue, E> {
        Ok(RValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RValue, E> {
        Ok(RValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RValue, E> {
        Ok(RValue::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RValue, E> {
        Ok(RValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RValue, E> {
        Ok(RValue::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RValue, E> {
        Ok(RValue::Str(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<RValue, E> {
        Ok(RValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<RValue, E> {
        Ok(RValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RValue, D::Error> {
        RValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(RValue::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RValue, A::Error> {
        let mut map = IndexMap::new();
        while let Some((key, value)) = access.next_entry::<String, RValue>()? {
            map.insert(key, value);
        }

        if map.len() == 1 {
            if let Some(RValue::Str(code)) = map.get(EXPR_KEY) {
                return Ok(RValue::Raw(code.clone()));
            }
            if let Some(RValue::Str(code)) = map.get(FORMULA_KEY) {
                return Ok(RValue::Formula(code.clone()));
            }
        }

        Ok(RValue::Map(map))
    }
}

impl<'de> Deserialize<'de> for RValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RValueVisitor)
    }
}

impl Serialize for RValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RValue::Null => serializer.serialize_unit(),
            RValue::Bool(b) => serializer.serialize_bool(*b),
            RValue::Int(i) => serializer.serialize_i64(*i),
            RValue::Float(f) => serializer.serialize_f64(*f),
            RValue::Str(s) => serializer.serialize_str(s),
            RValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            RValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            RValue::Raw(code) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(EXPR_KEY, code)?;
                map.end()
            }
            RValue::Formula(code) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(FORMULA_KEY, code)?;
                map.end()
            }
        }
    }
}
