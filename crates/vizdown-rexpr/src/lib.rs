/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! R literal serialization for generated vizdown code.
//!
//! Everything vizdown emits into an R chunk goes through this crate. It has
//! two parts:
//!
//! - [`RValue`]: a closed, tagged value type (null, booleans, integers,
//!   doubles, strings, vectors, named lists, verbatim code and formulas)
//! - [`serialize`] and [`RCall`]: turn values and calls into R source text
//!
//! Serialization is deterministic. The same value always produces the same
//! text, so generated documents can be diffed and snapshot-tested.
//!
//! # Example
//!
//! ```
//! use vizdown_rexpr::{RCall, RValue, serialize};
//!
//! assert_eq!(serialize(&RValue::from("it's")), r"'it\'s'");
//!
//! let call = RCall::new("vizkit::viz_bar")
//!     .arg("data", RValue::raw("data"))
//!     .arg("x_var", "degree");
//! assert_eq!(
//!     call.format(),
//!     "vizkit::viz_bar(\n  data = data,\n  x_var = 'degree'\n)"
//! );
//! ```

pub mod call;
pub mod serialize;
pub mod value;

pub use call::RCall;
pub use serialize::{format_float, format_name, quote_string, serialize};
pub use value::RValue;
