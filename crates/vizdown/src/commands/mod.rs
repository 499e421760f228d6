//! Command implementations for the vizdown CLI
//!
//! Each command module handles file I/O and delegates to vizdown-core for
//! compilation.

pub mod compile;
