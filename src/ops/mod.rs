//! High-level operations.
//!
//! This module contains the implementation of c2ffi commands.

pub mod extract;

pub use extract::{extract, resolve_headers, ExtractOptions, ExtractResult};
