//! c2ffi - Extract FFI declaration metadata from C and Objective-C headers
//!
//! This crate provides the declaration model, a lightweight header scanner
//! that produces it, and the output drivers that render it as JSON or
//! S-expressions.

pub mod core;
pub mod extract;
pub mod ops;
pub mod output;
pub mod util;

/// Test utilities for c2ffi unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording output driver and sample
/// declarations and headers.
#[cfg(test)]
pub mod test_support;

pub use core::{Decl, DeclId, Field, IdAllocator, TranslationUnit, Type};
pub use extract::{HeaderScanner, ScanError};
pub use output::{render, render_to_string, OutputDriver, OutputFormat};
