//! Test utilities for c2ffi unit tests.
//!
//! Provides a driver that records which entry point each declaration reached,
//! plus fixtures in [`fixtures`].
//!
//! # Example
//!
//! ```rust,ignore
//! use c2ffi::test_support::{sample_unit, RecordingDriver};
//!
//! let mut driver = RecordingDriver::default();
//! c2ffi::output::render(&sample_unit(), &mut driver);
//! assert_eq!(driver.calls[0].0, "unhandled");
//! ```

pub mod fixtures;

pub use fixtures::*;

use crate::core::{
    EnumDecl, FunctionDecl, ObjCCategoryDecl, ObjCInterfaceDecl, ObjCProtocolDecl, RecordDecl,
    TypeDecl, TypedefDecl, UnhandledDecl, VarDecl,
};
use crate::output::OutputDriver;

/// Records every entry point it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    /// (entry point, declaration name)
    pub calls: Vec<(&'static str, String)>,
    /// Records seen by `write_record`, cloned.
    pub records: Vec<RecordDecl>,
    pub header: bool,
    pub footer: bool,
    pub betweens: usize,
}

impl RecordingDriver {
    fn record(&mut self, entry: &'static str, name: &str) {
        self.calls.push((entry, name.to_string()));
    }
}

impl OutputDriver for RecordingDriver {
    fn write_header(&mut self) {
        self.header = true;
    }

    fn write_between(&mut self) {
        self.betweens += 1;
    }

    fn write_footer(&mut self) {
        self.footer = true;
    }

    fn write_comment(&mut self, _text: &str) {}

    fn write_unhandled(&mut self, d: &UnhandledDecl) {
        self.record("unhandled", d.name());
    }

    fn write_type_decl(&mut self, d: &TypeDecl) {
        self.record("type", d.name());
    }

    fn write_var(&mut self, d: &VarDecl) {
        self.record("var", d.name());
    }

    fn write_function(&mut self, d: &FunctionDecl) {
        self.record("function", d.name());
    }

    fn write_typedef(&mut self, d: &TypedefDecl) {
        self.record("typedef", d.name());
    }

    fn write_record(&mut self, d: &RecordDecl) {
        self.record("record", d.name());
        self.records.push(d.clone());
    }

    fn write_enum(&mut self, d: &EnumDecl) {
        self.record("enum", d.name());
    }

    fn write_objc_interface(&mut self, d: &ObjCInterfaceDecl) {
        self.record("objc-interface", d.name());
    }

    fn write_objc_category(&mut self, d: &ObjCCategoryDecl) {
        self.record("objc-category", d.name());
    }

    fn write_objc_protocol(&mut self, d: &ObjCProtocolDecl) {
        self.record("objc-protocol", d.name());
    }

    fn finish(&mut self) -> String {
        self.calls
            .iter()
            .map(|(entry, name)| format!("{entry} {name}\n"))
            .collect()
    }
}
