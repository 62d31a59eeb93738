//! Rendering declarations.
//!
//! [`OutputDriver`] has one entry point per declaration kind and no defaults
//! for them, so a renderer that misses a kind does not compile. Each
//! [`Decl`](crate::core::Decl) routes itself to the matching entry point via
//! [`Decl::write`](crate::core::Decl::write).
//!
//! Drivers accumulate their output internally; [`render`] never fails and
//! I/O happens once the document is finished.

pub mod json;
pub mod sexp;

use serde::{Deserialize, Serialize};

use crate::core::{
    EnumDecl, FunctionDecl, ObjCCategoryDecl, ObjCInterfaceDecl, ObjCProtocolDecl, RecordDecl,
    TranslationUnit, TypeDecl, TypedefDecl, UnhandledDecl, VarDecl,
};

pub use json::JsonDriver;
pub use sexp::SexpDriver;

/// A serialization format for declarations.
pub trait OutputDriver {
    /// Called once before the first declaration.
    fn write_header(&mut self) {}

    /// Called between two consecutive declarations.
    fn write_between(&mut self) {}

    /// Called once after the last declaration.
    fn write_footer(&mut self) {}

    /// Free-form comment, where the format has them.
    fn write_comment(&mut self, text: &str);

    fn write_unhandled(&mut self, d: &UnhandledDecl);
    fn write_type_decl(&mut self, d: &TypeDecl);
    fn write_var(&mut self, d: &VarDecl);
    fn write_function(&mut self, d: &FunctionDecl);
    fn write_typedef(&mut self, d: &TypedefDecl);
    fn write_record(&mut self, d: &RecordDecl);
    fn write_enum(&mut self, d: &EnumDecl);
    fn write_objc_interface(&mut self, d: &ObjCInterfaceDecl);
    fn write_objc_category(&mut self, d: &ObjCCategoryDecl);
    fn write_objc_protocol(&mut self, d: &ObjCProtocolDecl);

    /// Take the rendered document, leaving the driver empty.
    fn finish(&mut self) -> String;
}

/// Walk `unit` in order, handing each declaration to `driver`.
pub fn render(unit: &TranslationUnit, driver: &mut dyn OutputDriver) {
    driver.write_header();
    for (i, decl) in unit.iter().enumerate() {
        if i > 0 {
            driver.write_between();
        }
        decl.write(driver);
    }
    driver.write_footer();
}

/// Render `unit` and return the finished document.
pub fn render_to_string(unit: &TranslationUnit, driver: &mut dyn OutputDriver) -> String {
    render(unit, driver);
    driver.finish()
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON array of declaration objects
    #[default]
    Json,

    /// One S-expression per declaration
    #[serde(alias = "sexpr", alias = "lisp")]
    Sexp,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Json, OutputFormat::Sexp];

    /// Create a driver for this format.
    pub fn driver(self, pretty: bool) -> Box<dyn OutputDriver> {
        match self {
            OutputFormat::Json => Box::new(JsonDriver::new().with_pretty(pretty)),
            OutputFormat::Sexp => Box::new(SexpDriver::new()),
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Sexp => "sexp",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            OutputFormat::Json => "JSON array, one object per declaration",
            OutputFormat::Sexp => "S-expressions, one form per declaration",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sexp => write!(f, "sexp"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "sexp" | "sexpr" | "lisp" => Ok(OutputFormat::Sexp),
            _ => Err(OutputFormatParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid output format string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid output format '{0}', valid values: json, sexp")]
pub struct OutputFormatParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Decl, HasFields, Type};
    use crate::test_support::{sample_unit, RecordingDriver};

    #[test]
    fn test_each_kind_reaches_its_own_entry_point() {
        let unit = sample_unit();
        let mut driver = RecordingDriver::default();

        for decl in &unit {
            driver.calls.clear();
            decl.write(&mut driver);

            let expected = match decl {
                Decl::UnhandledDecl(_) => "unhandled",
                Decl::TypeDecl(_) => "type",
                Decl::VarDecl(_) => "var",
                Decl::FunctionDecl(_) => "function",
                Decl::TypedefDecl(_) => "typedef",
                Decl::RecordDecl(_) => "record",
                Decl::EnumDecl(_) => "enum",
                Decl::ObjCInterfaceDecl(_) => "objc-interface",
                Decl::ObjCCategoryDecl(_) => "objc-category",
                Decl::ObjCProtocolDecl(_) => "objc-protocol",
            };
            assert_eq!(driver.calls, vec![(expected, decl.name().to_string())]);
        }
    }

    #[test]
    fn test_render_visits_in_unit_order() {
        let unit = sample_unit();
        let mut driver = RecordingDriver::default();
        render(&unit, &mut driver);

        let names: Vec<&str> = driver.calls.iter().map(|(_, n)| n.as_str()).collect();
        let expected: Vec<&str> = unit.iter().map(|d| d.name()).collect();
        assert_eq!(names, expected);
        assert_eq!(driver.betweens, unit.len() - 1);
        assert!(driver.header && driver.footer);
    }

    #[test]
    fn test_point_record_end_to_end() {
        let mut unit = TranslationUnit::new();
        let mut point = RecordDecl::new("Point", false);
        point.add_field("x", Type::basic("int32_t", 32, 32));
        point.add_field("y", Type::basic("int32_t", 32, 32));
        unit.push(point);

        let mut driver = RecordingDriver::default();
        render(&unit, &mut driver);

        assert_eq!(driver.records.len(), 1);
        let record = &driver.records[0];
        assert_eq!(record.name(), "Point");
        assert!(!record.is_union());
        let names: Vec<&str> = record.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("SEXP".parse::<OutputFormat>(), Ok(OutputFormat::Sexp));
        assert_eq!("lisp".parse::<OutputFormat>(), Ok(OutputFormat::Sexp));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Sexp.to_string(), "sexp");
    }

    #[test]
    fn test_empty_unit_renders_empty_documents() {
        let unit = TranslationUnit::new();
        let json = render_to_string(&unit, &mut *OutputFormat::Json.driver(false));
        assert_eq!(json.trim(), "[]");

        let sexp = render_to_string(&unit, &mut *OutputFormat::Sexp.driver(false));
        assert!(sexp.trim().is_empty());
    }
}
