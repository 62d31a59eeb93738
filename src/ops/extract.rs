//! Scan headers and render their declarations.
//!
//! All headers named on one run share a single [`TranslationUnit`], so
//! identities are unique across the whole output and types declared in an
//! earlier header resolve in later ones.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::core::{Decl, TranslationUnit};
use crate::output::{render_to_string, OutputFormat};
use crate::util::config::ScanConfig;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::{glob_files, is_glob, read_to_string, write_string};

/// Options for an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Header paths or glob patterns
    pub inputs: Vec<String>,
    /// Directory relative inputs are resolved against
    pub base_dir: PathBuf,
    /// Output format
    pub format: OutputFormat,
    /// Pretty-print where the format supports it
    pub pretty: bool,
    /// File to write to (None = caller prints the result)
    pub output: Option<PathBuf>,
    /// Scanner settings
    pub scan: ScanConfig,
}

impl ExtractOptions {
    pub fn new(inputs: Vec<String>) -> Self {
        ExtractOptions {
            inputs,
            base_dir: PathBuf::from("."),
            format: OutputFormat::default(),
            pretty: false,
            output: None,
            scan: ScanConfig::default(),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_scan(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }
}

/// Outcome of an extraction run.
#[derive(Debug)]
pub struct ExtractResult {
    /// Headers scanned, in order
    pub headers: Vec<PathBuf>,
    /// Every declaration found
    pub unit: TranslationUnit,
    /// The rendered document
    pub rendered: String,
    /// One warning per unhandled declaration
    pub unhandled: Vec<Diagnostic>,
    /// Where the document was written, if anywhere
    pub output: Option<PathBuf>,
}

impl ExtractResult {
    /// One-line count of declarations per kind.
    pub fn summary_line(&self) -> String {
        let counts: Vec<String> = self
            .unit
            .summary()
            .into_iter()
            .map(|(kind, n)| format!("{} {}", n, kind))
            .collect();
        let headers = match self.headers.len() {
            1 => "1 header".to_string(),
            n => format!("{} headers", n),
        };
        if counts.is_empty() {
            format!("no declarations in {}", headers)
        } else {
            format!("{} in {}", counts.join(", "), headers)
        }
    }
}

/// Expand inputs into the list of header files to scan.
pub fn resolve_headers(inputs: &[String], base_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut headers = Vec::new();

    for input in inputs {
        if is_glob(input) {
            let matched = glob_files(base_dir, std::slice::from_ref(input))?;
            if matched.is_empty() {
                warn!("no headers matched `{}`", input);
            }
            headers.extend(matched);
        } else {
            let path = base_dir.join(input);
            if !path.is_file() {
                bail!("header not found: {}", path.display());
            }
            headers.push(path);
        }
    }

    if headers.is_empty() {
        bail!(
            "no headers matched {}\n{}",
            inputs.join(", "),
            Diagnostic::note(suggestions::NO_HEADERS)
        );
    }

    let mut seen = HashSet::new();
    headers.retain(|header| seen.insert(header.clone()));
    Ok(headers)
}

/// Scan every input header and render the result.
pub fn extract(opts: &ExtractOptions) -> Result<ExtractResult> {
    let headers = resolve_headers(&opts.inputs, &opts.base_dir)?;
    let scanner = opts.scan.scanner();

    let mut unit = TranslationUnit::new();
    if let [single] = headers.as_slice() {
        unit = unit.with_source(single);
    }

    for header in &headers {
        info!("scanning {}", header.display());
        let content = read_to_string(header)?;
        scanner.scan_into(&content, header, &mut unit)?;
    }

    let unhandled: Vec<Diagnostic> = unit
        .iter()
        .filter_map(|decl| match decl {
            Decl::UnhandledDecl(d) => {
                warn!(
                    location = d.location().unwrap_or_default(),
                    kind = d.kind(),
                    "unhandled declaration `{}`",
                    d.name()
                );
                Some(Diagnostic::unhandled(d))
            }
            _ => None,
        })
        .collect();

    let mut driver = opts.format.driver(opts.pretty);
    let rendered = render_to_string(&unit, driver.as_mut());

    if let Some(ref output) = opts.output {
        write_string(output, &rendered)?;
        info!("wrote {} declarations to {}", unit.len(), output.display());
    }

    Ok(ExtractResult {
        headers,
        unit,
        rendered,
        unhandled,
        output: opts.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ScanError;
    use crate::test_support::C_HEADER;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_extract_json() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "sample.h", C_HEADER);

        let opts = ExtractOptions::new(vec!["sample.h".to_string()]).with_base_dir(tmp.path());
        let result = extract(&opts).unwrap();

        assert_eq!(result.headers.len(), 1);
        assert!(result.unhandled.is_empty());
        let json: serde_json::Value = serde_json::from_str(&result.rendered).unwrap();
        let records = json.as_array().unwrap();
        assert_eq!(records.len(), result.unit.len());
        assert!(records
            .iter()
            .any(|r| r["tag"] == "function" && r["name"] == "sample_add"));
        assert!(result.summary_line().ends_with("in 1 header"));
    }

    #[test]
    fn test_extract_to_file_as_sexp() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "api.h", "struct point { int x; int y; };\n");
        let out = tmp.path().join("out/api.sexp");

        let opts = ExtractOptions::new(vec!["api.h".to_string()])
            .with_base_dir(tmp.path())
            .with_format(OutputFormat::Sexp)
            .with_output(Some(out.clone()));
        let result = extract(&opts).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, result.rendered);
        assert!(written.contains("(struct \"point\" 64 32 (\"x\" :int) (\"y\" :int))"));
    }

    #[test]
    fn test_glob_inputs_share_one_unit() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("include")).unwrap();
        write(&tmp.path().join("include"), "a.h", "typedef unsigned int u32;\n");
        write(&tmp.path().join("include"), "b.h", "u32 hash(const char *s);\n");

        let opts = ExtractOptions::new(vec!["include/*.h".to_string()]).with_base_dir(tmp.path());
        let result = extract(&opts).unwrap();

        assert_eq!(result.headers.len(), 2);
        assert_eq!(result.unit.len(), 2);
        assert!(result.unit.source().is_none());
        assert_eq!(result.summary_line(), "1 typedef, 1 function in 2 headers");
    }

    #[test]
    fn test_header_named_twice_is_scanned_once() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.h", "int alpha(void);\n");
        write(tmp.path(), "b.h", "int beta(void);\n");

        let inputs = vec!["a.h".to_string(), "*.h".to_string()];
        let headers = resolve_headers(&inputs, tmp.path()).unwrap();
        assert_eq!(headers, vec![tmp.path().join("a.h"), tmp.path().join("b.h")]);

        let result = extract(&ExtractOptions::new(inputs).with_base_dir(tmp.path())).unwrap();
        let names: Vec<&str> = result.unit.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_unhandled_declarations_are_reported() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "mixed.h", "namespace detail { }\nint ok(void);\n");

        let opts = ExtractOptions::new(vec!["mixed.h".to_string()]).with_base_dir(tmp.path());
        let result = extract(&opts).unwrap();

        assert_eq!(result.unit.len(), 2);
        assert_eq!(result.unhandled.len(), 1);
        assert!(result.unhandled[0].message.contains("Namespace `detail`"));
        assert!(result.rendered.contains("\"unhandled\""));
    }

    #[test]
    fn test_missing_header_fails() {
        let tmp = TempDir::new().unwrap();
        let opts = ExtractOptions::new(vec!["missing.h".to_string()]).with_base_dir(tmp.path());
        let err = extract(&opts).unwrap_err();
        assert!(err.to_string().contains("header not found"));

        let opts = ExtractOptions::new(vec!["*.h".to_string()]).with_base_dir(tmp.path());
        let err = extract(&opts).unwrap_err();
        assert!(err.to_string().contains("no headers matched"));
    }

    #[test]
    fn test_scan_error_is_preserved() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "bad.h", "struct broken {\n");

        let opts = ExtractOptions::new(vec!["bad.h".to_string()]).with_base_dir(tmp.path());
        let err = extract(&opts).unwrap_err();
        assert!(err.downcast_ref::<ScanError>().is_some());
    }
}
