//! Structural errors that stop a header from being scanned.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A header whose structure the scanner cannot follow.
#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    /// A `{` without its `}`, or a `}` without its `{`.
    #[error("unbalanced braces in {file}")]
    #[diagnostic(
        code(c2ffi::scan::unbalanced),
        help("check for a missing brace or a macro that expands to one")
    )]
    Unbalanced {
        file: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("this brace has no partner")]
        span: SourceSpan,
    },

    /// An `@interface`, `@protocol` or `@implementation` without `@end`.
    #[error("`{keyword}` block is never closed with `@end` in {file}")]
    #[diagnostic(code(c2ffi::scan::unterminated_block))]
    UnterminatedBlock {
        keyword: String,
        file: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("block starts here")]
        span: SourceSpan,
    },
}

impl ScanError {
    pub(crate) fn unbalanced(file: &str, source: &str, offset: usize) -> Self {
        ScanError::Unbalanced {
            file: file.to_string(),
            src: NamedSource::new(file, source.to_string()),
            span: (offset, 1).into(),
        }
    }

    pub(crate) fn unterminated(file: &str, source: &str, keyword: &str, offset: usize) -> Self {
        ScanError::UnterminatedBlock {
            keyword: keyword.to_string(),
            file: file.to_string(),
            src: NamedSource::new(file, source.to_string()),
            span: (offset, keyword.len()).into(),
        }
    }
}
