//! Preprocessing and top-level statement splitting.
//!
//! Comments are blanked and preprocessor lines removed, with every newline
//! kept so offsets still map to the original line numbers. The cleaned text
//! is then cut into top-level statements.

use std::sync::LazyLock;

use regex::Regex;

use super::error::ScanError;

static DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*define\s+([A-Za-z_]\w*)(\(?)\s*(.*?)\s*$").expect("valid regex")
});

static FORWARD_PROTOCOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@protocol\s+\w+(\s*,\s*\w+)*\s*;").expect("valid regex")
});

static EXTERN_C: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^extern\s*"C(\+\+)?"$"#).expect("valid regex"));

/// An object-like `#define`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub value: String,
    pub line: usize,
}

/// A top-level statement and where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub text: String,
    pub offset: usize,
    pub line: usize,
}

/// Either kind of top-level item, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Define(Define),
    Statement(Statement),
}

impl Item {
    pub fn line(&self) -> usize {
        match self {
            Item::Define(d) => d.line,
            Item::Statement(s) => s.line,
        }
    }
}

/// Blank out comments, keeping newlines and string literals intact.
pub fn strip_comments(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut out = String::with_capacity(content.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                let end = literal_end(bytes, i);
                out.push_str(&content[i..end]);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = content[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |p| i + 2 + p + 2);
                blank(&mut out, &content[i..end]);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = content[i..].find('\n').map_or(bytes.len(), |p| i + p);
                blank(&mut out, &content[i..end]);
                i = end;
            }
            _ => {
                let ch = content[i..].chars().next().unwrap_or(' ');
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }

    out
}

/// Offset just past the string or char literal starting at `start`.
fn literal_end(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn blank(out: &mut String, text: &str) {
    out.extend(text.chars().map(|c| if c == '\n' { '\n' } else { ' ' }));
}

/// Remove preprocessor lines, returning the cleaned text and the
/// object-like defines found along the way.
pub fn strip_preprocessor(content: &str) -> (String, Vec<Define>) {
    let mut out = String::with_capacity(content.len());
    let mut defines = Vec::new();
    let mut directive: Option<(usize, String)> = None;

    for (index, line) in content.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }

        let continued = line.trim_end().ends_with('\\');
        let starts_directive = directive.is_none() && line.trim_start().starts_with('#');

        if directive.is_none() && !starts_directive {
            out.push_str(line);
            continue;
        }

        let (_, text) = directive.get_or_insert_with(|| (index + 1, String::new()));
        text.push_str(line.trim_end().trim_end_matches('\\'));
        text.push(' ');
        blank(&mut out, line);

        if !continued {
            if let Some((line_no, text)) = directive.take() {
                if let Some(cap) = DEFINE.captures(&text) {
                    // `#define F(x)` is function-like and skipped.
                    if cap[2].is_empty() && !cap[3].is_empty() {
                        defines.push(Define {
                            name: cap[1].to_string(),
                            value: cap[3].to_string(),
                            line: line_no,
                        });
                    }
                }
            }
        }
    }

    (out, defines)
}

/// Maps byte offsets to 1-based line numbers.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        LineIndex { starts }
    }

    pub fn line(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

/// Cut cleaned text into top-level statements.
///
/// A statement ends at `;` outside braces, or at the `}` closing a function
/// body or namespace. `extern "C" { ... }` does not nest. Objective-C
/// `@interface`, `@protocol` and `@implementation` blocks run to `@end`.
pub fn split_statements(text: &str, file: &str) -> Result<Vec<Statement>, ScanError> {
    let bytes = text.as_bytes();
    let lines = LineIndex::new(text);
    let mut statements = Vec::new();
    // One entry per open brace: whether it belongs to `extern "C"`.
    let mut braces: Vec<(bool, usize)> = Vec::new();
    let mut start = 0;
    let mut i = 0;

    let mut push = |statements: &mut Vec<Statement>, from: usize, to: usize| {
        let raw = &text[from..to];
        let trimmed = raw.trim_start();
        if trimmed.trim().is_empty() {
            return;
        }
        let offset = from + (raw.len() - trimmed.len());
        statements.push(Statement {
            text: trimmed.trim_end().to_string(),
            offset,
            line: lines.line(offset),
        });
    };

    while i < bytes.len() {
        let depth = braces.iter().filter(|(transparent, _)| !transparent).count();
        match bytes[i] {
            b'"' | b'\'' => {
                i = literal_end(bytes, i);
                continue;
            }
            b'@' if depth == 0 => {
                let rest = &text[i..];
                let keyword = ["@interface", "@protocol", "@implementation"]
                    .into_iter()
                    .find(|k| {
                        rest.starts_with(k)
                            && !rest[k.len()..].starts_with(|c: char| c.is_alphanumeric() || c == '_')
                    });
                if let Some(keyword) = keyword {
                    if !(keyword == "@protocol" && FORWARD_PROTOCOL.is_match(rest)) {
                        let end = find_end(text, i + keyword.len())
                            .ok_or_else(|| ScanError::unterminated(file, text, keyword, i))?;
                        push(&mut statements, start, end);
                        start = end;
                        i = end;
                        continue;
                    }
                }
            }
            b'{' => {
                let head = text[start..i].trim();
                let transparent = depth == 0 && EXTERN_C.is_match(head);
                braces.push((transparent, i));
                if transparent {
                    start = i + 1;
                }
            }
            b'}' => {
                let Some((transparent, _)) = braces.pop() else {
                    return Err(ScanError::unbalanced(file, text, i));
                };
                if transparent {
                    start = i + 1;
                } else if depth == 1 {
                    let head = text[start..i].split('{').next().unwrap_or("").trim();
                    if head.ends_with(')') || head.starts_with("namespace") {
                        push(&mut statements, start, i + 1);
                        start = i + 1;
                    }
                }
            }
            b';' if depth == 0 => {
                push(&mut statements, start, i + 1);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if let Some((_, open)) = braces.last() {
        return Err(ScanError::unbalanced(file, text, *open));
    }
    push(&mut statements, start, text.len());

    Ok(statements)
}

/// Offset just past the `@end` that closes a block body starting at `from`.
fn find_end(text: &str, from: usize) -> Option<usize> {
    let mut search = from;
    while let Some(pos) = text[search..].find("@end") {
        let at = search + pos;
        let after = at + "@end".len();
        if !text[after..].starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            return Some(after);
        }
        search = after;
    }
    None
}

/// Preprocess `content` and return its defines and statements in source order.
pub fn split(content: &str, file: &str) -> Result<Vec<Item>, ScanError> {
    let uncommented = strip_comments(content);
    let (cleaned, defines) = strip_preprocessor(&uncommented);
    let statements = split_statements(&cleaned, file)?;

    let mut items: Vec<Item> = defines
        .into_iter()
        .map(Item::Define)
        .chain(statements.into_iter().map(Item::Statement))
        .collect();
    items.sort_by_key(Item::line);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(content: &str) -> Vec<String> {
        split_statements(content, "t.h")
            .unwrap()
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_strip_comments_keeps_lines() {
        let src = "int a; /* one\ntwo */ int b; // tail\nint c;";
        let out = strip_comments(src);
        assert_eq!(out.lines().count(), src.lines().count());
        assert!(!out.contains("one"));
        assert!(!out.contains("tail"));
        assert!(out.contains("int c;"));
    }

    #[test]
    fn test_strip_comments_ignores_markers_in_strings() {
        let out = strip_comments(r#"const char *u = "http://x/*y*/";"#);
        assert!(out.contains("http://x/*y*/"));
    }

    #[test]
    fn test_strip_preprocessor_collects_defines() {
        let src = "#define A 1\n#define F(x) (x)\n#define LONG 1 + \\\n 2\n#include <x.h>\nint a;";
        let (out, defines) = strip_preprocessor(src);

        assert_eq!(out.lines().count(), 6);
        assert!(out.contains("int a;"));
        assert!(!out.contains("include"));
        let names: Vec<&str> = defines.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "LONG"]);
        assert_eq!(defines[1].value, "1 + 2");
        assert_eq!(defines[1].line, 3);
    }

    #[test]
    fn test_split_simple_statements() {
        assert_eq!(
            texts("int a;\nstruct p { int x; int y; } ;\nvoid f(void);"),
            vec!["int a;", "struct p { int x; int y; } ;", "void f(void);"]
        );
    }

    #[test]
    fn test_function_body_ends_statement() {
        assert_eq!(
            texts("static int f(int x) { return x; }\nint g;"),
            vec!["static int f(int x) { return x; }", "int g;"]
        );
    }

    #[test]
    fn test_extern_c_is_transparent() {
        assert_eq!(
            texts("extern \"C\" {\nint a;\nint b;\n}\nint c;"),
            vec!["int a;", "int b;", "int c;"]
        );
    }

    #[test]
    fn test_objc_blocks_run_to_end() {
        let src = "@class A;\n@interface A : B\n- (void)x;\n- (int)y;\n@end\n@protocol P;\nint z;";
        assert_eq!(
            texts(src),
            vec![
                "@class A;",
                "@interface A : B\n- (void)x;\n- (int)y;\n@end",
                "@protocol P;",
                "int z;"
            ]
        );
    }

    #[test]
    fn test_statement_lines() {
        let statements = split_statements("\n\nint a;\n\nint b;", "t.h").unwrap();
        assert_eq!(statements[0].line, 3);
        assert_eq!(statements[1].line, 5);
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(matches!(
            split_statements("struct a { int x;", "t.h"),
            Err(ScanError::Unbalanced { .. })
        ));
        assert!(matches!(
            split_statements("int x; }", "t.h"),
            Err(ScanError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_unterminated_objc_block() {
        assert!(matches!(
            split_statements("@interface A\n- (void)x;", "t.h"),
            Err(ScanError::UnterminatedBlock { .. })
        ));
    }

    #[test]
    fn test_split_orders_defines_with_statements() {
        let items = split("int a;\n#define B 2\nint c;", "t.h").unwrap();
        let lines: Vec<usize> = items.iter().map(Item::line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert!(matches!(items[1], Item::Define(_)));
    }
}
