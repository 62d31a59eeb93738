//! Header scanner.
//!
//! Reads C and Objective-C headers into a [`TranslationUnit`]. This is a
//! lightweight scanner rather than a compiler front end: macros are not
//! expanded and nothing is type-checked. Declarations it cannot make sense of
//! become [`UnhandledDecl`]s instead of stopping the scan.

pub mod ctype;
pub mod error;
pub mod layout;
pub mod objc;
pub mod split;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use tracing::{debug, trace};

use crate::core::{
    Decl, DeclId, EnumDecl, Field, FunctionDecl, ObjCInterfaceDecl, ObjCProtocolDecl,
    RecordDecl, TagKind, TranslationUnit, Type, TypeDecl, TypedefDecl, UnhandledDecl, VarDecl,
};

use self::ctype::{eval_expr, tokenize, unresolved_tag, Declared, Param, Parser, Token, TypeContext};
use self::split::{Define, Item, Statement};

pub use self::error::ScanError;

/// Scanner for header files.
#[derive(Debug, Clone, Default)]
pub struct HeaderScanner {
    /// Functions to include (empty = all)
    include_functions: Vec<String>,
    /// Functions to exclude
    exclude_functions: Vec<String>,
    /// Types to include (empty = all)
    include_types: Vec<String>,
    /// Types to exclude
    exclude_types: Vec<String>,
    /// Prefix to strip from names
    strip_prefix: Option<String>,
    /// Emit object-like `#define`s as constants
    macros: bool,
}

impl HeaderScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_functions(mut self, funcs: Vec<String>) -> Self {
        self.include_functions = funcs;
        self
    }

    pub fn with_exclude_functions(mut self, funcs: Vec<String>) -> Self {
        self.exclude_functions = funcs;
        self
    }

    pub fn with_include_types(mut self, types: Vec<String>) -> Self {
        self.include_types = types;
        self
    }

    pub fn with_exclude_types(mut self, types: Vec<String>) -> Self {
        self.exclude_types = types;
        self
    }

    /// Set prefix to strip from C declaration names.
    pub fn with_strip_prefix(mut self, prefix: Option<String>) -> Self {
        self.strip_prefix = prefix;
        self
    }

    /// Emit object-like macros with literal values as constants.
    pub fn with_macros(mut self, macros: bool) -> Self {
        self.macros = macros;
        self
    }

    /// Scan a header file.
    pub fn parse_file(&self, path: &Path) -> Result<TranslationUnit> {
        let content = crate::util::fs::read_to_string(path)?;
        Ok(self.parse_content(&content, path)?)
    }

    /// Scan header content into a fresh unit.
    pub fn parse_content(&self, content: &str, path: &Path) -> Result<TranslationUnit, ScanError> {
        let mut unit = TranslationUnit::new().with_source(path);
        self.scan_into(content, path, &mut unit)?;
        Ok(unit)
    }

    /// Scan header content, appending to an existing unit.
    ///
    /// Tags and typedefs already in `unit` resolve as if they had been
    /// declared earlier in this header.
    pub fn scan_into(
        &self,
        content: &str,
        path: &Path,
        unit: &mut TranslationUnit,
    ) -> Result<(), ScanError> {
        let file = path.display().to_string();
        let items = split::split(content, &file)?;
        let before = unit.len();

        let mut scan = Scan {
            scanner: self,
            unit: &mut *unit,
            file: file.clone(),
            location: String::new(),
            constants: HashMap::new(),
            typedefs: HashSet::new(),
        };
        for item in &items {
            match item {
                Item::Define(define) => scan.define(define),
                Item::Statement(statement) => scan.statement(statement),
            }
        }

        debug!(file = %file, declarations = unit.len() - before, "scanned header");
        Ok(())
    }

    fn should_include_function(&self, name: &str) -> bool {
        if self.exclude_functions.iter().any(|e| e == name) {
            return false;
        }
        self.include_functions.is_empty() || self.include_functions.iter().any(|i| i == name)
    }

    fn should_include_type(&self, name: &str) -> bool {
        if self.exclude_types.iter().any(|e| e == name) {
            return false;
        }
        self.include_types.is_empty() || self.include_types.iter().any(|i| i == name)
    }

    fn maybe_strip_prefix(&self, name: &str) -> String {
        match &self.strip_prefix {
            Some(prefix) => name.strip_prefix(prefix.as_str()).unwrap_or(name).to_string(),
            None => name.to_string(),
        }
    }
}

/// Infer the type of a macro value from its literal.
fn infer_constant_type(value: &str) -> Option<Type> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();

    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        return Some(Type::pointer(Type::basic("char", 8, 8)));
    }
    if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 3 {
        return Some(Type::basic("char", 8, 8));
    }

    let digits = lower.trim_start_matches('-');
    if digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        let hex = digits.starts_with("0x");
        if !hex && (digits.contains('.') || digits.contains('e')) {
            return Some(if digits.ends_with('f') {
                Type::basic("float", 32, 32)
            } else {
                Type::basic("double", 64, 64)
            });
        }
        let unsigned = digits.contains('u');
        let long = digits.ends_with('l');
        let ty = match (unsigned, long) {
            (true, true) => Type::basic("unsigned long", 64, 64),
            (false, true) => Type::basic("long", 64, 64),
            (true, false) => Type::basic("unsigned int", 32, 32),
            (false, false) => Type::int(),
        };
        return Some(ty);
    }

    // Parenthesized or composite integer expressions.
    eval_expr(&tokenize(value), &|_: &str| None).map(|_| Type::int())
}

/// Per-header scan state.
struct Scan<'s> {
    scanner: &'s HeaderScanner,
    unit: &'s mut TranslationUnit,
    file: String,
    /// `file:line` of the statement being scanned
    location: String,
    /// Integer macros and enumerators seen so far, by source name
    constants: HashMap<String, i64>,
    /// Typedef names seen so far, by source name
    typedefs: HashSet<String>,
}

impl Scan<'_> {
    fn push(&mut self, decl: impl Into<Decl>) -> DeclId {
        let mut decl = decl.into();
        decl.set_location(self.location.clone());
        trace!(kind = decl.kind_name(), name = decl.name(), "declaration");
        self.unit.push(decl)
    }

    fn unhandled(&mut self, name: &str, kind: &str) {
        debug!(location = %self.location, name, kind, "unhandled declaration");
        self.push(UnhandledDecl::new(name, kind));
    }

    fn define(&mut self, define: &Define) {
        let value = eval_expr(&tokenize(&define.value), &|n: &str| self.constants.get(n).copied());
        if let Some(value) = value {
            self.constants.insert(define.name.clone(), value);
        }

        if !self.scanner.macros {
            return;
        }
        let Some(ty) = infer_constant_type(&define.value) else {
            trace!(name = %define.name, "macro is not a literal");
            return;
        };

        self.location = format!("{}:{}", self.file, define.line);
        let var = VarDecl::new(self.scanner.maybe_strip_prefix(&define.name), ty)
            .with_value(define.value.clone())
            .with_string(define.value.starts_with('"'));
        self.push(var);
    }

    fn statement(&mut self, statement: &Statement) {
        self.location = format!("{}:{}", self.file, statement.line);
        let text = statement.text.trim_end_matches(';').trim();
        let tokens = tokenize(text);
        let Some(first) = tokens.first() else { return };
        let second = tokens.get(1).and_then(Token::ident).unwrap_or_default().to_string();

        match first.ident().unwrap_or_default() {
            "@class" => {
                for name in objc::forward_names(&tokens) {
                    if self.scanner.should_include_type(&name) {
                        self.push(ObjCInterfaceDecl::new(name, None, true));
                    }
                }
            }
            "@protocol" if !tokens.iter().any(|t| t.is_ident("@end")) => {
                for name in objc::forward_names(&tokens) {
                    if self.scanner.should_include_type(&name) {
                        self.push(ObjCProtocolDecl::new(name));
                    }
                }
            }
            "@interface" | "@protocol" => match objc::parse_block(&tokens, self) {
                Some(decl) if self.scanner.should_include_type(decl.name()) => {
                    self.push(decl);
                }
                Some(_) => {}
                None => self.unhandled(&second, "ObjCContainer"),
            },
            "@implementation" => self.unhandled(&second, "ObjCImplementation"),
            "namespace" => self.unhandled(&second, "Namespace"),
            "template" => {
                let mut p = Parser::new(&tokens[1..]);
                let _ = p.group();
                let rest = p.rest();
                let kind = match rest.first().and_then(Token::ident) {
                    Some("class" | "struct" | "union") => "ClassTemplate",
                    _ => "FunctionTemplate",
                };
                let name = guess_name(rest);
                self.unhandled(&name, kind);
            }
            "class" => self.unhandled(&second, "CXXRecord"),
            "using" => match second.as_str() {
                "namespace" => {
                    let name = tokens.get(2).and_then(Token::ident).unwrap_or_default();
                    self.unhandled(name, "UsingDirective");
                }
                _ if tokens.get(2).is_some_and(|t| t.is_punct('=')) => {
                    self.unhandled(&second, "TypeAlias")
                }
                _ => self.unhandled(&guess_name(&tokens), "Using"),
            },
            "static_assert" | "_Static_assert" => self.unhandled("", "StaticAssert"),
            _ => {
                if !self.declaration(&tokens) {
                    self.unhandled(&guess_name(&tokens), "Unknown");
                }
            }
        }
    }

    /// Read a C declaration. Returns `false` if nothing could be made of it.
    fn declaration(&mut self, tokens: &[Token]) -> bool {
        let mut p = Parser::new(tokens);
        let Some(spec) = p.parse_specifiers(self) else {
            return false;
        };

        if p.at_end() {
            return match &spec.tag {
                Some(tag) if !tag.defined => {
                    if tag.kind != TagKind::Enum && self.scanner.should_include_type(&tag.name) {
                        let name = self.scanner.maybe_strip_prefix(&tag.name);
                        self.push(TypeDecl::new(name, spec.base.clone()));
                    }
                    true
                }
                Some(_) => true,
                None => false,
            };
        }

        let mut declared_any = false;
        loop {
            let Some(d) = p.parse_declarator(self) else {
                return declared_any;
            };
            let Some(name) = d.name().map(str::to_string) else {
                return declared_any;
            };

            match d.build(spec.base.clone()) {
                declared if spec.is_typedef => self.typedef(&name, declared.into_type()),
                Declared::Function {
                    return_type,
                    params,
                    is_variadic,
                } => self.function(&name, return_type, params, is_variadic),
                Declared::Object(ty) => {
                    let value = d.initializer.unwrap_or_default();
                    let is_string = value.starts_with('"');
                    let var = VarDecl::new(self.scanner.maybe_strip_prefix(&name), ty)
                        .with_extern(spec.is_extern)
                        .with_value(value)
                        .with_string(is_string);
                    self.push(var);
                }
            }
            declared_any = true;

            if !p.eat_punct(',') {
                // A function definition ends with its body.
                return p.at_end() || p.peek().is_some_and(|t| t.is_punct('{'));
            }
        }
    }

    fn typedef(&mut self, name: &str, ty: Type) {
        self.typedefs.insert(name.to_string());
        if !self.scanner.should_include_type(name) {
            debug!(name, "typedef filtered out");
            return;
        }
        let name = self.scanner.maybe_strip_prefix(name);
        self.push(TypedefDecl::new(name, ty));
    }

    fn function(&mut self, name: &str, return_type: Type, params: Vec<Param>, is_variadic: bool) {
        if !self.scanner.should_include_function(name) {
            debug!(name, "function filtered out");
            return;
        }
        let mut function =
            FunctionDecl::new(self.scanner.maybe_strip_prefix(name), return_type, is_variadic);
        for param in params {
            function.add_field(param.name, param.ty);
        }
        self.push(function);
    }
}

impl TypeContext for Scan<'_> {
    fn is_typedef(&self, name: &str) -> bool {
        self.typedefs.contains(name)
            || self
                .unit
                .lookup_typedef(&self.scanner.maybe_strip_prefix(name))
                .is_some()
    }

    fn constant(&self, name: &str) -> Option<i64> {
        self.constants.get(name).copied()
    }

    fn type_name(&self, name: &str) -> String {
        self.scanner.maybe_strip_prefix(name)
    }

    fn tag_type(&self, kind: TagKind, name: &str) -> Type {
        let name = self.scanner.maybe_strip_prefix(name);
        match self.unit.lookup_tag(kind, &name) {
            Some(id) if kind == TagKind::Enum => Type::Enum { name, id },
            Some(id) => Type::Record {
                name,
                is_union: kind == TagKind::Union,
                id,
            },
            None => unresolved_tag(kind, &name),
        }
    }

    fn define_record(&mut self, name: &str, is_union: bool, fields: Vec<Field>) -> Type {
        let display = self.scanner.maybe_strip_prefix(name);
        if !name.is_empty() && !self.scanner.should_include_type(name) {
            debug!(name, "record filtered out");
            return Type::record(display, is_union);
        }

        let (bit_size, bit_alignment) = layout::record_layout(&fields, is_union, self.unit);
        let mut record = RecordDecl::new(display.clone(), is_union);
        for field in fields {
            record.add_field(field.name, field.ty);
        }
        record.set_bit_size(bit_size);
        record.set_bit_alignment(bit_alignment);

        let id = self.push(record);
        Type::Record {
            name: display,
            is_union,
            id,
        }
    }

    fn define_enum(&mut self, name: &str, values: Vec<(String, i64)>) -> Type {
        for (enumerator, value) in &values {
            self.constants.insert(enumerator.clone(), *value);
        }

        let display = self.scanner.maybe_strip_prefix(name);
        if !name.is_empty() && !self.scanner.should_include_type(name) {
            debug!(name, "enum filtered out");
            return unresolved_tag(TagKind::Enum, &display);
        }

        let mut decl = EnumDecl::new(display.clone());
        for (enumerator, value) in values {
            decl.add_signed(enumerator, value);
        }
        let id = self.push(decl);
        Type::Enum { name: display, id }
    }
}

/// Best guess at the name a statement declares, for unhandled reports.
fn guess_name(tokens: &[Token]) -> String {
    let before_paren = tokens
        .iter()
        .position(|t| t.is_punct('(') || t.is_punct('{') || t.is_punct('<'))
        .unwrap_or(tokens.len());
    tokens[..before_paren]
        .iter()
        .rev()
        .find_map(Token::ident)
        .unwrap_or_default()
        .to_string()
}
