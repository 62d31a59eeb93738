//! Tokens, declaration specifiers and declarators.
//!
//! Turns the text of one C declaration into [`Type`]s. Struct, union and enum
//! bodies met along the way are handed to a [`TypeContext`], which owns the
//! declarations they become.

use std::fmt;

use crate::core::{DeclId, Field, TagKind, Type};

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Identifier or keyword, including Objective-C `@keywords`
    Ident(String),
    /// Numeric literal as written
    Number(String),
    /// String literal with its quotes
    Str(String),
    /// Character literal with its quotes
    Char(String),
    /// `...`
    Ellipsis,
    Punct(char),
}

impl Token {
    pub fn ident(&self) -> Option<&str> {
        match self {
            Token::Ident(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_punct(&self, c: char) -> bool {
        matches!(self, Token::Punct(p) if *p == c)
    }

    pub fn is_ident(&self, word: &str) -> bool {
        matches!(self, Token::Ident(s) if s == word)
    }

    fn is_wordlike(&self) -> bool {
        matches!(self, Token::Ident(_) | Token::Number(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) | Token::Number(s) | Token::Str(s) | Token::Char(s) => f.write_str(s),
            Token::Ellipsis => f.write_str("..."),
            Token::Punct(c) => write!(f, "{}", c),
        }
    }
}

/// Split text into tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let take_while = |mut j: usize, pred: &dyn Fn(char) -> bool| {
        while j < chars.len() && pred(chars[j]) {
            j += 1;
        }
        j
    };

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
        } else if c.is_alphabetic()
            || c == '_'
            || c == '$'
            || (c == '@' && next.is_some_and(char::is_alphabetic))
        {
            let end = take_while(i + 1, &|c| c.is_alphanumeric() || c == '_' || c == '$');
            tokens.push(Token::Ident(chars[i..end].iter().collect()));
            i = end;
        } else if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) {
            let mut j = i + 1;
            while j < chars.len() {
                let ch = chars[j];
                let hex = chars[i..j].iter().take(2).any(|c| matches!(c, 'x' | 'X'));
                let exponent = matches!(ch, '+' | '-')
                    && if hex {
                        matches!(chars[j - 1], 'p' | 'P')
                    } else {
                        matches!(chars[j - 1], 'e' | 'E')
                    };
                if ch.is_alphanumeric() || ch == '.' || ch == '_' || exponent {
                    j += 1;
                } else {
                    break;
                }
            }
            tokens.push(Token::Number(chars[i..j].iter().collect()));
            i = j;
        } else if c == '"' || c == '\'' || (c == '@' && next == Some('"')) {
            let quote = if c == '@' { '"' } else { c };
            let mut j = if c == '@' { i + 2 } else { i + 1 };
            while j < chars.len() && chars[j] != quote {
                if chars[j] == '\\' {
                    j += 1;
                }
                j += 1;
            }
            let end = (j + 1).min(chars.len());
            let literal: String = chars[i..end].iter().collect();
            tokens.push(if quote == '"' {
                Token::Str(literal)
            } else {
                Token::Char(literal)
            });
            i = end;
        } else if c == '.' && next == Some('.') && chars.get(i + 2) == Some(&'.') {
            tokens.push(Token::Ellipsis);
            i += 3;
        } else {
            tokens.push(Token::Punct(c));
            i += 1;
        }
    }

    tokens
}

/// Render tokens back to compact text.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token.is_wordlike() && tokens[i - 1].is_wordlike() {
            out.push(' ');
        }
        out.push_str(&token.to_string());
    }
    out
}

/// Split tokens on `sep` outside of any brackets.
pub fn split_top_level(tokens: &[Token], sep: char) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Punct('(' | '[' | '{') => depth += 1,
            Token::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
            Token::Punct(c) if *c == sep && depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// Value of an integer literal, ignoring suffixes.
///
/// Literals wider than `i64` wrap, so `0xFFFFFFFFFFFFFFFF` reads as -1.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    let (radix, digits) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    let digits = digits.replace('\'', "");
    u64::from_str_radix(&digits, radix).ok().map(|v| v as i64)
}

/// Value of a character literal such as `'a'` or `'\n'`.
pub fn parse_char_literal(text: &str) -> Option<i64> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let value = match chars.next()? {
        '\\' => match chars.next()? {
            'n' => '\n' as i64,
            't' => '\t' as i64,
            'r' => '\r' as i64,
            '0' => 0,
            'a' => 7,
            'b' => 8,
            'f' => 12,
            'v' => 11,
            other => other as i64,
        },
        c => c as i64,
    };
    Some(value)
}

/// Evaluate an integer constant expression.
///
/// Supports the arithmetic, shift and bitwise binary operators, unary
/// `- + ~ !`, parentheses, character literals, and names resolved through
/// `lookup`. The whole token slice must be consumed.
pub fn eval_expr(tokens: &[Token], lookup: &dyn Fn(&str) -> Option<i64>) -> Option<i64> {
    let mut eval = Eval {
        tokens,
        pos: 0,
        lookup,
    };
    let value = eval.binary(0)?;
    (eval.pos == tokens.len()).then_some(value)
}

struct Eval<'a> {
    tokens: &'a [Token],
    pos: usize,
    lookup: &'a dyn Fn(&str) -> Option<i64>,
}

impl Eval<'_> {
    /// The binary operator at the cursor with its precedence and width.
    fn operator(&self) -> Option<(&'static str, u8, usize)> {
        let first = self.tokens.get(self.pos)?;
        let second = self.tokens.get(self.pos + 1);
        let op = match first {
            Token::Punct('|') => ("|", 1, 1),
            Token::Punct('^') => ("^", 2, 1),
            Token::Punct('&') => ("&", 3, 1),
            Token::Punct('<') if second.is_some_and(|t| t.is_punct('<')) => ("<<", 4, 2),
            Token::Punct('>') if second.is_some_and(|t| t.is_punct('>')) => (">>", 4, 2),
            Token::Punct('+') => ("+", 5, 1),
            Token::Punct('-') => ("-", 5, 1),
            Token::Punct('*') => ("*", 6, 1),
            Token::Punct('/') => ("/", 6, 1),
            Token::Punct('%') => ("%", 6, 1),
            _ => return None,
        };
        Some(op)
    }

    fn binary(&mut self, min: u8) -> Option<i64> {
        let mut lhs = self.unary()?;
        while let Some((op, prec, width)) = self.operator() {
            if prec < min {
                break;
            }
            self.pos += width;
            let rhs = self.binary(prec + 1)?;
            lhs = match op {
                "|" => lhs | rhs,
                "^" => lhs ^ rhs,
                "&" => lhs & rhs,
                "<<" => lhs.wrapping_shl(rhs as u32),
                ">>" => lhs.wrapping_shr(rhs as u32),
                "+" => lhs.wrapping_add(rhs),
                "-" => lhs.wrapping_sub(rhs),
                "*" => lhs.wrapping_mul(rhs),
                "/" => lhs.checked_div(rhs)?,
                _ => lhs.checked_rem(rhs)?,
            };
        }
        Some(lhs)
    }

    fn unary(&mut self) -> Option<i64> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        match token {
            Token::Punct('-') => Some(self.unary()?.wrapping_neg()),
            Token::Punct('+') => self.unary(),
            Token::Punct('~') => Some(!self.unary()?),
            Token::Punct('!') => Some((self.unary()? == 0) as i64),
            Token::Punct('(') => {
                let value = self.binary(0)?;
                self.tokens.get(self.pos).filter(|t| t.is_punct(')'))?;
                self.pos += 1;
                Some(value)
            }
            Token::Number(n) => parse_int_literal(n),
            Token::Char(c) => parse_char_literal(c),
            Token::Ident(name) => (self.lookup)(name),
            _ => None,
        }
    }
}

/// Callbacks a declaration parser needs from whoever is collecting
/// declarations.
pub trait TypeContext {
    /// Whether `name` was introduced by an earlier `typedef`.
    fn is_typedef(&self, name: &str) -> bool;

    /// Value of a known integer constant (enumerator or `#define`).
    fn constant(&self, name: &str) -> Option<i64>;

    /// Display name for a source-level type name.
    fn type_name(&self, name: &str) -> String;

    /// A reference to the struct, union or enum with this tag.
    fn tag_type(&self, kind: TagKind, name: &str) -> Type;

    /// Record a struct or union definition and return a reference to it.
    fn define_record(&mut self, name: &str, is_union: bool, fields: Vec<Field>) -> Type;

    /// Record an enum definition and return a reference to it.
    fn define_enum(&mut self, name: &str, values: Vec<(String, i64)>) -> Type;
}

const QUALIFIERS: &[&str] = &[
    "const", "volatile", "restrict", "__restrict", "__restrict__", "__const", "__volatile__",
    "_Atomic", "_Nullable", "_Nonnull", "_Null_unspecified", "__nullable", "__nonnull",
    "nullable", "nonnull", "null_unspecified", "__kindof", "__strong", "__weak",
    "__unsafe_unretained", "__autoreleasing", "__block", "__extension__", "register", "auto",
    "_Thread_local", "__thread", "_Noreturn", "__unused",
];

/// Objective-C parameter qualifiers, only meaningful before the type.
const OBJC_ARG_QUALIFIERS: &[&str] = &["oneway", "in", "out", "inout", "bycopy", "byref"];

const ATTRIBUTES: &[&str] = &[
    "__attribute__", "__attribute", "__declspec", "_Alignas", "alignas", "__asm__", "__asm",
    "asm",
];

const BUILTIN_WORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "__signed",
    "__signed__", "unsigned", "_Bool", "bool", "__int128", "_Complex",
];

/// Fixed-width library typedefs on an LP64 target, in bits.
const STD_TYPEDEFS: &[(&str, u64)] = &[
    ("size_t", 64), ("ssize_t", 64), ("ptrdiff_t", 64), ("intptr_t", 64), ("uintptr_t", 64),
    ("intmax_t", 64), ("uintmax_t", 64), ("off_t", 64), ("time_t", 64), ("wchar_t", 32),
    ("char16_t", 16), ("char32_t", 32), ("int8_t", 8), ("uint8_t", 8), ("int16_t", 16),
    ("uint16_t", 16), ("int32_t", 32), ("uint32_t", 32), ("int64_t", 64), ("uint64_t", 64),
];

const OBJC_TYPES: &[&str] = &["id", "instancetype", "SEL", "Class", "BOOL", "IMP"];

/// Builtin type keywords collected while reading specifiers.
#[derive(Debug, Default)]
struct BuiltinWords {
    unsigned: bool,
    signed: bool,
    short: bool,
    longs: u8,
    base: Option<&'static str>,
    seen: bool,
}

impl BuiltinWords {
    fn add(&mut self, word: &str) {
        self.seen = true;
        match word {
            "unsigned" => self.unsigned = true,
            "signed" | "__signed" | "__signed__" => self.signed = true,
            "short" => self.short = true,
            "long" => self.longs += 1,
            "void" => self.base = Some("void"),
            "char" => self.base = Some("char"),
            "float" => self.base = Some("float"),
            "double" => self.base = Some("double"),
            "_Bool" | "bool" => self.base = Some("_Bool"),
            "__int128" => self.base = Some("__int128"),
            _ => {}
        }
    }

    fn resolve(&self) -> Type {
        let sign = if self.unsigned { "unsigned " } else { "" };
        match self.base {
            Some("void") => Type::void(),
            Some("_Bool") => Type::basic("_Bool", 8, 8),
            Some("char") => {
                let name = match (self.unsigned, self.signed) {
                    (true, _) => "unsigned char",
                    (false, true) => "signed char",
                    _ => "char",
                };
                Type::basic(name, 8, 8)
            }
            Some("float") => Type::basic("float", 32, 32),
            Some("double") if self.longs > 0 => Type::basic("long double", 128, 128),
            Some("double") => Type::basic("double", 64, 64),
            Some(_) => Type::basic(format!("{sign}__int128"), 128, 128),
            None if self.short => Type::basic(format!("{sign}short"), 16, 16),
            None if self.longs >= 2 => Type::basic(format!("{sign}long long"), 64, 64),
            None if self.longs == 1 => Type::basic(format!("{sign}long"), 64, 64),
            None => Type::basic(format!("{sign}int"), 32, 32),
        }
    }
}

/// A struct, union or enum named in the specifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpec {
    pub kind: TagKind,
    pub name: String,
    /// The specifiers carried a `{ ... }` body.
    pub defined: bool,
}

/// Everything before the first declarator.
#[derive(Debug, Clone)]
pub struct Specifiers {
    pub base: Type,
    pub is_typedef: bool,
    pub is_extern: bool,
    pub is_static: bool,
    pub is_inline: bool,
    pub is_const: bool,
    pub tag: Option<TagSpec>,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone)]
enum Suffix {
    Array(Option<u64>),
    Function(Vec<Param>, bool),
}

/// One declarator: a name wrapped in pointer, array and function operators.
#[derive(Debug, Clone, Default)]
pub struct Declarator {
    name: Option<String>,
    pointers: usize,
    suffixes: Vec<Suffix>,
    inner: Option<Box<Declarator>>,
    pub bit_width: Option<u32>,
    pub initializer: Option<String>,
}

/// What a declarator makes of its specifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declared {
    Object(Type),
    Function {
        return_type: Type,
        params: Vec<Param>,
        is_variadic: bool,
    },
}

impl Declared {
    /// The type, with a bare function turned into a pointer to it.
    pub fn into_type(self) -> Type {
        match self {
            Declared::Object(ty) => ty,
            Declared::Function {
                return_type,
                params,
                is_variadic,
            } => Type::FunctionPointer {
                return_type: Box::new(return_type),
                params: params.into_iter().map(|p| p.ty).collect(),
                is_variadic,
            },
        }
    }

    fn pointer(self) -> Self {
        match self {
            Declared::Object(ty) => Declared::Object(Type::pointer(ty)),
            function => Declared::Object(function.into_type()),
        }
    }
}

impl Declarator {
    /// The declared name, if the declarator is not abstract.
    pub fn name(&self) -> Option<&str> {
        match &self.inner {
            Some(inner) => inner.name(),
            None => self.name.as_deref(),
        }
    }

    /// Apply this declarator's operators to `base`.
    pub fn build(&self, base: Type) -> Declared {
        self.apply(Declared::Object(base))
    }

    fn apply(&self, mut declared: Declared) -> Declared {
        for _ in 0..self.pointers {
            declared = declared.pointer();
        }
        for suffix in self.suffixes.iter().rev() {
            declared = match suffix {
                Suffix::Array(size) => Declared::Object(Type::array(declared.into_type(), *size)),
                Suffix::Function(params, is_variadic) => Declared::Function {
                    return_type: declared.into_type(),
                    params: params.clone(),
                    is_variadic: *is_variadic,
                },
            };
        }
        match &self.inner {
            Some(inner) => inner.apply(declared),
            None => declared,
        }
    }
}

/// Cursor over the tokens of one declaration.
#[derive(Clone)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_at(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    pub fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn rest(&self) -> &'a [Token] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    pub fn eat_punct(&mut self, c: char) -> bool {
        if self.peek().is_some_and(|t| t.is_punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a bracketed group starting at the cursor and return what is
    /// inside it.
    pub fn group(&mut self) -> Option<&'a [Token]> {
        let (open, close) = match self.peek()? {
            Token::Punct('(') => ('(', ')'),
            Token::Punct('[') => ('[', ']'),
            Token::Punct('{') => ('{', '}'),
            Token::Punct('<') => ('<', '>'),
            _ => return None,
        };
        let start = self.pos + 1;
        let mut depth = 0usize;
        while let Some(token) = self.bump() {
            if token.is_punct(open) {
                depth += 1;
            } else if token.is_punct(close) {
                depth -= 1;
                if depth == 0 {
                    return Some(&self.tokens[start..self.pos - 1]);
                }
            }
        }
        None
    }

    /// Skip `__attribute__((...))` and friends.
    fn skip_attribute(&mut self) -> bool {
        match self.peek() {
            Some(Token::Ident(word)) if ATTRIBUTES.contains(&word.as_str()) => {
                self.pos += 1;
                if self.peek().is_some_and(|t| t.is_punct('(')) {
                    self.group();
                }
                true
            }
            _ => false,
        }
    }

    /// Read declaration specifiers.
    ///
    /// Returns `None` when no type can be found.
    pub fn parse_specifiers(&mut self, ctx: &mut dyn TypeContext) -> Option<Specifiers> {
        let mut spec = Specifiers {
            base: Type::int(),
            is_typedef: false,
            is_extern: false,
            is_static: false,
            is_inline: false,
            is_const: false,
            tag: None,
        };
        let mut words = BuiltinWords::default();
        let mut named: Option<Type> = None;
        // The named type is an unexpanded macro rather than a real type.
        let mut named_is_guess = false;

        while let Some(token) = self.peek() {
            if self.skip_attribute() {
                continue;
            }
            let Token::Ident(word) = token else { break };
            let word = word.as_str();

            match word {
                "typedef" => spec.is_typedef = true,
                "extern" => spec.is_extern = true,
                "static" => spec.is_static = true,
                "inline" | "__inline" | "__inline__" | "__forceinline" => spec.is_inline = true,
                "const" | "__const" => spec.is_const = true,
                w if QUALIFIERS.contains(&w) => {}
                w if OBJC_ARG_QUALIFIERS.contains(&w) && named.is_none() && !words.seen => {}
                "struct" | "union" | "enum" if (named.is_none() || named_is_guess) && !words.seen => {
                    self.pos += 1;
                    let (ty, tag) = self.parse_tag(word, ctx)?;
                    named = Some(ty);
                    named_is_guess = false;
                    spec.tag = Some(tag);
                    continue;
                }
                w if BUILTIN_WORDS.contains(&w) => {
                    if named_is_guess {
                        named = None;
                        named_is_guess = false;
                    }
                    if named.is_some() {
                        break;
                    }
                    words.add(w);
                }
                _ => {
                    let follows_name = self.peek_at(1).is_some_and(|t| t.ident().is_some());
                    if named.is_some() || words.seen {
                        if !(named_is_guess && follows_name) {
                            break;
                        }
                    }
                    let (ty, known) = self.named_type(word, ctx);
                    named = Some(ty);
                    named_is_guess = !known;
                    self.pos += 1;
                    // `id<NSCopying>`
                    if self.peek().is_some_and(|t| t.is_punct('<')) {
                        self.group()?;
                    }
                    continue;
                }
            }
            self.pos += 1;
        }

        spec.base = match named {
            Some(ty) => ty,
            None if words.seen => words.resolve(),
            None => return None,
        };
        Some(spec)
    }

    fn named_type(&self, word: &str, ctx: &dyn TypeContext) -> (Type, bool) {
        if let Some((_, bits)) = STD_TYPEDEFS.iter().find(|(name, _)| *name == word) {
            return (Type::basic(word, *bits, *bits), true);
        }
        if OBJC_TYPES.contains(&word) {
            return (Type::simple(word), true);
        }
        (Type::simple(ctx.type_name(word)), ctx.is_typedef(word))
    }

    /// Parse the rest of a `struct`, `union` or `enum` specifier.
    fn parse_tag(&mut self, keyword: &str, ctx: &mut dyn TypeContext) -> Option<(Type, TagSpec)> {
        while self.skip_attribute() {}

        let name = match self.peek() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                name.clone()
            }
            _ => String::new(),
        };
        // `enum E : unsigned int { ... }`
        if keyword == "enum" && self.eat_punct(':') {
            while self.peek().is_some_and(|t| t.ident().is_some()) {
                self.pos += 1;
            }
        }
        while self.skip_attribute() {}

        let kind = match keyword {
            "union" => TagKind::Union,
            "enum" => TagKind::Enum,
            _ => TagKind::Struct,
        };

        if !self.peek().is_some_and(|t| t.is_punct('{')) {
            if name.is_empty() {
                return None;
            }
            let ty = ctx.tag_type(kind, &name);
            return Some((ty, TagSpec { kind, name, defined: false }));
        }

        let body = self.group()?;
        let ty = match kind {
            TagKind::Enum => {
                let values = parse_enum_body(body, ctx);
                ctx.define_enum(&name, values)
            }
            _ => {
                let fields = parse_fields(body, ctx);
                ctx.define_record(&name, kind == TagKind::Union, fields)
            }
        };
        Some((ty, TagSpec { kind, name, defined: true }))
    }

    /// Read one declarator, abstract or named.
    pub fn parse_declarator(&mut self, ctx: &mut dyn TypeContext) -> Option<Declarator> {
        let mut d = Declarator::default();

        loop {
            match self.peek() {
                Some(Token::Punct('*' | '^')) => d.pointers += 1,
                Some(Token::Ident(w)) if QUALIFIERS.contains(&w.as_str()) => {}
                _ if self.skip_attribute() => continue,
                _ => break,
            }
            self.pos += 1;
        }

        match self.peek() {
            Some(Token::Ident(name)) => {
                d.name = Some(name.clone());
                self.pos += 1;
            }
            Some(Token::Punct('('))
                if self
                    .peek_at(1)
                    .is_some_and(|t| t.is_punct('*') || t.is_punct('^')) =>
            {
                self.pos += 1;
                let inner = self.parse_declarator(ctx)?;
                if !self.eat_punct(')') {
                    return None;
                }
                d.inner = Some(Box::new(inner));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some(Token::Punct('[')) => {
                    let inside = self.group()?;
                    let size = if inside.is_empty() {
                        None
                    } else {
                        eval_expr(inside, &|n: &str| ctx.constant(n))
                            .and_then(|v| u64::try_from(v).ok())
                    };
                    d.suffixes.push(Suffix::Array(size));
                }
                Some(Token::Punct('(')) => {
                    self.pos += 1;
                    let (params, variadic) = self.parse_params(ctx)?;
                    d.suffixes.push(Suffix::Function(params, variadic));
                }
                _ if self.skip_attribute() => {}
                _ => break,
            }
        }

        // Trailing availability macros: `void f(void) API_AVAILABLE(macos(10.9));`
        while let Some(Token::Ident(_)) = self.peek() {
            self.pos += 1;
            if self.peek().is_some_and(|t| t.is_punct('(')) {
                self.group()?;
            }
        }

        if self.eat_punct(':') {
            let expr = self.until_separator();
            d.bit_width =
                eval_expr(expr, &|n: &str| ctx.constant(n)).and_then(|v| u32::try_from(v).ok());
            if d.bit_width.is_none() {
                return None;
            }
        }
        if self.eat_punct('=') {
            d.initializer = Some(render_tokens(self.until_separator()));
        }

        Some(d)
    }

    /// Tokens up to the next top-level `,`, or to the end.
    fn until_separator(&mut self) -> &'a [Token] {
        let rest = self.rest();
        let part = split_top_level(rest, ',')[0];
        self.pos += part.len();
        part
    }

    /// Parameters after an opening `(`, through the closing `)`.
    fn parse_params(&mut self, ctx: &mut dyn TypeContext) -> Option<(Vec<Param>, bool)> {
        let mut params = Vec::new();
        let mut variadic = false;

        if self.eat_punct(')') {
            return Some((params, false));
        }
        if self.peek().is_some_and(|t| t.is_ident("void"))
            && self.peek_at(1).is_some_and(|t| t.is_punct(')'))
        {
            self.pos += 2;
            return Some((params, false));
        }

        loop {
            if self.peek() == Some(&Token::Ellipsis) {
                self.pos += 1;
                variadic = true;
            } else {
                let spec = self.parse_specifiers(ctx)?;
                let d = self.parse_declarator(ctx)?;
                let name = d.name().unwrap_or_default().to_string();
                let ty = d.build(spec.base).into_type();
                params.push(Param { name, ty });
            }
            if self.eat_punct(',') {
                continue;
            }
            if self.eat_punct(')') {
                return Some((params, variadic));
            }
            return None;
        }
    }

    /// Specifiers and an abstract declarator, as in a cast or method type.
    pub fn parse_type_name(&mut self, ctx: &mut dyn TypeContext) -> Option<Type> {
        let spec = self.parse_specifiers(ctx)?;
        let d = self.parse_declarator(ctx)?;
        Some(d.build(spec.base).into_type())
    }
}

/// Members of a struct or union body.
///
/// Members that cannot be read are skipped.
pub fn parse_fields(body: &[Token], ctx: &mut dyn TypeContext) -> Vec<Field> {
    let mut fields = Vec::new();

    for member in split_top_level(body, ';') {
        if member.is_empty() {
            continue;
        }
        let mut p = Parser::new(member);
        let Some(spec) = p.parse_specifiers(ctx) else {
            continue;
        };

        if p.at_end() {
            // Anonymous struct or union member.
            if spec.tag.as_ref().is_some_and(|t| t.defined) {
                fields.push(Field {
                    name: String::new(),
                    ty: spec.base,
                });
            }
            continue;
        }

        loop {
            let Some(d) = p.parse_declarator(ctx) else { break };
            let ty = d.build(spec.base.clone()).into_type();
            let ty = match d.bit_width {
                Some(width) => Type::Bitfield {
                    base: Box::new(ty),
                    width,
                },
                None => ty,
            };
            fields.push(Field {
                name: d.name().unwrap_or_default().to_string(),
                ty,
            });
            if !p.eat_punct(',') {
                break;
            }
        }
    }

    fields
}

/// Enumerators with their values.
///
/// An enumerator without an initializer, or whose initializer cannot be
/// evaluated, takes the previous value plus one.
pub fn parse_enum_body(body: &[Token], ctx: &dyn TypeContext) -> Vec<(String, i64)> {
    let mut values: Vec<(String, i64)> = Vec::new();
    let mut next = 0i64;

    for item in split_top_level(body, ',') {
        let Some(Token::Ident(name)) = item.first() else {
            continue;
        };
        let value = match item.iter().position(|t| t.is_punct('=')) {
            Some(eq) => {
                let lookup = |n: &str| {
                    values
                        .iter()
                        .rev()
                        .find(|(v, _)| v == n)
                        .map(|(_, value)| *value)
                        .or_else(|| ctx.constant(n))
                };
                eval_expr(&item[eq + 1..], &lookup).unwrap_or(next)
            }
            None => next,
        };
        values.push((name.clone(), value));
        next = value.wrapping_add(1);
    }

    values
}

/// A reference to a tag that has not been defined anywhere yet.
pub fn unresolved_tag(kind: TagKind, name: &str) -> Type {
    match kind {
        TagKind::Enum => Type::Enum {
            name: name.to_string(),
            id: DeclId::UNASSIGNED,
        },
        other => Type::record(name, other == TagKind::Union),
    }
}
