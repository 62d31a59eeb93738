//! Type references.
//!
//! A `Type` describes the shape of a value as resolved by the producer. Each
//! one is owned by exactly one declaration, field or parameter and is dropped
//! with it; nothing in the model shares type nodes.

use std::fmt;

use super::ident::DeclId;

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Builtin scalar with a known ABI width.
    Basic {
        name: String,
        bit_size: u64,
        bit_alignment: u64,
    },

    /// A name with no known layout (typedef reference, `id`, unknown).
    Simple { name: String },

    /// Pointer to another type
    Pointer(Box<Type>),

    /// Array, `size` is `None` for `T x[]`
    Array { element: Box<Type>, size: Option<u64> },

    /// Bitfield member of a record
    Bitfield { base: Box<Type>, width: u32 },

    /// Reference to a struct or union declaration.
    Record {
        name: String,
        is_union: bool,
        id: DeclId,
    },

    /// Reference to an enum declaration.
    Enum { name: String, id: DeclId },

    /// Pointer to a function
    FunctionPointer {
        return_type: Box<Type>,
        params: Vec<Type>,
        is_variadic: bool,
    },
}

/// The discriminant of a [`Type`], for callers that only need its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Basic,
    Simple,
    Pointer,
    Array,
    Bitfield,
    Record,
    Enum,
    FunctionPointer,
}

impl Type {
    /// Create a builtin scalar.
    pub fn basic(name: impl Into<String>, bit_size: u64, bit_alignment: u64) -> Self {
        Type::Basic {
            name: name.into(),
            bit_size,
            bit_alignment,
        }
    }

    /// Create a named type without layout.
    pub fn simple(name: impl Into<String>) -> Self {
        Type::Simple { name: name.into() }
    }

    /// Create a pointer to `inner`.
    pub fn pointer(inner: Type) -> Self {
        Type::Pointer(Box::new(inner))
    }

    /// Create an array of `element`.
    pub fn array(element: Type, size: Option<u64>) -> Self {
        Type::Array {
            element: Box::new(element),
            size,
        }
    }

    /// Create a struct reference that has not been resolved to a declaration.
    pub fn record(name: impl Into<String>, is_union: bool) -> Self {
        Type::Record {
            name: name.into(),
            is_union,
            id: DeclId::UNASSIGNED,
        }
    }

    /// `void`
    pub fn void() -> Self {
        Type::basic("void", 0, 0)
    }

    /// `int` on an LP64 target.
    pub fn int() -> Self {
        Type::basic("int", 32, 32)
    }

    /// Display name of the type.
    ///
    /// Derived types are named after what they wrap, so a pointer to `char`
    /// is `char*` and an array of four `int` is `int[4]`.
    pub fn name(&self) -> String {
        match self {
            Type::Basic { name, .. } | Type::Simple { name } => name.clone(),
            Type::Pointer(inner) => format!("{}*", inner.name()),
            Type::Array { element, size } => match size {
                Some(n) => format!("{}[{}]", element.name(), n),
                None => format!("{}[]", element.name()),
            },
            Type::Bitfield { base, width } => format!("{}:{}", base.name(), width),
            Type::Record { name, is_union, .. } => {
                let keyword = if *is_union { "union" } else { "struct" };
                if name.is_empty() {
                    keyword.to_string()
                } else {
                    format!("{} {}", keyword, name)
                }
            }
            Type::Enum { name, .. } => {
                if name.is_empty() {
                    "enum".to_string()
                } else {
                    format!("enum {}", name)
                }
            }
            Type::FunctionPointer { .. } => "function-pointer".to_string(),
        }
    }

    /// The kind of this type.
    pub fn shape(&self) -> TypeShape {
        match self {
            Type::Basic { .. } => TypeShape::Basic,
            Type::Simple { .. } => TypeShape::Simple,
            Type::Pointer(_) => TypeShape::Pointer,
            Type::Array { .. } => TypeShape::Array,
            Type::Bitfield { .. } => TypeShape::Bitfield,
            Type::Record { .. } => TypeShape::Record,
            Type::Enum { .. } => TypeShape::Enum,
            Type::FunctionPointer { .. } => TypeShape::FunctionPointer,
        }
    }

    /// Check if this is a pointer type.
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_) | Type::FunctionPointer { .. })
    }

    /// Check if this is a void type.
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Basic { name, .. } if name == "void")
    }

    /// The declaration this type refers back to, if any.
    pub fn referenced_decl(&self) -> Option<DeclId> {
        match self {
            Type::Record { id, .. } | Type::Enum { id, .. } if id.is_assigned() => Some(*id),
            Type::Pointer(inner) => inner.referenced_decl(),
            Type::Array { element, .. } => element.referenced_decl(),
            Type::Bitfield { base, .. } => base.referenced_decl(),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Type::int().name(), "int");
        assert_eq!(Type::pointer(Type::basic("char", 8, 8)).name(), "char*");
        assert_eq!(Type::array(Type::int(), Some(4)).name(), "int[4]");
        assert_eq!(Type::array(Type::int(), None).name(), "int[]");
        assert_eq!(Type::record("Point", false).name(), "struct Point");
        assert_eq!(Type::record("", true).name(), "union");
    }

    #[test]
    fn test_type_shape() {
        assert_eq!(Type::int().shape(), TypeShape::Basic);
        assert_eq!(Type::simple("size_t").shape(), TypeShape::Simple);
        assert_eq!(Type::pointer(Type::void()).shape(), TypeShape::Pointer);
        assert_eq!(
            Type::Bitfield {
                base: Box::new(Type::int()),
                width: 3
            }
            .shape(),
            TypeShape::Bitfield
        );
        assert!(Type::pointer(Type::void()).is_pointer());
        assert!(Type::void().is_void());
        assert!(!Type::int().is_void());
    }

    #[test]
    fn test_referenced_decl_follows_wrappers() {
        let rec = Type::Record {
            name: "node".to_string(),
            is_union: false,
            id: DeclId(3),
        };
        assert_eq!(rec.referenced_decl(), Some(DeclId(3)));
        assert_eq!(Type::pointer(rec).referenced_decl(), Some(DeclId(3)));
        assert_eq!(Type::record("opaque", false).referenced_decl(), None);
        assert_eq!(Type::int().referenced_decl(), None);
    }
}
