//! Field and function list capabilities.
//!
//! Records, functions and Objective-C containers hold these lists as plain
//! members. Nothing about them depends on which declaration owns them.

use super::decl::FunctionDecl;
use super::types::Type;

/// A named member or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name (empty for unnamed parameters and padding)
    pub name: String,
    /// Field type
    pub ty: Type,
}

/// Ordered `(name, type)` pairs.
///
/// Order is kept exactly as appended and duplicate names are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList {
    fields: Vec<Field>,
}

impl FieldList {
    pub const fn new() -> Self {
        FieldList { fields: Vec::new() }
    }

    /// Append a field, taking ownership of its type.
    pub fn add_field(&mut self, name: impl Into<String>, ty: Type) {
        self.fields.push(Field {
            name: name.into(),
            ty,
        });
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Ordered, owned function declarations (methods of an ObjC container).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionList {
    functions: Vec<FunctionDecl>,
}

impl FunctionList {
    pub const fn new() -> Self {
        FunctionList {
            functions: Vec::new(),
        }
    }

    /// Append a function, taking ownership of it.
    pub fn add_function(&mut self, function: FunctionDecl) {
        self.functions.push(function);
    }

    pub fn functions(&self) -> &[FunctionDecl] {
        &self.functions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FunctionDecl> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl<'a> IntoIterator for &'a FunctionList {
    type Item = &'a FunctionDecl;
    type IntoIter = std::slice::Iter<'a, FunctionDecl>;

    fn into_iter(self) -> Self::IntoIter {
        self.functions.iter()
    }
}

/// Declarations that carry a field list.
pub trait HasFields {
    fn field_list(&self) -> &FieldList;

    /// The fields in declaration order.
    fn fields(&self) -> &[Field] {
        self.field_list().fields()
    }
}

/// Declarations that carry a function list.
pub trait HasFunctions {
    fn function_list(&self) -> &FunctionList;

    /// The functions in declaration order.
    fn functions(&self) -> &[FunctionDecl] {
        self.function_list().functions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_keep_insertion_order_and_duplicates() {
        let mut list = FieldList::new();
        list.add_field("b", Type::int());
        list.add_field("", Type::basic("char", 8, 8));
        list.add_field("a", Type::int());
        list.add_field("", Type::basic("char", 8, 8));

        let names: Vec<&str> = list.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b", "", "a", ""]);
        assert_eq!(list.len(), 4);
        assert_eq!(list.fields()[1].ty.name(), "char");
    }

    #[test]
    fn test_functions_keep_insertion_order() {
        let mut list = FunctionList::new();
        for name in ["init", "dealloc", "init"] {
            list.add_function(FunctionDecl::new(name, Type::void(), false));
        }

        let names: Vec<&str> = list.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["init", "dealloc", "init"]);
    }

    #[test]
    fn test_empty_lists() {
        assert!(FieldList::new().is_empty());
        assert!(FunctionList::default().is_empty());
    }
}
