//! Declaration nodes.
//!
//! The set of declaration kinds is closed: [`Decl`] is an enum over one struct
//! per kind, and every renderer implements an entry point for each of them
//! (see [`crate::output::OutputDriver`]). A declaration never changes kind
//! after construction.

use super::error::ModelError;
use super::fields::{Field, FieldList, FunctionList, HasFields, HasFunctions};
use super::ident::DeclId;
use super::types::Type;
use crate::output::OutputDriver;

/// State shared by every declaration kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclBase {
    name: String,
    location: Option<String>,
    id: DeclId,
}

impl DeclBase {
    pub fn new(name: impl Into<String>) -> Self {
        DeclBase {
            name: name.into(),
            location: None,
            id: DeclId::UNASSIGNED,
        }
    }

    /// Display name; empty for anonymous declarations.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Origin in the source, usually `file:line`.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Set the origin. A later call overwrites an earlier one.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = Some(location.into());
    }

    pub fn id(&self) -> DeclId {
        self.id
    }

    /// Assign the identity.
    ///
    /// Fails once an identity has been assigned; the stored value is then
    /// left untouched.
    pub fn set_id(&mut self, id: DeclId) -> Result<(), ModelError> {
        if self.id.is_assigned() {
            return Err(ModelError::IdAlreadyAssigned {
                name: self.name.clone(),
                current: self.id,
                attempted: id,
            });
        }
        self.id = id;
        Ok(())
    }
}

/// Forwards the `DeclBase` accessors as inherent methods of a variant.
macro_rules! decl_base_accessors {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $ty {
                pub fn base(&self) -> &DeclBase {
                    &self.base
                }

                pub fn name(&self) -> &str {
                    self.base.name()
                }

                pub fn location(&self) -> Option<&str> {
                    self.base.location()
                }

                pub fn set_location(&mut self, location: impl Into<String>) {
                    self.base.set_location(location);
                }

                pub fn id(&self) -> DeclId {
                    self.base.id()
                }

                pub fn set_id(&mut self, id: DeclId) -> Result<(), ModelError> {
                    self.base.set_id(id)
                }
            }

            impl From<$ty> for Decl {
                fn from(decl: $ty) -> Self {
                    Decl::$ty(decl)
                }
            }
        )*
    };
}

/// A declaration kind the producer does not model.
///
/// Stands in for the real declaration so the rest of the unit can still be
/// extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnhandledDecl {
    base: DeclBase,
    kind: String,
}

impl UnhandledDecl {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        UnhandledDecl {
            base: DeclBase::new(name),
            kind: kind.into(),
        }
    }

    /// The original kind of the declaration, for diagnostics.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// A declaration that names a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    base: DeclBase,
    ty: Type,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        TypeDecl {
            base: DeclBase::new(name),
            ty,
        }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

/// A variable or constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    base: DeclBase,
    ty: Type,
    value: String,
    is_extern: bool,
    is_string: bool,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        VarDecl {
            base: DeclBase::new(name),
            ty,
            value: String::new(),
            is_extern: false,
            is_string: false,
        }
    }

    /// Set the literal initializer text.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_extern(mut self, is_extern: bool) -> Self {
        self.is_extern = is_extern;
        self
    }

    pub fn with_string(mut self, is_string: bool) -> Self {
        self.is_string = is_string;
        self
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Literal initializer text, empty when there is none.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_extern(&self) -> bool {
        self.is_extern
    }

    /// Whether the value is a string literal.
    pub fn is_string(&self) -> bool {
        self.is_string
    }

    pub fn set_is_string(&mut self, is_string: bool) {
        self.is_string = is_string;
    }
}

/// A function, or an Objective-C method when owned by a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    base: DeclBase,
    return_type: Type,
    params: FieldList,
    is_variadic: bool,
    is_objc_method: bool,
    is_class_method: bool,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, return_type: Type, is_variadic: bool) -> Self {
        FunctionDecl {
            base: DeclBase::new(name),
            return_type,
            params: FieldList::new(),
            is_variadic,
            is_objc_method: false,
            is_class_method: false,
        }
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    /// Append a parameter.
    pub fn add_field(&mut self, name: impl Into<String>, ty: Type) {
        self.params.add_field(name, ty);
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[Field] {
        self.params.fields()
    }

    pub fn is_variadic(&self) -> bool {
        self.is_variadic
    }

    pub fn is_objc_method(&self) -> bool {
        self.is_objc_method
    }

    pub fn set_is_objc_method(&mut self, value: bool) {
        self.is_objc_method = value;
    }

    /// `+` methods, as opposed to instance (`-`) methods.
    pub fn is_class_method(&self) -> bool {
        self.is_class_method
    }

    pub fn set_is_class_method(&mut self, value: bool) {
        self.is_class_method = value;
    }
}

impl HasFields for FunctionDecl {
    fn field_list(&self) -> &FieldList {
        &self.params
    }
}

/// `typedef <type> <name>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefDecl {
    base: DeclBase,
    ty: Type,
}

impl TypedefDecl {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        TypedefDecl {
            base: DeclBase::new(name),
            ty,
        }
    }

    /// The aliased type.
    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

/// A struct or union definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDecl {
    base: DeclBase,
    is_union: bool,
    fields: FieldList,
    bit_size: u64,
    bit_alignment: u64,
}

impl RecordDecl {
    pub fn new(name: impl Into<String>, is_union: bool) -> Self {
        RecordDecl {
            base: DeclBase::new(name),
            is_union,
            fields: FieldList::new(),
            bit_size: 0,
            bit_alignment: 0,
        }
    }

    pub fn is_union(&self) -> bool {
        self.is_union
    }

    /// Append a member.
    pub fn add_field(&mut self, name: impl Into<String>, ty: Type) {
        self.fields.add_field(name, ty);
    }

    /// Size in bits as supplied by the producer; 0 until set.
    pub fn bit_size(&self) -> u64 {
        self.bit_size
    }

    pub fn set_bit_size(&mut self, size: u64) {
        self.bit_size = size;
    }

    /// Alignment in bits as supplied by the producer; 0 until set.
    pub fn bit_alignment(&self) -> u64 {
        self.bit_alignment
    }

    pub fn set_bit_alignment(&mut self, alignment: u64) {
        self.bit_alignment = alignment;
    }
}

impl HasFields for RecordDecl {
    fn field_list(&self) -> &FieldList {
        &self.fields
    }
}

/// An enumerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumField<'a> {
    pub name: &'a str,
    /// Raw 64-bit pattern of the value.
    pub value: u64,
}

impl EnumField<'_> {
    /// The value read back as a signed integer.
    pub fn signed_value(&self) -> i64 {
        self.value as i64
    }
}

/// An enum definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    base: DeclBase,
    values: Vec<(String, u64)>,
}

impl EnumDecl {
    pub fn new(name: impl Into<String>) -> Self {
        EnumDecl {
            base: DeclBase::new(name),
            values: Vec::new(),
        }
    }

    /// Append an enumerator with a raw 64-bit value.
    pub fn add_field(&mut self, name: impl Into<String>, value: u64) {
        self.values.push((name.into(), value));
    }

    /// Append an enumerator with a signed value.
    ///
    /// Negative values are stored as their two's-complement bit pattern, so
    /// `-1` is stored as `u64::MAX`.
    pub fn add_signed(&mut self, name: impl Into<String>, value: i64) {
        self.add_field(name, value as u64);
    }

    pub fn fields(&self) -> impl ExactSizeIterator<Item = EnumField<'_>> + '_ {
        self.values.iter().map(|(name, value)| EnumField {
            name: name.as_str(),
            value: *value,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InterfaceBody {
    Forward,
    Defined {
        ivars: FieldList,
        methods: FunctionList,
    },
}

static NO_FIELDS: FieldList = FieldList::new();
static NO_FUNCTIONS: FunctionList = FunctionList::new();

/// `@interface Name : Super <Protocols>` or `@class Name;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjCInterfaceDecl {
    base: DeclBase,
    superclass: Option<String>,
    protocols: Vec<String>,
    body: InterfaceBody,
}

impl ObjCInterfaceDecl {
    pub fn new(name: impl Into<String>, superclass: Option<String>, is_forward: bool) -> Self {
        let body = if is_forward {
            InterfaceBody::Forward
        } else {
            InterfaceBody::Defined {
                ivars: FieldList::new(),
                methods: FunctionList::new(),
            }
        };

        ObjCInterfaceDecl {
            base: DeclBase::new(name),
            superclass,
            protocols: Vec::new(),
            body,
        }
    }

    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    pub fn is_forward(&self) -> bool {
        matches!(self.body, InterfaceBody::Forward)
    }

    pub fn add_protocol(&mut self, protocol: impl Into<String>) {
        self.protocols.push(protocol.into());
    }

    /// Adopted protocols in declaration order.
    pub fn protocols(&self) -> &[String] {
        &self.protocols
    }

    /// Append an instance variable.
    pub fn add_field(&mut self, name: impl Into<String>, ty: Type) -> Result<(), ModelError> {
        match &mut self.body {
            InterfaceBody::Defined { ivars, .. } => {
                ivars.add_field(name, ty);
                Ok(())
            }
            InterfaceBody::Forward => Err(self.forward_error()),
        }
    }

    /// Append a method.
    pub fn add_function(&mut self, function: FunctionDecl) -> Result<(), ModelError> {
        match &mut self.body {
            InterfaceBody::Defined { methods, .. } => {
                methods.add_function(function);
                Ok(())
            }
            InterfaceBody::Forward => Err(self.forward_error()),
        }
    }

    fn forward_error(&self) -> ModelError {
        ModelError::ForwardDeclaration {
            name: self.base.name().to_string(),
        }
    }
}

impl HasFields for ObjCInterfaceDecl {
    fn field_list(&self) -> &FieldList {
        match &self.body {
            InterfaceBody::Defined { ivars, .. } => ivars,
            InterfaceBody::Forward => &NO_FIELDS,
        }
    }
}

impl HasFunctions for ObjCInterfaceDecl {
    fn function_list(&self) -> &FunctionList {
        match &self.body {
            InterfaceBody::Defined { methods, .. } => methods,
            InterfaceBody::Forward => &NO_FUNCTIONS,
        }
    }
}

/// `@interface Class (Category)`; the declaration name is the class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjCCategoryDecl {
    base: DeclBase,
    category: String,
    methods: FunctionList,
}

impl ObjCCategoryDecl {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        ObjCCategoryDecl {
            base: DeclBase::new(name),
            category: category.into(),
            methods: FunctionList::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn add_function(&mut self, function: FunctionDecl) {
        self.methods.add_function(function);
    }
}

impl HasFunctions for ObjCCategoryDecl {
    fn function_list(&self) -> &FunctionList {
        &self.methods
    }
}

/// `@protocol Name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjCProtocolDecl {
    base: DeclBase,
    methods: FunctionList,
}

impl ObjCProtocolDecl {
    pub fn new(name: impl Into<String>) -> Self {
        ObjCProtocolDecl {
            base: DeclBase::new(name),
            methods: FunctionList::new(),
        }
    }

    pub fn add_function(&mut self, function: FunctionDecl) {
        self.methods.add_function(function);
    }
}

impl HasFunctions for ObjCProtocolDecl {
    fn function_list(&self) -> &FunctionList {
        &self.methods
    }
}

/// Any declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    UnhandledDecl(UnhandledDecl),
    TypeDecl(TypeDecl),
    VarDecl(VarDecl),
    FunctionDecl(FunctionDecl),
    TypedefDecl(TypedefDecl),
    RecordDecl(RecordDecl),
    EnumDecl(EnumDecl),
    ObjCInterfaceDecl(ObjCInterfaceDecl),
    ObjCCategoryDecl(ObjCCategoryDecl),
    ObjCProtocolDecl(ObjCProtocolDecl),
}

decl_base_accessors!(
    UnhandledDecl,
    TypeDecl,
    VarDecl,
    FunctionDecl,
    TypedefDecl,
    RecordDecl,
    EnumDecl,
    ObjCInterfaceDecl,
    ObjCCategoryDecl,
    ObjCProtocolDecl,
);

impl Decl {
    pub fn base(&self) -> &DeclBase {
        match self {
            Decl::UnhandledDecl(d) => &d.base,
            Decl::TypeDecl(d) => &d.base,
            Decl::VarDecl(d) => &d.base,
            Decl::FunctionDecl(d) => &d.base,
            Decl::TypedefDecl(d) => &d.base,
            Decl::RecordDecl(d) => &d.base,
            Decl::EnumDecl(d) => &d.base,
            Decl::ObjCInterfaceDecl(d) => &d.base,
            Decl::ObjCCategoryDecl(d) => &d.base,
            Decl::ObjCProtocolDecl(d) => &d.base,
        }
    }

    fn base_mut(&mut self) -> &mut DeclBase {
        match self {
            Decl::UnhandledDecl(d) => &mut d.base,
            Decl::TypeDecl(d) => &mut d.base,
            Decl::VarDecl(d) => &mut d.base,
            Decl::FunctionDecl(d) => &mut d.base,
            Decl::TypedefDecl(d) => &mut d.base,
            Decl::RecordDecl(d) => &mut d.base,
            Decl::EnumDecl(d) => &mut d.base,
            Decl::ObjCInterfaceDecl(d) => &mut d.base,
            Decl::ObjCCategoryDecl(d) => &mut d.base,
            Decl::ObjCProtocolDecl(d) => &mut d.base,
        }
    }

    pub fn name(&self) -> &str {
        self.base().name()
    }

    pub fn location(&self) -> Option<&str> {
        self.base().location()
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.base_mut().set_location(location);
    }

    pub fn id(&self) -> DeclId {
        self.base().id()
    }

    pub fn set_id(&mut self, id: DeclId) -> Result<(), ModelError> {
        self.base_mut().set_id(id)
    }

    /// Short name of the declaration kind, for logs and summaries.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::UnhandledDecl(_) => "unhandled",
            Decl::TypeDecl(_) => "type",
            Decl::VarDecl(_) => "variable",
            Decl::FunctionDecl(_) => "function",
            Decl::TypedefDecl(_) => "typedef",
            Decl::RecordDecl(_) => "record",
            Decl::EnumDecl(_) => "enum",
            Decl::ObjCInterfaceDecl(_) => "objc-interface",
            Decl::ObjCCategoryDecl(_) => "objc-category",
            Decl::ObjCProtocolDecl(_) => "objc-protocol",
        }
    }

    /// The field list, for kinds that carry one.
    pub fn field_list(&self) -> Option<&FieldList> {
        match self {
            Decl::FunctionDecl(d) => Some(d.field_list()),
            Decl::RecordDecl(d) => Some(d.field_list()),
            Decl::ObjCInterfaceDecl(d) => Some(d.field_list()),
            _ => None,
        }
    }

    /// The function list, for kinds that carry one.
    pub fn function_list(&self) -> Option<&FunctionList> {
        match self {
            Decl::ObjCInterfaceDecl(d) => Some(d.function_list()),
            Decl::ObjCCategoryDecl(d) => Some(d.function_list()),
            Decl::ObjCProtocolDecl(d) => Some(d.function_list()),
            _ => None,
        }
    }

    /// Hand this declaration to the driver entry point for its kind.
    pub fn write(&self, od: &mut dyn OutputDriver) {
        match self {
            Decl::UnhandledDecl(d) => od.write_unhandled(d),
            Decl::TypeDecl(d) => od.write_type_decl(d),
            Decl::VarDecl(d) => od.write_var(d),
            Decl::FunctionDecl(d) => od.write_function(d),
            Decl::TypedefDecl(d) => od.write_typedef(d),
            Decl::RecordDecl(d) => od.write_record(d),
            Decl::EnumDecl(d) => od.write_enum(d),
            Decl::ObjCInterfaceDecl(d) => od.write_objc_interface(d),
            Decl::ObjCCategoryDecl(d) => od.write_objc_category(d),
            Decl::ObjCProtocolDecl(d) => od.write_objc_protocol(d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unhandled_keeps_name_and_kind() {
        let d = UnhandledDecl::new("ns", "Namespace");
        assert_eq!(d.name(), "ns");
        assert_eq!(d.kind(), "Namespace");

        let empty = UnhandledDecl::new("", "");
        assert_eq!(empty.name(), "");
        assert_eq!(empty.kind(), "");
    }

    #[test]
    fn test_location_absent_until_set_then_overwritten() {
        let mut d = TypedefDecl::new("size_t", Type::basic("unsigned long", 64, 64));
        assert_eq!(d.location(), None);

        d.set_location("stddef.h:12");
        assert_eq!(d.location(), Some("stddef.h:12"));

        d.set_location("stddef.h:14");
        assert_eq!(d.location(), Some("stddef.h:14"));
    }

    #[test]
    fn test_identity_assigned_once() {
        let mut d: Decl = RecordDecl::new("Point", false).into();
        assert_eq!(d.id(), DeclId::UNASSIGNED);

        d.set_id(DeclId(4)).unwrap();
        assert_eq!(d.id(), DeclId(4));
        assert_eq!(d.id(), DeclId(4));

        let err = d.set_id(DeclId(9)).unwrap_err();
        assert_eq!(
            err,
            ModelError::IdAlreadyAssigned {
                name: "Point".to_string(),
                current: DeclId(4),
                attempted: DeclId(9),
            }
        );
        assert_eq!(d.id(), DeclId(4));
    }

    #[test]
    fn test_record_bit_quantities() {
        let mut r = RecordDecl::new("big", false);
        assert_eq!(r.bit_size(), 0);
        assert_eq!(r.bit_alignment(), 0);

        for v in [1, 64, u32::MAX as u64 + 1, u64::MAX] {
            r.set_bit_size(v);
            r.set_bit_alignment(v);
            assert_eq!(r.bit_size(), v);
            assert_eq!(r.bit_alignment(), v);
        }
    }

    #[test]
    fn test_enum_negative_values_are_twos_complement() {
        let mut e = EnumDecl::new("sign");
        e.add_signed("NEG", -1);
        e.add_signed("MIN", i64::MIN);
        e.add_field("BIG", u64::MAX - 1);

        let fields: Vec<EnumField<'_>> = e.fields().collect();
        assert_eq!(fields[0].value, u64::MAX);
        assert_eq!(fields[0].signed_value(), -1);
        assert_eq!(fields[1].value, 1u64 << 63);
        assert_eq!(fields[1].signed_value(), i64::MIN);
        assert_eq!(fields[2].signed_value(), -2);
    }

    #[test]
    fn test_function_params_and_flags() {
        let mut f = FunctionDecl::new("printf", Type::int(), true);
        f.add_field("fmt", Type::pointer(Type::basic("char", 8, 8)));
        assert!(f.is_variadic());
        assert!(!f.is_objc_method());
        assert!(!f.is_class_method());

        f.set_is_objc_method(true);
        f.set_is_class_method(true);
        assert!(f.is_objc_method());
        assert!(f.is_class_method());
        assert_eq!(f.params().len(), 1);
        assert_eq!(f.params()[0].name, "fmt");
    }

    #[test]
    fn test_forward_interface_rejects_members() {
        let mut iface = ObjCInterfaceDecl::new("NSString", None, true);
        assert!(iface.is_forward());

        let err = iface.add_field("_len", Type::int()).unwrap_err();
        assert_eq!(
            err,
            ModelError::ForwardDeclaration {
                name: "NSString".to_string()
            }
        );
        assert!(iface
            .add_function(FunctionDecl::new("length", Type::int(), false))
            .is_err());

        assert!(iface.fields().is_empty());
        assert!(iface.functions().is_empty());
    }

    #[test]
    fn test_defined_interface_holds_members() {
        let mut iface = ObjCInterfaceDecl::new("Widget", Some("NSObject".to_string()), false);
        iface.add_protocol("NSCopying");
        iface.add_protocol("NSCoding");
        iface.add_field("_size", Type::int()).unwrap();
        iface
            .add_function(FunctionDecl::new("size", Type::int(), false))
            .unwrap();

        assert_eq!(iface.superclass(), Some("NSObject"));
        assert_eq!(iface.protocols(), &["NSCopying", "NSCoding"]);
        assert_eq!(iface.fields().len(), 1);
        assert_eq!(iface.functions()[0].name(), "size");
    }

    #[test]
    fn test_var_flags() {
        let v = VarDecl::new("VERSION", Type::pointer(Type::basic("char", 8, 8)))
            .with_value("\"1.0\"")
            .with_string(true);
        assert_eq!(v.value(), "\"1.0\"");
        assert!(v.is_string());
        assert!(!v.is_extern());

        let mut e = VarDecl::new("errno", Type::int()).with_extern(true);
        assert!(e.is_extern());
        assert_eq!(e.value(), "");
        e.set_is_string(true);
        assert!(e.is_string());
    }

    #[test]
    fn test_capability_lookup() {
        let record: Decl = RecordDecl::new("r", false).into();
        let category: Decl = ObjCCategoryDecl::new("NSString", "Extras").into();
        let typedef: Decl = TypedefDecl::new("t", Type::int()).into();

        assert!(record.field_list().is_some());
        assert!(record.function_list().is_none());
        assert!(category.function_list().is_some());
        assert!(category.field_list().is_none());
        assert!(typedef.field_list().is_none());
        assert_eq!(category.kind_name(), "objc-category");
    }
}
