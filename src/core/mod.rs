//! The declaration model.
//!
//! Producers build declarations bottom-up (types before the declarations that
//! use them, fields before the record that owns them) and push them into a
//! [`TranslationUnit`]; renderers then walk the unit read-only.

pub mod decl;
pub mod error;
pub mod fields;
pub mod ident;
pub mod types;
pub mod unit;

pub use decl::{
    Decl, DeclBase, EnumDecl, EnumField, FunctionDecl, ObjCCategoryDecl, ObjCInterfaceDecl,
    ObjCProtocolDecl, RecordDecl, TypeDecl, TypedefDecl, UnhandledDecl, VarDecl,
};
pub use error::ModelError;
pub use fields::{Field, FieldList, FunctionList, HasFields, HasFunctions};
pub use ident::{DeclId, IdAllocator};
pub use types::{Type, TypeShape};
pub use unit::{TagKind, TranslationUnit};
