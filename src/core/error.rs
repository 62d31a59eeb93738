//! Errors raised by the declaration model.
//!
//! Construction and ordinary mutation never fail. The two mutations below are
//! the only ones the model refuses.

use thiserror::Error;

use super::ident::DeclId;

/// A mutation the declaration model rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// An identity was assigned to a declaration that already has one.
    #[error("declaration `{name}` already has identity {current}, refusing to reassign {attempted}")]
    IdAlreadyAssigned {
        name: String,
        current: DeclId,
        attempted: DeclId,
    },

    /// Members were added to a forward-declared Objective-C interface.
    #[error("`{name}` is a forward declaration and cannot hold members")]
    ForwardDeclaration { name: String },
}
