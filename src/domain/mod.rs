//! Domain primitives for the contact book.
//!
//! Identifiers are newtypes so a `ContactId` can never be handed to a query
//! expecting an `AddressId`. The [`Principal`] is the authenticated user a
//! request acts on behalf of; it is passed explicitly into every service call.

pub mod patch;

pub use patch::Patch;

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Primary key of a row in `users`.
    UserId
);
entity_id!(
    /// Primary key of a row in `contacts`.
    ContactId
);
entity_id!(
    /// Primary key of a row in `addresses`.
    AddressId
);

/// The user resolved from a bearer token for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub username: String,
    pub name: String,
}

/// How a caller names an address.
///
/// REST routes always carry the parent contact in the path. The RPC surface
/// may only send the address id, in which case the parent is resolved from
/// the address row and then checked against the principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressLocator {
    Nested {
        contact_id: ContactId,
        address_id: AddressId,
    },
    Bare(AddressId),
}

impl AddressLocator {
    #[must_use]
    pub const fn nested(contact_id: ContactId, address_id: AddressId) -> Self {
        Self::Nested {
            contact_id,
            address_id,
        }
    }
}
