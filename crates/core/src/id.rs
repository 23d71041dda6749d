//! Strongly-typed identifiers used across the domain.
//!
//! All identifiers wrap a UUIDv7, so ordering by id is ordering by creation
//! time. Collection distribution relies on this to break date ties.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| LedgerError::validation(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

uuid_newtype!(
    /// Identifier of a user (actor identity used for created_by/resolved_by stamping).
    UserId,
    "UserId"
);
uuid_newtype!(
    /// Identifier of a product (reference data).
    ProductId,
    "ProductId"
);
uuid_newtype!(
    /// Identifier of a supplier shipment.
    ShipmentId,
    "ShipmentId"
);
uuid_newtype!(
    /// Identifier of a lot (one product line within one shipment).
    ShipmentItemId,
    "ShipmentItemId"
);
uuid_newtype!(CarryoverId, "CarryoverId");
uuid_newtype!(CustomerId, "CustomerId");
uuid_newtype!(SupplierId, "SupplierId");
uuid_newtype!(InvoiceId, "InvoiceId");
uuid_newtype!(InvoiceItemId, "InvoiceItemId");
uuid_newtype!(
    /// Identifier of a customer payment.
    CollectionId,
    "CollectionId"
);
uuid_newtype!(ExpenseId, "ExpenseId");
uuid_newtype!(TransferId, "TransferId");
uuid_newtype!(
    /// Identifier of a customer sales return.
    ReturnId,
    "ReturnId"
);
uuid_newtype!(WastageId, "WastageId");
