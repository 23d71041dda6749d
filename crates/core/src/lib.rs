//! `stockbook-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, money, the business error model and lifecycle transition tables.

pub mod edit_window;
pub mod entity;
pub mod error;
pub mod id;
pub mod lifecycle;
pub mod money;
pub mod value_object;

pub use edit_window::EditWindow;
pub use entity::Entity;
pub use error::{DomainResult, LedgerError};
pub use id::{
    CarryoverId, CollectionId, CustomerId, ExpenseId, InvoiceId, InvoiceItemId, ProductId,
    ReturnId, ShipmentId, ShipmentItemId, SupplierId, TransferId, UserId, WastageId,
};
pub use lifecycle::Lifecycle;
pub use money::Money;
pub use value_object::ValueObject;
