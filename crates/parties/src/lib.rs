//! Parties domain module: customers and suppliers.
//!
//! Both carry a signed running balance that starts at the opening balance and
//! is only ever moved by the ledger operations that own it (issuing an
//! invoice, taking a collection, settling a shipment). There is no setter.

pub mod customer;
pub mod supplier;

pub use customer::Customer;
pub use supplier::Supplier;

use stockbook_core::{DomainResult, LedgerError};

/// Shared registration checks for customer and supplier codes/names.
pub(crate) fn validate_identity(code: &str, name: &str) -> DomainResult<()> {
    if code.trim().is_empty() {
        return Err(LedgerError::validation("code cannot be empty"));
    }
    if name.trim().is_empty() {
        return Err(LedgerError::validation("name cannot be empty"));
    }
    Ok(())
}
