//! Shipment settlement: closing a shipment's accounting period.
//!
//! `final_balance = net_sales - commission - supplier_expenses + previous_balance`
//!
//! where `previous_balance` chains from the supplier's latest settled
//! shipment (or its opening balance). Everything here is a pure computation
//! over borrowed entities; the caller runs it inside one transaction.

pub mod carryover;
pub mod chain;
pub mod statement;

pub use carryover::{CarryoverMove, carry_over, plan_carryovers, revert_carryover};
pub use chain::{ensure_can_unsettle, previous_balance, validate_successor};
pub use statement::{
    SettlementStatement, StatementInput, gross_sales, returned_sales, supplier_expenses,
};
