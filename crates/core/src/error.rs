//! Domain error model.
//!
//! Every business-rule violation the ledger can report lives here, each with
//! a stable machine-readable [`LedgerError::code`] and a human-readable
//! `Display` message. Infrastructure failures (persistence, lock poisoning)
//! are deliberately *not* part of this enum; they belong to the infra layer.

use chrono::NaiveDate;
use thiserror::Error;

use crate::id::InvoiceId;
use crate::money::Money;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, LedgerError>;

/// Ledger business error.
///
/// These represent invalid requests, never transient failures: callers must
/// not retry them automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient stock: requested {requested} cartons but only {available} available")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("discount {discount} exceeds invoice subtotal {subtotal}")]
    DiscountExceedsSubtotal { discount: Money, subtotal: Money },

    #[error("shipment is already settled")]
    AlreadySettled,

    #[error("cannot unsettle: stock carried over from this shipment has already been sold")]
    CannotUnsettleCarryoverSold,

    #[error("allocations total {allocated} exceeds collection amount {amount}")]
    AllocationExceedsCollection { allocated: Money, amount: Money },

    #[error("invoice {invoice_id} does not belong to the collection's customer")]
    InvoiceNotOwnedByCustomer { invoice_id: InvoiceId },

    #[error("already cancelled")]
    AlreadyCancelled,

    #[error("no open working day for {date}")]
    NoOpenWorkingDay { date: NaiveDate },

    #[error("working day {open_date} is still open")]
    AnotherDayOpen { open_date: NaiveDate },

    #[error("edit window of {window_days} days has expired")]
    EditWindowExpired { window_days: i64 },

    #[error("a cancelled record cannot be reactivated")]
    CannotReactivateCancelled,

    #[error("{entity} records cannot be deleted; cancel instead")]
    DeletionNotAllowed { entity: &'static str },

    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("invoice has collections allocated against it")]
    InvoiceHasPayments,

    #[error("lot belongs to a settled shipment")]
    LotSettled,

    #[error("a later settlement of this supplier chains from this one")]
    LaterShipmentSettled,

    #[error("working day is not closed")]
    DayNotClosed,

    #[error("cashbox difference {difference} exceeds tolerance {tolerance}")]
    CashboxMismatch { difference: Money, tolerance: Money },

    #[error("force close requires a reason")]
    ForceCloseReasonRequired,

    #[error("not authorized to {operation}")]
    Unauthorized { operation: String },

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant would be violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn unauthorized(operation: impl Into<String>) -> Self {
        Self::Unauthorized {
            operation: operation.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::DiscountExceedsSubtotal { .. } => "discount_exceeds_subtotal",
            Self::AlreadySettled => "already_settled",
            Self::CannotUnsettleCarryoverSold => "cannot_unsettle_carryover_sold",
            Self::AllocationExceedsCollection { .. } => "allocation_exceeds_collection",
            Self::InvoiceNotOwnedByCustomer { .. } => "invoice_not_owned_by_customer",
            Self::AlreadyCancelled => "already_cancelled",
            Self::NoOpenWorkingDay { .. } => "no_open_working_day",
            Self::AnotherDayOpen { .. } => "another_day_open",
            Self::EditWindowExpired { .. } => "edit_window_expired",
            Self::CannotReactivateCancelled => "cannot_reactivate_cancelled",
            Self::DeletionNotAllowed { .. } => "deletion_not_allowed",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::InvoiceHasPayments => "invoice_has_payments",
            Self::LotSettled => "lot_settled",
            Self::LaterShipmentSettled => "later_shipment_settled",
            Self::DayNotClosed => "day_not_closed",
            Self::CashboxMismatch { .. } => "cashbox_mismatch",
            Self::ForceCloseReasonRequired => "force_close_reason_required",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Validation(_) => "validation",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::NotFound { .. } => "not_found",
        }
    }
}
