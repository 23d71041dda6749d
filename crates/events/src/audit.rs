//! Audit trail contract.
//!
//! The ledger engine calls [`AuditSink::record`] once per committed state
//! change, with before/after snapshots of the touched entity. Persisting the
//! trail is the sink's business; the engine never reads it back.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use stockbook_core::UserId;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ProductRegistered,
    CustomerRegistered,
    CustomerDeactivated,
    SupplierRegistered,
    SupplierDeactivated,
    ShipmentCreated,
    ShipmentItemAdded,
    ShipmentClosed,
    ShipmentSettled,
    ShipmentUnsettled,
    WastageRecorded,
    InvoiceCreated,
    InvoiceCancelled,
    ReturnCreated,
    ReturnCancelled,
    CollectionCreated,
    CollectionCancelled,
    ExpenseCreated,
    ExpenseCancelled,
    TransferCreated,
    DayOpened,
    DayClosed,
    DayForceClosed,
    DayReopened,
}

impl AuditAction {
    /// Entity kind the action applies to.
    pub fn entity(self) -> &'static str {
        use AuditAction::*;
        match self {
            ProductRegistered => "product",
            CustomerRegistered | CustomerDeactivated => "customer",
            SupplierRegistered | SupplierDeactivated => "supplier",
            ShipmentCreated | ShipmentItemAdded | ShipmentClosed | ShipmentSettled
            | ShipmentUnsettled => "shipment",
            WastageRecorded => "shipment_item",
            InvoiceCreated | InvoiceCancelled => "invoice",
            ReturnCreated | ReturnCancelled => "sales_return",
            CollectionCreated | CollectionCancelled => "collection",
            ExpenseCreated | ExpenseCancelled => "expense",
            TransferCreated => "transfer",
            DayOpened | DayClosed | DayForceClosed | DayReopened => "working_day",
        }
    }

    /// Stable event name, as written to the audit log.
    pub fn event_type(self) -> &'static str {
        use AuditAction::*;
        match self {
            ProductRegistered => "ledger.product.registered",
            CustomerRegistered => "ledger.customer.registered",
            CustomerDeactivated => "ledger.customer.deactivated",
            SupplierRegistered => "ledger.supplier.registered",
            SupplierDeactivated => "ledger.supplier.deactivated",
            ShipmentCreated => "ledger.shipment.created",
            ShipmentItemAdded => "ledger.shipment.item_added",
            ShipmentClosed => "ledger.shipment.closed",
            ShipmentSettled => "ledger.shipment.settled",
            ShipmentUnsettled => "ledger.shipment.unsettled",
            WastageRecorded => "ledger.shipment_item.wastage_recorded",
            InvoiceCreated => "ledger.invoice.created",
            InvoiceCancelled => "ledger.invoice.cancelled",
            ReturnCreated => "ledger.sales_return.created",
            ReturnCancelled => "ledger.sales_return.cancelled",
            CollectionCreated => "ledger.collection.created",
            CollectionCancelled => "ledger.collection.cancelled",
            ExpenseCreated => "ledger.expense.created",
            ExpenseCancelled => "ledger.expense.cancelled",
            TransferCreated => "ledger.transfer.created",
            DayOpened => "ledger.working_day.opened",
            DayClosed => "ledger.working_day.closed",
            DayForceClosed => "ledger.working_day.force_closed",
            DayReopened => "ledger.working_day.reopened",
        }
    }
}

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event_id: Uuid,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: String,
    pub actor: UserId,
    pub before: Option<JsonValue>,
    pub after: Option<JsonValue>,
    /// Free-text justification (mandatory for privileged actions such as force close).
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        action: AuditAction,
        entity_id: impl ToString,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            action,
            entity: action.entity().to_string(),
            entity_id: entity_id.to_string(),
            actor,
            before: None,
            after: None,
            reason: None,
            occurred_at,
        }
    }

    /// Attach a snapshot of the entity before the change.
    pub fn with_before<T: Serialize>(mut self, before: &T) -> Self {
        self.before = serde_json::to_value(before).ok();
        self
    }

    /// Attach a snapshot of the entity after the change.
    pub fn with_after<T: Serialize>(mut self, after: &T) -> Self {
        self.after = serde_json::to_value(after).ok();
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Receives audit records after each committed state change.
///
/// Recording is fire-and-forget from the engine's point of view: the change
/// is already committed, so a sink failure must not be reported as an
/// operation failure. Sinks log their own problems.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

impl<S> AuditSink for Arc<S>
where
    S: AuditSink + ?Sized,
{
    fn record(&self, record: AuditRecord) {
        (**self).record(record)
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _record: AuditRecord) {}
}

/// Keeps records in memory, in commit order.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn actions(&self) -> Vec<AuditAction> {
        self.records().into_iter().map(|r| r.action).collect()
    }

    pub fn last(&self) -> Option<AuditRecord> {
        self.records.lock().ok().and_then(|r| r.last().cloned())
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, record: AuditRecord) {
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(_) => tracing::error!(action = ?record.action, "audit log lock poisoned; record dropped"),
        }
    }
}
