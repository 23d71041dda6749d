use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{
    CustomerId, DomainResult, InvoiceId, InvoiceItemId, LedgerError, Lifecycle, Money, ProductId,
    ReturnId, ShipmentId, ShipmentItemId, UserId, impl_entity,
};

use crate::invoice::InvoiceItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    Active,
    Cancelled,
}

impl Lifecycle for ReturnStatus {
    const ENTITY: &'static str = "sales_return";

    fn name(self) -> &'static str {
        match self {
            ReturnStatus::Active => "active",
            ReturnStatus::Cancelled => "cancelled",
        }
    }

    fn allows(self, next: Self) -> bool {
        matches!((self, next), (ReturnStatus::Active, ReturnStatus::Cancelled))
    }

    fn rejection(self, next: Self) -> LedgerError {
        match (self, next) {
            (ReturnStatus::Cancelled, ReturnStatus::Cancelled) => LedgerError::AlreadyCancelled,
            (ReturnStatus::Cancelled, ReturnStatus::Active) => LedgerError::CannotReactivateCancelled,
            _ => LedgerError::InvalidTransition {
                entity: Self::ENTITY,
                from: self.name(),
                to: next.name(),
            },
        }
    }
}

/// Cartons of one invoice item handed back, priced at the invoiced unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLine {
    pub invoice_id: InvoiceId,
    pub invoice_item_id: InvoiceItemId,
    pub product_id: ProductId,
    pub shipment_id: ShipmentId,
    pub shipment_item_id: ShipmentItemId,
    pub cartons: i64,
    pub unit_price: Money,
    pub amount: Money,
}

impl ReturnLine {
    pub fn for_item(item: &InvoiceItem, cartons: i64) -> DomainResult<Self> {
        if cartons <= 0 {
            return Err(LedgerError::validation("returned cartons must be positive"));
        }
        Ok(Self {
            invoice_id: item.invoice_id,
            invoice_item_id: item.id,
            product_id: item.product_id,
            shipment_id: item.shipment_id,
            shipment_item_id: item.shipment_item_id,
            cartons,
            unit_price: item.unit_price,
            amount: item.unit_price.times(cartons)?,
        })
    }
}

/// A customer sales return. Credits the customer and puts stock back on the lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReturn {
    id: ReturnId,
    customer_id: CustomerId,
    date: NaiveDate,
    status: ReturnStatus,
    lines: Vec<ReturnLine>,
    total: Money,
    reason: Option<String>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl_entity!(SalesReturn, ReturnId);

impl SalesReturn {
    pub fn new(
        id: ReturnId,
        customer_id: CustomerId,
        date: NaiveDate,
        lines: Vec<ReturnLine>,
        reason: Option<String>,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(LedgerError::validation("a return needs at least one line"));
        }
        let total = Money::try_sum(lines.iter().map(|l| l.amount))?;
        Ok(Self {
            id,
            customer_id,
            date,
            status: ReturnStatus::Active,
            lines,
            total,
            reason,
            created_by,
            created_at,
            cancelled_at: None,
        })
    }

    pub fn id_typed(&self) -> ReturnId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn status(&self) -> ReturnStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ReturnStatus::Active
    }

    pub fn lines(&self) -> &[ReturnLine] {
        &self.lines
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn cancel(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        self.status = self.status.transition(ReturnStatus::Cancelled)?;
        self.cancelled_at = Some(at);
        Ok(())
    }
}
