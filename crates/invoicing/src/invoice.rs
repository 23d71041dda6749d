use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{
    CustomerId, DomainResult, InvoiceId, InvoiceItemId, LedgerError, Lifecycle, Money, ProductId,
    ShipmentId, ShipmentItemId, UserId, impl_entity,
};

/// Invoice status lifecycle. `cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Active,
    Cancelled,
}

impl Lifecycle for InvoiceStatus {
    const ENTITY: &'static str = "invoice";

    fn name(self) -> &'static str {
        match self {
            InvoiceStatus::Active => "active",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    fn allows(self, next: Self) -> bool {
        matches!((self, next), (InvoiceStatus::Active, InvoiceStatus::Cancelled))
    }

    fn rejection(self, next: Self) -> LedgerError {
        match (self, next) {
            (InvoiceStatus::Cancelled, InvoiceStatus::Cancelled) => LedgerError::AlreadyCancelled,
            (InvoiceStatus::Cancelled, InvoiceStatus::Active) => {
                LedgerError::CannotReactivateCancelled
            }
            _ => LedgerError::InvalidTransition {
                entity: Self::ENTITY,
                from: self.name(),
                to: next.name(),
            },
        }
    }
}

/// One invoice line, bound to the exact lot it depleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub invoice_id: InvoiceId,
    pub product_id: ProductId,
    pub shipment_id: ShipmentId,
    pub shipment_item_id: ShipmentItemId,
    pub cartons: i64,
    /// Weight in grams.
    pub quantity: i64,
    /// Price per carton.
    pub unit_price: Money,
    pub subtotal: Money,
    /// Cartons taken back by active sales returns.
    pub returned_cartons: i64,
}

impl_entity!(InvoiceItem, InvoiceItemId);

impl InvoiceItem {
    pub fn returnable_cartons(&self) -> i64 {
        self.cartons - self.returned_cartons
    }
}

/// Customer invoice.
///
/// `total = subtotal - discount` and `balance = total - paid_amount` hold at
/// all times. Only collections move `paid_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    number: String,
    customer_id: CustomerId,
    date: NaiveDate,
    status: InvoiceStatus,
    subtotal: Money,
    discount: Money,
    total: Money,
    paid_amount: Money,
    balance: Money,
    items: Vec<InvoiceItem>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    cancelled_by: Option<UserId>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl_entity!(Invoice, InvoiceId);

impl Invoice {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: InvoiceId,
        number: String,
        customer_id: CustomerId,
        date: NaiveDate,
        subtotal: Money,
        discount: Money,
        items: Vec<InvoiceItem>,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if discount.is_negative() {
            return Err(LedgerError::validation("discount cannot be negative"));
        }
        if discount > subtotal {
            return Err(LedgerError::DiscountExceedsSubtotal { discount, subtotal });
        }
        let total = subtotal.checked_sub(discount)?;
        Ok(Self {
            id,
            number,
            customer_id,
            date,
            status: InvoiceStatus::Active,
            subtotal,
            discount,
            total,
            paid_amount: Money::ZERO,
            balance: total,
            items,
            created_by,
            created_at,
            cancelled_by: None,
            cancelled_at: None,
        })
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == InvoiceStatus::Active
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn paid_amount(&self) -> Money {
        self.paid_amount
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn items(&self) -> &[InvoiceItem] {
        &self.items
    }

    pub fn item(&self, item_id: InvoiceItemId) -> Option<&InvoiceItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn cancelled_by(&self) -> Option<UserId> {
        self.cancelled_by
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    /// Whether a collection may still be distributed onto this invoice.
    pub fn is_open(&self) -> bool {
        self.is_active() && self.balance.is_positive()
    }

    /// Apply `amount` of a collection.
    pub fn apply_payment(&mut self, amount: Money) -> DomainResult<()> {
        if !self.is_active() {
            return Err(LedgerError::validation(format!(
                "invoice {} is cancelled and cannot accept payments",
                self.number
            )));
        }
        if !amount.is_positive() {
            return Err(LedgerError::validation("payment amount must be positive"));
        }
        if amount > self.balance {
            return Err(LedgerError::validation(format!(
                "payment {amount} exceeds invoice {} balance {}",
                self.number, self.balance
            )));
        }
        self.paid_amount = self.paid_amount.checked_add(amount)?;
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }

    /// Take back `amount` previously applied by a collection.
    pub fn reverse_payment(&mut self, amount: Money) -> DomainResult<()> {
        if amount > self.paid_amount || amount.is_negative() {
            return Err(LedgerError::invariant(format!(
                "invoice {} cannot reverse {amount}, only {} paid",
                self.number, self.paid_amount
            )));
        }
        self.paid_amount = self.paid_amount.checked_sub(amount)?;
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    /// Cancel the invoice.
    ///
    /// Refused while collections are still allocated against it. Lot
    /// restoration and the customer balance are the caller's job.
    pub fn cancel(&mut self, by: UserId, at: DateTime<Utc>) -> DomainResult<()> {
        let next = self.status.transition(InvoiceStatus::Cancelled)?;
        if self.paid_amount.is_positive() {
            return Err(LedgerError::InvoiceHasPayments);
        }
        self.status = next;
        self.cancelled_by = Some(by);
        self.cancelled_at = Some(at);
        Ok(())
    }

    /// Cancelled invoices never come back.
    pub fn reactivate(&mut self) -> DomainResult<()> {
        self.status = self.status.transition(InvoiceStatus::Active)?;
        Ok(())
    }

    /// Mark `cartons` of an item as returned by the customer.
    pub fn record_return(&mut self, item_id: InvoiceItemId, cartons: i64) -> DomainResult<()> {
        if !self.is_active() {
            return Err(LedgerError::validation("cannot return items of a cancelled invoice"));
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| LedgerError::not_found("invoice item"))?;
        if cartons <= 0 {
            return Err(LedgerError::validation("returned cartons must be positive"));
        }
        if cartons > item.returnable_cartons() {
            return Err(LedgerError::validation(format!(
                "cannot return {cartons} cartons, only {} returnable",
                item.returnable_cartons()
            )));
        }
        item.returned_cartons += cartons;
        Ok(())
    }

    /// Undo a recorded return.
    pub fn revert_return(&mut self, item_id: InvoiceItemId, cartons: i64) -> DomainResult<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| LedgerError::not_found("invoice item"))?;
        if cartons > item.returned_cartons {
            return Err(LedgerError::invariant("reverting more cartons than were returned"));
        }
        item.returned_cartons -= cartons;
        Ok(())
    }
}
