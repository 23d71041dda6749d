//! Invoice issuance: fan allocation plans out into invoice items.
//!
//! A single request line ("10 cartons of X") becomes one [`InvoiceItem`] per
//! lot the allocator drew from. The draft only assembles the invoice; it does
//! not touch lots or balances.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{
    CustomerId, DomainResult, InvoiceId, InvoiceItemId, LedgerError, Money, ProductId, UserId,
};
use stockbook_inventory::LotAllocation;

use crate::invoice::{Invoice, InvoiceItem};

/// One requested invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineRequest {
    pub product_id: ProductId,
    pub cartons: i64,
    /// Price per carton.
    pub unit_price: Money,
    /// Total weight in grams; derived from the lots when absent.
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl InvoiceLineRequest {
    pub fn new(product_id: ProductId, cartons: i64, unit_price: Money) -> Self {
        Self {
            product_id,
            cartons,
            unit_price,
            quantity: None,
        }
    }

    pub fn with_quantity(mut self, grams: i64) -> Self {
        self.quantity = Some(grams);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.cartons <= 0 {
            return Err(LedgerError::validation("line cartons must be positive"));
        }
        if self.unit_price.is_negative() {
            return Err(LedgerError::validation("unit price cannot be negative"));
        }
        if matches!(self.quantity, Some(q) if q < 0) {
            return Err(LedgerError::validation("line quantity cannot be negative"));
        }
        Ok(())
    }
}

/// Invoice under construction.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    id: InvoiceId,
    number: String,
    customer_id: CustomerId,
    date: NaiveDate,
    discount: Money,
    subtotal: Money,
    items: Vec<InvoiceItem>,
}

impl InvoiceDraft {
    pub fn new(
        id: InvoiceId,
        number: impl Into<String>,
        customer_id: CustomerId,
        date: NaiveDate,
        discount: Money,
    ) -> Self {
        Self {
            id,
            number: number.into(),
            customer_id,
            date,
            discount,
            subtotal: Money::ZERO,
            items: Vec::new(),
        }
    }

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Append the items produced by allocating `request` over `plan`.
    pub fn add_line(
        &mut self,
        request: &InvoiceLineRequest,
        plan: &[LotAllocation],
    ) -> DomainResult<()> {
        request.validate()?;
        let planned: i64 = plan.iter().map(|a| a.cartons).sum();
        if planned != request.cartons {
            return Err(LedgerError::invariant(format!(
                "allocation covers {planned} cartons, line asked for {}",
                request.cartons
            )));
        }

        let weights = split_weight(request, plan);
        for (allocation, quantity) in plan.iter().zip(weights) {
            let subtotal = request.unit_price.times(allocation.cartons)?;
            self.subtotal = self.subtotal.checked_add(subtotal)?;
            self.items.push(InvoiceItem {
                id: InvoiceItemId::new(),
                invoice_id: self.id,
                product_id: request.product_id,
                shipment_id: allocation.shipment_id,
                shipment_item_id: allocation.shipment_item_id,
                cartons: allocation.cartons,
                quantity,
                unit_price: request.unit_price,
                subtotal,
                returned_cartons: 0,
            });
        }
        Ok(())
    }

    /// Apply the discount and produce the invoice.
    pub fn finish(self, created_by: UserId, created_at: DateTime<Utc>) -> DomainResult<Invoice> {
        if self.items.is_empty() {
            return Err(LedgerError::validation("invoice needs at least one line"));
        }
        Invoice::from_parts(
            self.id,
            self.number,
            self.customer_id,
            self.date,
            self.subtotal,
            self.discount,
            self.items,
            created_by,
            created_at,
        )
    }
}

/// Weight per allocated lot.
///
/// Without an explicit quantity each lot contributes `cartons * weight_per_unit`.
/// An explicit quantity is split pro rata by cartons, the last lot taking the
/// rounding remainder.
fn split_weight(request: &InvoiceLineRequest, plan: &[LotAllocation]) -> Vec<i64> {
    let Some(total) = request.quantity else {
        return plan
            .iter()
            .map(|a| a.cartons.saturating_mul(a.weight_per_unit))
            .collect();
    };

    let mut assigned = 0i64;
    let last = plan.len().saturating_sub(1);
    plan.iter()
        .enumerate()
        .map(|(idx, a)| {
            if idx == last {
                total - assigned
            } else {
                let share = ((total as i128) * (a.cartons as i128) / (request.cartons as i128)) as i64;
                assigned += share;
                share
            }
        })
        .collect()
}
