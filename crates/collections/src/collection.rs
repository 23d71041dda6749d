use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_accounting::PaymentMethod;
use stockbook_core::{
    CollectionId, CustomerId, DomainResult, InvoiceId, LedgerError, Lifecycle, Money, UserId,
    impl_entity,
};

use crate::distributor::ManualAllocation;

/// Strategy used to spread a collection over the customer's open invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMethod {
    OldestFirst,
    NewestFirst,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Confirmed,
    Cancelled,
}

impl Lifecycle for CollectionStatus {
    const ENTITY: &'static str = "collection";

    fn name(self) -> &'static str {
        match self {
            CollectionStatus::Confirmed => "confirmed",
            CollectionStatus::Cancelled => "cancelled",
        }
    }

    fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (CollectionStatus::Confirmed, CollectionStatus::Cancelled)
        )
    }

    fn rejection(self, next: Self) -> LedgerError {
        match (self, next) {
            (CollectionStatus::Cancelled, CollectionStatus::Cancelled) => {
                LedgerError::AlreadyCancelled
            }
            (CollectionStatus::Cancelled, CollectionStatus::Confirmed) => {
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

/// Part of a collection applied to one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionAllocation {
    pub collection_id: CollectionId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
}

/// Collection request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCollection {
    pub customer_id: CustomerId,
    pub date: NaiveDate,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub distribution_method: DistributionMethod,
    /// Only read for [`DistributionMethod::Manual`].
    #[serde(default)]
    pub manual_plan: Vec<ManualAllocation>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A customer payment.
///
/// `allocated_amount + unallocated_amount == amount` at all times; the
/// unallocated part is credit held against the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    id: CollectionId,
    customer_id: CustomerId,
    date: NaiveDate,
    amount: Money,
    payment_method: PaymentMethod,
    distribution_method: DistributionMethod,
    status: CollectionStatus,
    allocated_amount: Money,
    unallocated_amount: Money,
    allocations: Vec<CollectionAllocation>,
    notes: Option<String>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    cancelled_by: Option<UserId>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl_entity!(Collection, CollectionId);

impl Collection {
    pub fn new(
        id: CollectionId,
        input: &NewCollection,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !input.amount.is_positive() {
            return Err(LedgerError::validation("collection amount must be positive"));
        }
        Ok(Self {
            id,
            customer_id: input.customer_id,
            date: input.date,
            amount: input.amount,
            payment_method: input.payment_method,
            distribution_method: input.distribution_method,
            status: CollectionStatus::Confirmed,
            allocated_amount: Money::ZERO,
            unallocated_amount: input.amount,
            allocations: Vec::new(),
            notes: input.notes.clone(),
            created_by,
            created_at,
            cancelled_by: None,
            cancelled_at: None,
        })
    }

    pub fn id_typed(&self) -> CollectionId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn distribution_method(&self) -> DistributionMethod {
        self.distribution_method
    }

    pub fn status(&self) -> CollectionStatus {
        self.status
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == CollectionStatus::Confirmed
    }

    pub fn allocated_amount(&self) -> Money {
        self.allocated_amount
    }

    pub fn unallocated_amount(&self) -> Money {
        self.unallocated_amount
    }

    pub fn allocations(&self) -> &[CollectionAllocation] {
        &self.allocations
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn cancelled_by(&self) -> Option<UserId> {
        self.cancelled_by
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    /// Attach the distribution result.
    pub fn record_allocations(&mut self, allocations: Vec<CollectionAllocation>) -> DomainResult<()> {
        if !self.is_confirmed() {
            return Err(LedgerError::validation("cannot allocate a cancelled collection"));
        }
        if allocations.iter().any(|a| a.collection_id != self.id) {
            return Err(LedgerError::invariant("allocation belongs to another collection"));
        }
        let all = self.allocations.iter().chain(allocations.iter()).map(|a| a.amount);
        let allocated = Money::try_sum(all)?;
        if allocated > self.amount {
            return Err(LedgerError::AllocationExceedsCollection {
                allocated,
                amount: self.amount,
            });
        }
        self.allocations.extend(allocations);
        self.allocated_amount = allocated;
        self.unallocated_amount = self.amount.checked_sub(allocated)?;
        Ok(())
    }

    /// Cancel, handing back the allocations that must be reversed on their
    /// invoices. The allocation rows are gone afterwards.
    pub fn cancel(
        &mut self,
        by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<Vec<CollectionAllocation>> {
        self.status = self.status.transition(CollectionStatus::Cancelled)?;
        self.cancelled_by = Some(by);
        self.cancelled_at = Some(at);
        self.allocated_amount = Money::ZERO;
        self.unallocated_amount = self.amount;
        Ok(std::mem::take(&mut self.allocations))
    }
}
