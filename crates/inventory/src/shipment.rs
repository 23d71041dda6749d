use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{
    DomainResult, LedgerError, Lifecycle, Money, ShipmentId, SupplierId, UserId, impl_entity,
};

/// Shipment lifecycle.
///
/// `open -> closed -> settled` is the normal path; an open shipment may also
/// be settled directly. Unsettling is the single backward edge and lands on
/// `closed`, never on `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentStatus {
    Open,
    Closed,
    Settled,
}

impl Lifecycle for ShipmentStatus {
    const ENTITY: &'static str = "shipment";

    fn name(self) -> &'static str {
        match self {
            ShipmentStatus::Open => "open",
            ShipmentStatus::Closed => "closed",
            ShipmentStatus::Settled => "settled",
        }
    }

    fn allows(self, next: Self) -> bool {
        use ShipmentStatus::*;
        matches!(
            (self, next),
            (Open, Closed) | (Open, Settled) | (Closed, Settled) | (Settled, Closed)
        )
    }

    fn rejection(self, next: Self) -> LedgerError {
        if self == ShipmentStatus::Settled && next == ShipmentStatus::Settled {
            return LedgerError::AlreadySettled;
        }
        LedgerError::InvalidTransition {
            entity: Self::ENTITY,
            from: self.name(),
            to: next.name(),
        }
    }
}

/// A supplier shipment: the parent of a set of lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    id: ShipmentId,
    supplier_id: SupplierId,
    number: String,
    date: NaiveDate,
    fifo_sequence: u64,
    status: ShipmentStatus,
    total_cost: Money,
    settled_at: Option<DateTime<Utc>>,
    /// Position in the store-wide order settlements were made in.
    settlement_sequence: Option<u64>,
    final_supplier_balance: Option<Money>,
    created_by: UserId,
}

impl_entity!(Shipment, ShipmentId);

impl Shipment {
    /// Create a new open shipment.
    ///
    /// `fifo_sequence` must come from a monotonically increasing counter owned
    /// by the store; it, not `date`, defines allocation precedence.
    pub fn new(
        id: ShipmentId,
        supplier_id: SupplierId,
        date: NaiveDate,
        fifo_sequence: u64,
        created_by: UserId,
    ) -> DomainResult<Self> {
        if fifo_sequence == 0 {
            return Err(LedgerError::invariant("fifo_sequence starts at 1"));
        }
        Ok(Self {
            id,
            supplier_id,
            number: format!("SH-{fifo_sequence:06}"),
            date,
            fifo_sequence,
            status: ShipmentStatus::Open,
            total_cost: Money::ZERO,
            settled_at: None,
            settlement_sequence: None,
            final_supplier_balance: None,
            created_by,
        })
    }

    pub fn id_typed(&self) -> ShipmentId {
        self.id
    }

    pub fn supplier_id(&self) -> SupplierId {
        self.supplier_id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn fifo_sequence(&self) -> u64 {
        self.fifo_sequence
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn total_cost(&self) -> Money {
        self.total_cost
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }

    pub fn settlement_sequence(&self) -> Option<u64> {
        self.settlement_sequence
    }

    pub fn final_supplier_balance(&self) -> Option<Money> {
        self.final_supplier_balance
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn is_settled(&self) -> bool {
        self.status == ShipmentStatus::Settled
    }

    /// Lots of settled shipments are frozen.
    pub fn ensure_not_settled(&self) -> DomainResult<()> {
        if self.is_settled() {
            return Err(LedgerError::AlreadySettled);
        }
        Ok(())
    }

    /// Add the cost of a newly received lot.
    pub fn add_cost(&mut self, cost: Money) -> DomainResult<()> {
        self.ensure_not_settled()?;
        self.total_cost = self.total_cost.checked_add(cost)?;
        Ok(())
    }

    pub fn close(&mut self) -> DomainResult<()> {
        self.status = self.status.transition(ShipmentStatus::Closed)?;
        Ok(())
    }

    /// `settlement_sequence` comes from the store's settlement counter, like
    /// `fifo_sequence` does from the shipment counter.
    pub fn mark_settled(
        &mut self,
        final_balance: Money,
        settlement_sequence: u64,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.status = self.status.transition(ShipmentStatus::Settled)?;
        self.settlement_sequence = Some(settlement_sequence);
        self.final_supplier_balance = Some(final_balance);
        self.settled_at = Some(at);
        Ok(())
    }

    pub fn mark_unsettled(&mut self) -> DomainResult<()> {
        if !self.is_settled() {
            return Err(LedgerError::validation("shipment is not settled"));
        }
        self.status = self.status.transition(ShipmentStatus::Closed)?;
        self.final_supplier_balance = None;
        self.settlement_sequence = None;
        self.settled_at = None;
        Ok(())
    }
}
