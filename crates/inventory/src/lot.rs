use serde::{Deserialize, Serialize};

use stockbook_core::{
    DomainResult, LedgerError, Money, ProductId, ShipmentId, ShipmentItemId, impl_entity,
};

/// Input for receiving a lot into a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShipmentItem {
    pub product_id: ProductId,
    pub cartons: i64,
    /// Grams per carton.
    pub weight_per_unit: i64,
    /// Cost per carton.
    pub unit_cost: Money,
}

/// A lot: one product line within one shipment, the unit of FIFO depletion.
///
/// Stock is never stored as a single number. It is the additive result of
/// five counters:
///
/// `remaining = cartons + carryover_in - sold - carryover_out - wastage`
///
/// and every mutation below keeps `remaining >= 0` and
/// `sold <= cartons + carryover_in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentItem {
    id: ShipmentItemId,
    shipment_id: ShipmentId,
    product_id: ProductId,
    cartons: i64,
    sold_cartons: i64,
    carryover_in_cartons: i64,
    carryover_out_cartons: i64,
    wastage_quantity: i64,
    weight_per_unit: i64,
    unit_cost: Money,
}

impl_entity!(ShipmentItem, ShipmentItemId);

impl ShipmentItem {
    /// Receive new stock.
    pub fn receive(
        id: ShipmentItemId,
        shipment_id: ShipmentId,
        input: &NewShipmentItem,
    ) -> DomainResult<Self> {
        if input.cartons <= 0 {
            return Err(LedgerError::validation("received cartons must be positive"));
        }
        Self::build(id, shipment_id, input.product_id, input.cartons, input)
    }

    /// An empty lot on a successor shipment that will only hold carried-over
    /// stock.
    pub fn carryover_target(
        id: ShipmentItemId,
        shipment_id: ShipmentId,
        source: &ShipmentItem,
    ) -> Self {
        Self {
            id,
            shipment_id,
            product_id: source.product_id,
            cartons: 0,
            sold_cartons: 0,
            carryover_in_cartons: 0,
            carryover_out_cartons: 0,
            wastage_quantity: 0,
            weight_per_unit: source.weight_per_unit,
            unit_cost: source.unit_cost,
        }
    }

    fn build(
        id: ShipmentItemId,
        shipment_id: ShipmentId,
        product_id: ProductId,
        cartons: i64,
        input: &NewShipmentItem,
    ) -> DomainResult<Self> {
        if input.weight_per_unit < 0 {
            return Err(LedgerError::validation("weight_per_unit cannot be negative"));
        }
        if input.unit_cost.is_negative() {
            return Err(LedgerError::validation("unit_cost cannot be negative"));
        }
        Ok(Self {
            id,
            shipment_id,
            product_id,
            cartons,
            sold_cartons: 0,
            carryover_in_cartons: 0,
            carryover_out_cartons: 0,
            wastage_quantity: 0,
            weight_per_unit: input.weight_per_unit,
            unit_cost: input.unit_cost,
        })
    }

    pub fn id_typed(&self) -> ShipmentItemId {
        self.id
    }

    pub fn shipment_id(&self) -> ShipmentId {
        self.shipment_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn cartons(&self) -> i64 {
        self.cartons
    }

    pub fn sold_cartons(&self) -> i64 {
        self.sold_cartons
    }

    pub fn carryover_in_cartons(&self) -> i64 {
        self.carryover_in_cartons
    }

    pub fn carryover_out_cartons(&self) -> i64 {
        self.carryover_out_cartons
    }

    pub fn wastage_quantity(&self) -> i64 {
        self.wastage_quantity
    }

    pub fn weight_per_unit(&self) -> i64 {
        self.weight_per_unit
    }

    pub fn unit_cost(&self) -> Money {
        self.unit_cost
    }

    /// Cost of the newly received cartons.
    pub fn received_cost(&self) -> DomainResult<Money> {
        self.unit_cost.times(self.cartons)
    }

    pub fn remaining(&self) -> i64 {
        self.cartons + self.carryover_in_cartons
            - self.sold_cartons
            - self.carryover_out_cartons
            - self.wastage_quantity
    }

    /// Check the conservation invariants.
    pub fn check_invariants(&self) -> DomainResult<()> {
        if self.remaining() < 0 {
            return Err(LedgerError::invariant(format!(
                "lot {} remaining would be negative ({})",
                self.id,
                self.remaining()
            )));
        }
        if self.sold_cartons > self.cartons + self.carryover_in_cartons {
            return Err(LedgerError::invariant(format!(
                "lot {} sold more than it ever held",
                self.id
            )));
        }
        if self.sold_cartons < 0
            || self.carryover_in_cartons < 0
            || self.carryover_out_cartons < 0
            || self.wastage_quantity < 0
        {
            return Err(LedgerError::invariant(format!(
                "lot {} has a negative counter",
                self.id
            )));
        }
        Ok(())
    }

    /// Apply `f` to a copy and keep it only if the invariants still hold.
    fn mutate(&mut self, f: impl FnOnce(&mut Self)) -> DomainResult<()> {
        let mut next = self.clone();
        f(&mut next);
        next.check_invariants()?;
        *self = next;
        Ok(())
    }

    /// Deplete the lot by a committed sale.
    pub fn commit_sale(&mut self, cartons: i64) -> DomainResult<()> {
        if cartons <= 0 {
            return Err(LedgerError::validation("sold cartons must be positive"));
        }
        if cartons > self.remaining() {
            return Err(LedgerError::InsufficientStock {
                requested: cartons,
                available: self.remaining(),
            });
        }
        self.mutate(|lot| lot.sold_cartons += cartons)
    }

    /// Give back previously sold cartons (invoice cancellation, customer return).
    pub fn restore_sale(&mut self, cartons: i64) -> DomainResult<()> {
        if cartons <= 0 {
            return Err(LedgerError::validation("restored cartons must be positive"));
        }
        if cartons > self.sold_cartons {
            return Err(LedgerError::invariant(format!(
                "lot {} cannot restore {cartons} cartons, only {} sold",
                self.id, self.sold_cartons
            )));
        }
        self.mutate(|lot| lot.sold_cartons -= cartons)
    }

    pub fn record_wastage(&mut self, cartons: i64) -> DomainResult<()> {
        if cartons <= 0 {
            return Err(LedgerError::validation("wastage must be positive"));
        }
        if cartons > self.remaining() {
            return Err(LedgerError::InsufficientStock {
                requested: cartons,
                available: self.remaining(),
            });
        }
        self.mutate(|lot| lot.wastage_quantity += cartons)
    }

    /// Move `cartons` of unsold stock out of this lot (settlement).
    pub fn send_carryover(&mut self, cartons: i64) -> DomainResult<()> {
        if cartons <= 0 || cartons > self.remaining() {
            return Err(LedgerError::invariant(format!(
                "lot {} cannot carry over {cartons} cartons ({} remaining)",
                self.id,
                self.remaining()
            )));
        }
        self.mutate(|lot| lot.carryover_out_cartons += cartons)
    }

    /// Accept carried-over stock from a settled predecessor.
    pub fn receive_carryover(&mut self, cartons: i64) -> DomainResult<()> {
        if cartons <= 0 {
            return Err(LedgerError::invariant("carryover cartons must be positive"));
        }
        self.mutate(|lot| lot.carryover_in_cartons += cartons)
    }

    /// Undo a received carryover.
    ///
    /// Fails with `CannotUnsettleCarryoverSold` when part of the carried stock
    /// has been consumed since, i.e. the lot no longer holds `cartons`.
    pub fn revert_carryover_in(&mut self, cartons: i64) -> DomainResult<()> {
        if cartons > self.carryover_in_cartons || cartons > self.remaining() {
            return Err(LedgerError::CannotUnsettleCarryoverSold);
        }
        self.mutate(|lot| lot.carryover_in_cartons -= cartons)
    }

    /// Undo a sent carryover.
    pub fn revert_carryover_out(&mut self, cartons: i64) -> DomainResult<()> {
        if cartons > self.carryover_out_cartons {
            return Err(LedgerError::invariant(format!(
                "lot {} never sent {cartons} cartons",
                self.id
            )));
        }
        self.mutate(|lot| lot.carryover_out_cartons -= cartons)
    }
}
