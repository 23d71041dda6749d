//! Shipment intake, wastage and stock queries.

use chrono::NaiveDate;
use tracing::{instrument, warn};

use stockbook_auth::{Authorizer, Operation};
use stockbook_core::{
    DomainResult, LedgerError, ProductId, ShipmentId, ShipmentItemId, SupplierId, WastageId,
};
use stockbook_events::{AuditAction, AuditSink};
use stockbook_inventory::{
    LotAllocation, NewShipmentItem, Shipment, ShipmentItem, WastageRecord, allocate, available_stock,
};

use super::LedgerEngine;
use crate::context::OperationContext;
use crate::error::EngineResult;
use crate::ledger_store::{LedgerState, LedgerStore};
use crate::settings::Settings;

impl<S, A, Z, C> LedgerEngine<S, A, Z, C>
where
    S: LedgerStore,
    A: Authorizer,
    Z: AuditSink,
    C: Settings,
{
    /// Open a new shipment at the next FIFO sequence and receive its lots.
    #[instrument(skip(self, ctx, items), fields(actor = %ctx.actor_id(), lots = items.len()))]
    pub fn create_shipment(
        &self,
        ctx: &OperationContext,
        supplier_id: SupplierId,
        date: NaiveDate,
        items: &[NewShipmentItem],
    ) -> EngineResult<(Shipment, Vec<ShipmentItem>)> {
        self.execute(ctx, Operation::CreateShipment, |state, trail| {
            state.supplier(supplier_id)?.ensure_active()?;

            let sequence = state.next_fifo_sequence();
            let shipment = Shipment::new(ShipmentId::new(), supplier_id, date, sequence, ctx.actor_id())?;
            let shipment_id = shipment.id_typed();
            state.shipments.insert(shipment_id, shipment);

            let lots = items
                .iter()
                .map(|input| receive_lot(state, shipment_id, input))
                .collect::<DomainResult<Vec<_>>>()?;

            let shipment = state.shipment(shipment_id)?.clone();
            let record = trail
                .entry(AuditAction::ShipmentCreated, shipment_id)
                .with_after(&shipment);
            trail.push(record);
            Ok((shipment, lots))
        })
    }

    /// Receive one more lot into a shipment that is not settled.
    #[instrument(skip(self, ctx, item), fields(actor = %ctx.actor_id(), product = %item.product_id))]
    pub fn add_shipment_item(
        &self,
        ctx: &OperationContext,
        shipment_id: ShipmentId,
        item: &NewShipmentItem,
    ) -> EngineResult<ShipmentItem> {
        self.execute(ctx, Operation::AddShipmentItem, |state, trail| {
            let lot = receive_lot(state, shipment_id, item)?;
            let record = trail
                .entry(AuditAction::ShipmentItemAdded, shipment_id)
                .with_after(&lot);
            trail.push(record);
            Ok(lot)
        })
    }

    /// `open → closed`. Closed shipments keep selling until settled.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn close_shipment(&self, ctx: &OperationContext, shipment_id: ShipmentId) -> EngineResult<Shipment> {
        self.execute(ctx, Operation::CloseShipment, |state, trail| {
            let shipment = state.shipment_mut(shipment_id)?;
            let before = shipment.clone();
            shipment.close()?;
            let after = shipment.clone();
            let record = trail
                .entry(AuditAction::ShipmentClosed, shipment_id)
                .with_before(&before)
                .with_after(&after);
            trail.push(record);
            Ok(after)
        })
    }

    /// Write spoiled cartons off a lot on the open working day.
    #[instrument(skip(self, ctx, reason), fields(actor = %ctx.actor_id()))]
    pub fn record_wastage(
        &self,
        ctx: &OperationContext,
        shipment_item_id: ShipmentItemId,
        cartons: i64,
        date: NaiveDate,
        reason: &str,
    ) -> EngineResult<WastageRecord> {
        self.execute(ctx, Operation::RecordWastage, |state, trail| {
            state.session_for(date)?;
            state.ensure_lot_unsettled(shipment_item_id)?;

            let lot = state.lot_mut(shipment_item_id)?;
            let before = lot.clone();
            lot.record_wastage(cartons)?;
            let record = WastageRecord {
                id: WastageId::new(),
                shipment_item_id,
                product_id: lot.product_id(),
                cartons,
                date,
                reason: reason.trim().to_string(),
                recorded_by: ctx.actor_id(),
                recorded_at: ctx.now,
            };
            state.wastage.insert(record.id, record.clone());

            let audit = trail
                .entry(AuditAction::WastageRecorded, shipment_item_id)
                .with_before(&before)
                .with_after(&record);
            trail.push(audit);
            Ok(record)
        })
    }

    /// Propose a FIFO allocation without committing it.
    #[instrument(skip(self))]
    pub fn allocate(&self, product_id: ProductId, cartons: i64) -> EngineResult<Vec<LotAllocation>> {
        self.query(|state| allocate(product_id, cartons, state.lots()))
    }

    pub fn available_stock(&self, product_id: ProductId) -> EngineResult<i64> {
        self.query(|state| Ok(available_stock(product_id, state.lots())))
    }

    pub fn shipment(&self, shipment_id: ShipmentId) -> EngineResult<Shipment> {
        self.query(|state| state.shipment(shipment_id).cloned())
    }

    /// Lots of a shipment, in lot id order.
    pub fn shipment_items(&self, shipment_id: ShipmentId) -> EngineResult<Vec<ShipmentItem>> {
        self.query(|state| {
            state.shipment(shipment_id)?;
            Ok(state.lots_of(shipment_id).cloned().collect())
        })
    }

    /// Shipments are never deleted.
    pub fn delete_shipment(&self, ctx: &OperationContext, shipment_id: ShipmentId) -> EngineResult<()> {
        warn!(actor = %ctx.actor_id(), shipment = %shipment_id, "shipment deletion refused");
        Err(LedgerError::DeletionNotAllowed { entity: "shipment" }.into())
    }
}

fn receive_lot(
    state: &mut LedgerState,
    shipment_id: ShipmentId,
    input: &NewShipmentItem,
) -> DomainResult<ShipmentItem> {
    state.product(input.product_id)?;
    let lot = ShipmentItem::receive(ShipmentItemId::new(), shipment_id, input)?;
    state.shipment_mut(shipment_id)?.add_cost(lot.received_cost()?)?;
    state.shipment_items.insert(lot.id_typed(), lot.clone());
    Ok(lot)
}
