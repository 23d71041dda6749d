//! Shipment settlement and its reversal.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use stockbook_auth::{Authorizer, Operation};
use stockbook_core::{CarryoverId, DomainResult, LedgerError, ShipmentId, ShipmentItemId};
use stockbook_events::{AuditAction, AuditSink};
use stockbook_inventory::{Carryover, Shipment, ShipmentItem};
use stockbook_settlement::{
    SettlementStatement, StatementInput, carry_over, ensure_can_unsettle, gross_sales,
    plan_carryovers, previous_balance, returned_sales, revert_carryover, supplier_expenses,
    validate_successor,
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
    /// Settle a shipment with its supplier.
    ///
    /// Computes the statement, chains the supplier balance from the previous
    /// settlement and, when `next_shipment_id` is given, carries every lot's
    /// unsold cartons over into that shipment. The shipment's lots stop
    /// selling.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn settle_shipment(
        &self,
        ctx: &OperationContext,
        shipment_id: ShipmentId,
        next_shipment_id: Option<ShipmentId>,
    ) -> EngineResult<SettlementStatement> {
        let commission_rate_bps = self.settings.commission_rate_bps();
        self.execute(ctx, Operation::SettleShipment, |state, trail| {
            let shipment = state.shipment(shipment_id)?.clone();
            shipment.ensure_not_settled()?;
            let supplier = state.supplier(shipment.supplier_id())?.clone();
            if let Some(next_id) = next_shipment_id {
                validate_successor(&shipment, state.shipment(next_id)?)?;
            }

            let input = StatementInput {
                shipment_id,
                supplier_id: supplier.id_typed(),
                gross_sales: gross_sales(shipment_id, state.invoices.values())?,
                returns: returned_sales(shipment_id, state.returns.values())?,
                supplier_expenses: supplier_expenses(shipment_id, state.expenses.values())?,
                previous_balance: previous_balance(&supplier, &shipment, state.shipments.values()),
                commission_rate_bps,
            };
            let statement = SettlementStatement::compute(input, ctx.actor_id(), ctx.now)?;

            let carryovers = match next_shipment_id {
                Some(next_id) => carry_unsold_stock(state, &shipment, next_id, ctx.now)?,
                None => Vec::new(),
            };
            let statement = statement.with_carryovers(carryovers);

            state
                .supplier_mut(supplier.id_typed())?
                .apply_settlement(statement.final_balance);
            let settlement_sequence = state.next_settlement_sequence();
            state
                .shipment_mut(shipment_id)?
                .mark_settled(statement.final_balance, settlement_sequence, ctx.now)?;
            state.settlements.insert(shipment_id, statement.clone());

            info!(
                shipment = %shipment.number(),
                final_balance = %statement.final_balance,
                carryovers = statement.carryovers.len(),
                "shipment settled"
            );
            let record = trail
                .entry(AuditAction::ShipmentSettled, shipment_id)
                .with_before(&shipment)
                .with_after(&statement);
            trail.push(record);
            Ok(statement)
        })
    }

    /// Return a settled shipment to `closed`, undoing its carryovers and
    /// restoring the supplier balance it started from.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn unsettle_shipment(&self, ctx: &OperationContext, shipment_id: ShipmentId) -> EngineResult<Shipment> {
        self.execute(ctx, Operation::UnsettleShipment, |state, trail| {
            let shipment = state.shipment(shipment_id)?.clone();
            ensure_can_unsettle(&shipment, state.shipments.values())?;
            let statement = state
                .settlements
                .remove(&shipment_id)
                .ok_or_else(|| LedgerError::invariant("settled shipment has no statement"))?;

            for carryover in &statement.carryovers {
                with_lot_pair(
                    state,
                    carryover.from_shipment_item_id,
                    carryover.to_shipment_item_id,
                    |source, target| revert_carryover(source, target, carryover.cartons),
                )?;
                state.carryovers.remove(&carryover.id);
                drop_if_empty(state, carryover.to_shipment_item_id);
            }

            state
                .supplier_mut(shipment.supplier_id())?
                .revert_settlement(statement.previous_balance);
            let unsettled = state.shipment_mut(shipment_id)?;
            unsettled.mark_unsettled()?;
            let after = unsettled.clone();

            let record = trail
                .entry(AuditAction::ShipmentUnsettled, shipment_id)
                .with_before(&statement)
                .with_after(&after);
            trail.push(record);
            Ok(after)
        })
    }

    pub fn settlement_statement(&self, shipment_id: ShipmentId) -> EngineResult<SettlementStatement> {
        self.query(|state| {
            state
                .settlements
                .get(&shipment_id)
                .cloned()
                .ok_or_else(|| LedgerError::not_found("settlement"))
        })
    }
}

/// Move every lot's remaining cartons into the matching lot of `next_id`,
/// creating that lot when the successor has none for the product.
fn carry_unsold_stock(
    state: &mut LedgerState,
    shipment: &Shipment,
    next_id: ShipmentId,
    at: DateTime<Utc>,
) -> DomainResult<Vec<Carryover>> {
    let moves = plan_carryovers(state.lots_of(shipment.id_typed()));
    let mut rows = Vec::with_capacity(moves.len());

    for step in moves {
        let existing = state
            .lots_of(next_id)
            .find(|lot| lot.product_id() == step.product_id)
            .map(ShipmentItem::id_typed);
        let target_id = match existing {
            Some(id) => id,
            None => {
                let source = state.lot(step.from_item)?;
                let target = ShipmentItem::carryover_target(ShipmentItemId::new(), next_id, source);
                let id = target.id_typed();
                state.shipment_items.insert(id, target);
                id
            }
        };

        with_lot_pair(state, step.from_item, target_id, |source, target| {
            carry_over(source, target, step.cartons)
        })?;

        let row = Carryover {
            id: CarryoverId::new(),
            from_shipment_id: shipment.id_typed(),
            from_shipment_item_id: step.from_item,
            to_shipment_id: next_id,
            to_shipment_item_id: target_id,
            product_id: step.product_id,
            cartons: step.cartons,
            reason: format!("settlement of {}", shipment.number()),
            created_at: at,
        };
        state.carryovers.insert(row.id, row.clone());
        rows.push(row);
    }
    Ok(rows)
}

/// Run `f` on two distinct lots at once.
fn with_lot_pair<F>(
    state: &mut LedgerState,
    source_id: ShipmentItemId,
    target_id: ShipmentItemId,
    f: F,
) -> DomainResult<()>
where
    F: FnOnce(&mut ShipmentItem, &mut ShipmentItem) -> DomainResult<()>,
{
    if source_id == target_id {
        return Err(LedgerError::invariant("carryover source and target are the same lot"));
    }
    let mut source = state.lot(source_id)?.clone();
    let mut target = state.lot(target_id)?.clone();
    f(&mut source, &mut target)?;
    state.shipment_items.insert(source_id, source);
    state.shipment_items.insert(target_id, target);
    Ok(())
}

/// Lots created only to receive a carryover disappear with it.
fn drop_if_empty(state: &mut LedgerState, lot_id: ShipmentItemId) {
    let empty = state.shipment_items.get(&lot_id).is_some_and(|lot| {
        lot.cartons() == 0
            && lot.carryover_in_cartons() == 0
            && lot.sold_cartons() == 0
            && lot.carryover_out_cartons() == 0
            && lot.wastage_quantity() == 0
    });
    if empty {
        state.shipment_items.remove(&lot_id);
    }
}
