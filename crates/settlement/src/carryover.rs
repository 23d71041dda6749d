//! Moving unsold stock into a successor shipment.

use serde::{Deserialize, Serialize};

use stockbook_core::{DomainResult, LedgerError, ProductId, ShipmentItemId};
use stockbook_inventory::ShipmentItem;

/// Unsold stock of one lot that must follow the supplier into the next shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryoverMove {
    pub from_item: ShipmentItemId,
    pub product_id: ProductId,
    pub cartons: i64,
}

/// Every lot with `remaining > 0`, in lot id order.
pub fn plan_carryovers<'a, I>(items: I) -> Vec<CarryoverMove>
where
    I: IntoIterator<Item = &'a ShipmentItem>,
{
    let mut moves: Vec<CarryoverMove> = items
        .into_iter()
        .filter(|item| item.remaining() > 0)
        .map(|item| CarryoverMove {
            from_item: item.id_typed(),
            product_id: item.product_id(),
            cartons: item.remaining(),
        })
        .collect();
    moves.sort_by_key(|m| m.from_item);
    moves
}

/// Execute one move: `source.carryover_out += n`, `target.carryover_in += n`.
pub fn carry_over(source: &mut ShipmentItem, target: &mut ShipmentItem, cartons: i64) -> DomainResult<()> {
    if source.product_id() != target.product_id() {
        return Err(LedgerError::invariant("carryover target carries a different product"));
    }
    source.send_carryover(cartons)?;
    target.receive_carryover(cartons)
}

/// Undo one move.
///
/// Fails with `CannotUnsettleCarryoverSold` once the target no longer holds
/// the carried cartons.
pub fn revert_carryover(
    source: &mut ShipmentItem,
    target: &mut ShipmentItem,
    cartons: i64,
) -> DomainResult<()> {
    target.revert_carryover_in(cartons)?;
    source.revert_carryover_out(cartons)
}
