//! FIFO allocation across lots.
//!
//! Allocation is a pure read: it proposes which lots a sale should deplete
//! and by how much. Committing the plan (incrementing `sold_cartons`) is the
//! caller's job and must happen in the same atomic unit as the read.

use serde::{Deserialize, Serialize};

use stockbook_core::{DomainResult, LedgerError, Money, ProductId, ShipmentId, ShipmentItemId};

use crate::lot::ShipmentItem;
use crate::shipment::Shipment;

/// One step of an allocation plan: take `cartons` from one lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotAllocation {
    pub shipment_item_id: ShipmentItemId,
    pub shipment_id: ShipmentId,
    pub shipment_number: String,
    pub fifo_sequence: u64,
    pub cartons: i64,
    pub weight_per_unit: i64,
    pub unit_cost: Money,
}

/// Lots eligible for sale of `product_id`, in FIFO order.
///
/// Eligible means: the lot carries that product and its shipment is not
/// settled (open and closed shipments both sell). Order is ascending
/// `fifo_sequence`, then lot id for lots within the same shipment.
fn candidates<'a, I>(product_id: ProductId, lots: I) -> Vec<(&'a Shipment, &'a ShipmentItem)>
where
    I: IntoIterator<Item = (&'a Shipment, &'a ShipmentItem)>,
{
    let mut eligible: Vec<_> = lots
        .into_iter()
        .filter(|(shipment, item)| item.product_id() == product_id && !shipment.is_settled())
        .collect();
    eligible.sort_by_key(|(shipment, item)| (shipment.fifo_sequence(), item.id_typed()));
    eligible
}

/// Total sellable cartons of `product_id`.
pub fn available_stock<'a, I>(product_id: ProductId, lots: I) -> i64
where
    I: IntoIterator<Item = (&'a Shipment, &'a ShipmentItem)>,
{
    candidates(product_id, lots)
        .into_iter()
        .map(|(_, item)| item.remaining().max(0))
        .sum()
}

/// Propose an allocation of `requested` cartons of `product_id`.
///
/// Draws each lot dry before touching the next one. Lots holding only
/// carried-over stock participate like any other lot, at their own sequence.
/// Fails with `InsufficientStock { requested, available }` if the candidates
/// cannot cover the request.
pub fn allocate<'a, I>(
    product_id: ProductId,
    requested: i64,
    lots: I,
) -> DomainResult<Vec<LotAllocation>>
where
    I: IntoIterator<Item = (&'a Shipment, &'a ShipmentItem)>,
{
    if requested <= 0 {
        return Err(LedgerError::validation("requested cartons must be positive"));
    }

    let eligible = candidates(product_id, lots);
    let available: i64 = eligible.iter().map(|(_, item)| item.remaining().max(0)).sum();
    if available < requested {
        return Err(LedgerError::InsufficientStock {
            requested,
            available,
        });
    }

    let mut still_needed = requested;
    let mut plan = Vec::new();
    for (shipment, item) in eligible {
        if still_needed == 0 {
            break;
        }
        let take = item.remaining().min(still_needed);
        if take <= 0 {
            continue;
        }
        plan.push(LotAllocation {
            shipment_item_id: item.id_typed(),
            shipment_id: shipment.id_typed(),
            shipment_number: shipment.number().to_string(),
            fifo_sequence: shipment.fifo_sequence(),
            cartons: take,
            weight_per_unit: item.weight_per_unit(),
            unit_cost: item.unit_cost(),
        });
        still_needed -= take;
    }

    Ok(plan)
}
