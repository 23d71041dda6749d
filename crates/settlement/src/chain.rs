//! Balance chaining between a supplier's shipments.

use stockbook_core::{DomainResult, LedgerError, Money};
use stockbook_inventory::Shipment;
use stockbook_parties::Supplier;

/// Balance a settlement of `shipment` starts from.
///
/// The supplier's most recent settlement hands over its final balance, in the
/// order settlements were made rather than by `fifo_sequence`. With none
/// settled yet, the opening balance is used.
pub fn previous_balance<'a, I>(supplier: &Supplier, shipment: &Shipment, shipments: I) -> Money
where
    I: IntoIterator<Item = &'a Shipment>,
{
    shipments
        .into_iter()
        .filter(|s| s.supplier_id() == supplier.id_typed() && s.id_typed() != shipment.id_typed())
        .filter_map(|s| s.settlement_sequence().map(|seq| (seq, s)))
        .max_by_key(|(seq, _)| *seq)
        .and_then(|(_, s)| s.final_supplier_balance())
        .unwrap_or_else(|| supplier.opening_balance())
}

/// Carryover target must be a later, unsettled shipment of the same supplier.
pub fn validate_successor(shipment: &Shipment, next: &Shipment) -> DomainResult<()> {
    if next.id_typed() == shipment.id_typed() {
        return Err(LedgerError::validation("a shipment cannot carry over into itself"));
    }
    if next.supplier_id() != shipment.supplier_id() {
        return Err(LedgerError::validation(
            "carryover target belongs to a different supplier",
        ));
    }
    if next.fifo_sequence() < shipment.fifo_sequence() {
        return Err(LedgerError::validation(
            "carryover target precedes the settled shipment",
        ));
    }
    if next.is_settled() {
        return Err(LedgerError::validation("carryover target is already settled"));
    }
    Ok(())
}

/// Unsettling is only safe at the head of the supplier's settlement chain:
/// no settlement made after this one may have chained from it.
pub fn ensure_can_unsettle<'a, I>(shipment: &Shipment, shipments: I) -> DomainResult<()>
where
    I: IntoIterator<Item = &'a Shipment>,
{
    let Some(own) = shipment.settlement_sequence() else {
        return Err(LedgerError::validation("shipment is not settled"));
    };
    let settled_after = shipments.into_iter().any(|s| {
        s.supplier_id() == shipment.supplier_id()
            && s.id_typed() != shipment.id_typed()
            && s.settlement_sequence().is_some_and(|seq| seq > own)
    });
    if settled_after {
        return Err(LedgerError::LaterShipmentSettled);
    }
    Ok(())
}
