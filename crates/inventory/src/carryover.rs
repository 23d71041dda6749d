use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{CarryoverId, ProductId, ShipmentId, ShipmentItemId, impl_entity};

/// Immutable record of unsold stock moved from a settled shipment's lot into
/// a successor shipment's lot. Only settlement creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carryover {
    pub id: CarryoverId,
    pub from_shipment_id: ShipmentId,
    pub from_shipment_item_id: ShipmentItemId,
    pub to_shipment_id: ShipmentId,
    pub to_shipment_item_id: ShipmentItemId,
    pub product_id: ProductId,
    pub cartons: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl_entity!(Carryover, CarryoverId);
