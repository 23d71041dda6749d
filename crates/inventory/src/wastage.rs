use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{ProductId, ShipmentItemId, UserId, WastageId, impl_entity};

/// Spoiled or damaged cartons written off a lot on a given working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WastageRecord {
    pub id: WastageId,
    pub shipment_item_id: ShipmentItemId,
    pub product_id: ProductId,
    pub cartons: i64,
    pub date: NaiveDate,
    pub reason: String,
    pub recorded_by: UserId,
    pub recorded_at: DateTime<Utc>,
}

impl_entity!(WastageRecord, WastageId);
