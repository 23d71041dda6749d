//! Inventory domain module: shipments, lots and FIFO allocation.
//!
//! This crate contains business rules for stock held in supplier shipments,
//! implemented purely as deterministic domain logic (no IO, no locks, no
//! storage). Callers are responsible for running mutations atomically.

pub mod carryover;
pub mod fifo;
pub mod lot;
pub mod product;
pub mod shipment;
pub mod wastage;

pub use carryover::Carryover;
pub use fifo::{LotAllocation, allocate, available_stock};
pub use lot::{NewShipmentItem, ShipmentItem};
pub use product::Product;
pub use shipment::{Shipment, ShipmentStatus};
pub use wastage::WastageRecord;
