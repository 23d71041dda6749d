//! End-to-end tests driving [`LedgerEngine`] against the in-memory store.
//!
//! Every test builds its own ledger, so they run in parallel safely.

mod balance_identity;
mod collections;
mod concurrency;
mod issuance;
mod settlement;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use stockbook_auth::{Actor, Role, RolePolicy};
use stockbook_core::{CustomerId, Money, ProductId, ShipmentId, ShipmentItemId, SupplierId, UserId};
use stockbook_events::InMemoryAuditLog;
use stockbook_inventory::NewShipmentItem;
use stockbook_invoicing::{Invoice, InvoiceLineRequest};

use crate::context::OperationContext;
use crate::engine::LedgerEngine;
use crate::ledger_store::InMemoryLedgerStore;
use crate::settings::StaticSettings;

pub(crate) type TestEngine = LedgerEngine<InMemoryLedgerStore, RolePolicy, InMemoryAuditLog, StaticSettings>;

pub(crate) fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

fn noon(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
}

pub(crate) struct Harness {
    pub engine: TestEngine,
    pub admin: Actor,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(StaticSettings::default())
    }

    pub fn with_settings(settings: StaticSettings) -> Self {
        Self {
            engine: LedgerEngine::new(
                InMemoryLedgerStore::new(),
                RolePolicy::standard(),
                InMemoryAuditLog::new(),
                settings,
            ),
            admin: Actor::admin("owner"),
        }
    }

    /// Admin acting at noon on `date`.
    pub fn on(&self, date: NaiveDate) -> OperationContext {
        OperationContext::new(self.admin.clone(), noon(date))
    }

    pub fn as_role(&self, role: Role, date: NaiveDate) -> OperationContext {
        OperationContext::new(Actor::new(UserId::new(), "staff", vec![role]), noon(date))
    }

    pub fn open(&self, date: NaiveDate) {
        self.engine.open_day(&self.on(date), date).unwrap();
    }

    /// Close the open day with exactly the expected cash.
    pub fn close_balanced(&self, date: NaiveDate) {
        let (_, expected) = self.engine.preview_close(date).unwrap();
        self.engine.close_day(&self.on(date), expected.cashbox).unwrap();
    }

    pub fn product(&self, name: &str) -> ProductId {
        self.engine
            .register_product(&self.on(d(1)), name, "carton")
            .unwrap()
            .id_typed()
    }

    pub fn customer(&self, code: &str, opening: i64) -> CustomerId {
        self.engine
            .register_customer(&self.on(d(1)), code, "Corner Grocer", Money::new(opening))
            .unwrap()
            .id_typed()
    }

    pub fn supplier(&self, code: &str, opening: i64) -> SupplierId {
        self.engine
            .register_supplier(&self.on(d(1)), code, "Valley Farms", Money::new(opening))
            .unwrap()
            .id_typed()
    }

    /// A shipment of `(product, cartons)` lots at cost 10 per carton.
    pub fn shipment(
        &self,
        supplier: SupplierId,
        date: NaiveDate,
        lots: &[(ProductId, i64)],
    ) -> (ShipmentId, Vec<ShipmentItemId>) {
        let items: Vec<NewShipmentItem> = lots
            .iter()
            .map(|(product_id, cartons)| NewShipmentItem {
                product_id: *product_id,
                cartons: *cartons,
                weight_per_unit: 5_000,
                unit_cost: Money::new(10),
            })
            .collect();
        let (shipment, lots) = self
            .engine
            .create_shipment(&self.on(date), supplier, date, &items)
            .unwrap();
        (shipment.id_typed(), lots.iter().map(|l| l.id_typed()).collect())
    }

    /// Invoice `(product, cartons, unit_price)` lines without discount.
    pub fn sell(&self, customer: CustomerId, date: NaiveDate, lines: &[(ProductId, i64, i64)]) -> Invoice {
        let requests: Vec<InvoiceLineRequest> = lines
            .iter()
            .map(|(p, cartons, price)| InvoiceLineRequest::new(*p, *cartons, Money::new(*price)))
            .collect();
        self.engine
            .create_invoice(&self.on(date), customer, date, Money::ZERO, &requests)
            .unwrap()
    }

    pub fn remaining(&self, shipment: ShipmentId) -> Vec<i64> {
        self.engine
            .shipment_items(shipment)
            .unwrap()
            .iter()
            .map(|l| l.remaining())
            .collect()
    }
}
