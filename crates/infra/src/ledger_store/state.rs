use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockbook_accounting::{AccountTransfer, Expense};
use stockbook_collections::Collection;
use stockbook_core::{
    CarryoverId, CollectionId, CustomerId, DomainResult, ExpenseId, InvoiceId, LedgerError,
    ProductId, ReturnId, ShipmentId, ShipmentItemId, SupplierId, TransferId, WastageId,
};
use stockbook_inventory::{Carryover, Product, Shipment, ShipmentItem, WastageRecord};
use stockbook_invoicing::{Invoice, SalesReturn};
use stockbook_parties::{Customer, Supplier};
use stockbook_settlement::SettlementStatement;
use stockbook_workday::{DaySession, WorkingDay, require_open_day};

/// Every ledger table, keyed by id.
///
/// `BTreeMap` keeps iteration deterministic (UUIDv7 ids iterate in creation
/// order), which the allocator and distributor tie-breaks rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub products: BTreeMap<ProductId, Product>,
    pub customers: BTreeMap<CustomerId, Customer>,
    pub suppliers: BTreeMap<SupplierId, Supplier>,
    pub shipments: BTreeMap<ShipmentId, Shipment>,
    pub shipment_items: BTreeMap<ShipmentItemId, ShipmentItem>,
    pub carryovers: BTreeMap<CarryoverId, Carryover>,
    pub wastage: BTreeMap<WastageId, WastageRecord>,
    pub invoices: BTreeMap<InvoiceId, Invoice>,
    pub returns: BTreeMap<ReturnId, SalesReturn>,
    pub collections: BTreeMap<CollectionId, Collection>,
    pub expenses: BTreeMap<ExpenseId, Expense>,
    pub transfers: BTreeMap<TransferId, AccountTransfer>,
    pub settlements: BTreeMap<ShipmentId, SettlementStatement>,
    pub working_days: BTreeMap<NaiveDate, WorkingDay>,
    last_fifo_sequence: u64,
    last_invoice_number: u64,
    last_settlement_sequence: u64,
}

macro_rules! lookup {
    ($get:ident, $get_mut:ident, $field:ident, $id:ty, $t:ty, $entity:literal) => {
        pub fn $get(&self, id: $id) -> DomainResult<&$t> {
            self.$field.get(&id).ok_or(LedgerError::NotFound { entity: $entity })
        }

        pub fn $get_mut(&mut self, id: $id) -> DomainResult<&mut $t> {
            self.$field
                .get_mut(&id)
                .ok_or(LedgerError::NotFound { entity: $entity })
        }
    };
}

impl LedgerState {
    lookup!(product, product_mut, products, ProductId, Product, "product");
    lookup!(customer, customer_mut, customers, CustomerId, Customer, "customer");
    lookup!(supplier, supplier_mut, suppliers, SupplierId, Supplier, "supplier");
    lookup!(shipment, shipment_mut, shipments, ShipmentId, Shipment, "shipment");
    lookup!(lot, lot_mut, shipment_items, ShipmentItemId, ShipmentItem, "shipment item");
    lookup!(invoice, invoice_mut, invoices, InvoiceId, Invoice, "invoice");
    lookup!(sales_return, sales_return_mut, returns, ReturnId, SalesReturn, "sales return");
    lookup!(collection, collection_mut, collections, CollectionId, Collection, "collection");
    lookup!(expense, expense_mut, expenses, ExpenseId, Expense, "expense");

    /// Next value of the shipment FIFO counter. Never reused.
    pub fn next_fifo_sequence(&mut self) -> u64 {
        self.last_fifo_sequence += 1;
        self.last_fifo_sequence
    }

    /// Next position in the settlement order. Never reused, even after an unsettle.
    pub fn next_settlement_sequence(&mut self) -> u64 {
        self.last_settlement_sequence += 1;
        self.last_settlement_sequence
    }

    pub fn next_invoice_number(&mut self) -> String {
        self.last_invoice_number += 1;
        format!("INV-{:06}", self.last_invoice_number)
    }

    /// Every lot paired with its shipment, as the allocator consumes them.
    pub fn lots(&self) -> impl Iterator<Item = (&Shipment, &ShipmentItem)> {
        self.shipment_items
            .values()
            .filter_map(|item| self.shipments.get(&item.shipment_id()).map(|s| (s, item)))
    }

    pub fn lots_of(&self, shipment_id: ShipmentId) -> impl Iterator<Item = &ShipmentItem> {
        self.shipment_items
            .values()
            .filter(move |item| item.shipment_id() == shipment_id)
    }

    /// Fails with `LotSettled` if the lot's shipment is settled.
    pub fn ensure_lot_unsettled(&self, lot_id: ShipmentItemId) -> DomainResult<()> {
        let lot = self.lot(lot_id)?;
        if self.shipment(lot.shipment_id())?.is_settled() {
            return Err(LedgerError::LotSettled);
        }
        Ok(())
    }

    /// The open-day session for an operation dated `date`.
    pub fn session_for(&self, date: NaiveDate) -> DomainResult<DaySession> {
        require_open_day(self.working_days.values(), date)
    }

    pub fn current_day(&self) -> Option<&WorkingDay> {
        self.working_days.values().find(|d| d.is_open())
    }

    pub fn customer_invoices(&self, customer_id: CustomerId) -> impl Iterator<Item = &Invoice> {
        self.invoices
            .values()
            .filter(move |inv| inv.customer_id() == customer_id)
    }
}
