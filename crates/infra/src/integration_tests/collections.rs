use chrono::NaiveDate;

use stockbook_accounting::PaymentMethod;
use stockbook_collections::{Collection, DistributionMethod, ManualAllocation, NewCollection};
use stockbook_core::{CustomerId, LedgerError, Money};
use stockbook_events::AuditAction;
use stockbook_invoicing::Invoice;

use super::{Harness, d};

fn request(customer: CustomerId, date: NaiveDate, amount: i64, method: DistributionMethod) -> NewCollection {
    NewCollection {
        customer_id: customer,
        date,
        amount: Money::new(amount),
        payment_method: PaymentMethod::Cash,
        distribution_method: method,
        manual_plan: vec![],
        notes: None,
    }
}

/// Cash collection distributed oldest first.
pub(super) fn collect(h: &Harness, customer: CustomerId, date: NaiveDate, amount: i64) -> Collection {
    h.engine
        .create_collection(&h.on(date), &request(customer, date, amount, DistributionMethod::OldestFirst))
        .unwrap()
}

/// A customer with a 500 invoice dated day 2 and a 300 invoice dated day 3;
/// day 3 is left open.
fn two_invoices(h: &Harness) -> (CustomerId, Invoice, Invoice) {
    let plums = h.product("plums");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    h.shipment(supplier, d(1), &[(plums, 100)]);

    h.open(d(2));
    let older = h.sell(customer, d(2), &[(plums, 5, 100)]);
    h.close_balanced(d(2));
    h.open(d(3));
    let newer = h.sell(customer, d(3), &[(plums, 3, 100)]);
    (customer, older, newer)
}

#[test]
fn oldest_first_pays_the_oldest_invoice_in_full() {
    let h = Harness::new();
    let (customer, older, newer) = two_invoices(&h);

    let collection = collect(&h, customer, d(3), 700);

    assert_eq!(h.engine.invoice(older.id_typed()).unwrap().balance(), Money::ZERO);
    let newer = h.engine.invoice(newer.id_typed()).unwrap();
    assert_eq!(newer.paid_amount(), Money::new(200));
    assert_eq!(newer.balance(), Money::new(100));
    assert_eq!(collection.allocated_amount(), Money::new(700));
    assert_eq!(collection.unallocated_amount(), Money::ZERO);
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::new(100));
}

#[test]
fn newest_first_starts_from_the_latest_invoice() {
    let h = Harness::new();
    let (customer, older, newer) = two_invoices(&h);

    h.engine
        .create_collection(&h.on(d(3)), &request(customer, d(3), 400, DistributionMethod::NewestFirst))
        .unwrap();

    assert_eq!(h.engine.invoice(newer.id_typed()).unwrap().balance(), Money::ZERO);
    assert_eq!(h.engine.invoice(older.id_typed()).unwrap().balance(), Money::new(400));
}

#[test]
fn overpayment_is_kept_as_unallocated_credit() {
    let h = Harness::new();
    let (customer, _, _) = two_invoices(&h);

    let collection = collect(&h, customer, d(3), 1_000);
    assert_eq!(collection.unallocated_amount(), Money::new(200));
    assert!(h.engine.open_invoices(customer).unwrap().is_empty());

    let statement = h.engine.customer_statement(customer).unwrap();
    assert_eq!(statement.balance, Money::new(-200));
    assert_eq!(statement.unallocated_credit, Money::new(200));
    assert!(statement.is_consistent());
}

#[test]
fn manual_plans_are_checked_before_anything_moves() {
    let h = Harness::new();
    let (customer, older, newer) = two_invoices(&h);
    let plums = h.engine.invoice(older.id_typed()).unwrap().items()[0].product_id;
    let stranger = h.customer("C-2", 0);
    let foreign = h.sell(stranger, d(3), &[(plums, 1, 100)]);

    let mut foreign_plan = request(customer, d(3), 500, DistributionMethod::Manual);
    foreign_plan.manual_plan = vec![ManualAllocation {
        invoice_id: foreign.id_typed(),
        amount: Money::new(50),
    }];
    let err = h.engine.create_collection(&h.on(d(3)), &foreign_plan).unwrap_err();
    assert_eq!(
        err.as_ledger(),
        Some(&LedgerError::InvoiceNotOwnedByCustomer {
            invoice_id: foreign.id_typed()
        })
    );

    let mut greedy_plan = request(customer, d(3), 500, DistributionMethod::Manual);
    greedy_plan.manual_plan = vec![
        ManualAllocation {
            invoice_id: older.id_typed(),
            amount: Money::new(400),
        },
        ManualAllocation {
            invoice_id: newer.id_typed(),
            amount: Money::new(200),
        },
    ];
    let err = h.engine.create_collection(&h.on(d(3)), &greedy_plan).unwrap_err();
    assert_eq!(err.code(), "allocation_exceeds_collection");
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::new(800));

    let mut plan = request(customer, d(3), 500, DistributionMethod::Manual);
    plan.manual_plan = vec![ManualAllocation {
        invoice_id: newer.id_typed(),
        amount: Money::new(250),
    }];
    let collection = h.engine.create_collection(&h.on(d(3)), &plan).unwrap();
    assert_eq!(collection.unallocated_amount(), Money::new(250));
    assert_eq!(h.engine.invoice(newer.id_typed()).unwrap().balance(), Money::new(50));
    assert_eq!(h.engine.invoice(older.id_typed()).unwrap().balance(), Money::new(500));
}

#[test]
fn cancelling_reverses_every_allocation_exactly_once() {
    let h = Harness::new();
    let (customer, older, newer) = two_invoices(&h);
    let collection = collect(&h, customer, d(3), 700);

    let cancelled = h
        .engine
        .cancel_collection(&h.on(d(3)), collection.id_typed())
        .unwrap();
    assert!(!cancelled.is_confirmed());
    assert!(cancelled.allocations().is_empty());
    assert_eq!(h.engine.invoice(older.id_typed()).unwrap().balance(), Money::new(500));
    assert_eq!(h.engine.invoice(newer.id_typed()).unwrap().paid_amount(), Money::ZERO);
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::new(800));
    assert_eq!(
        h.engine.audit().last().unwrap().action,
        AuditAction::CollectionCancelled
    );

    let err = h
        .engine
        .cancel_collection(&h.on(d(3)), collection.id_typed())
        .unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::AlreadyCancelled));
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::new(800));
}

#[test]
fn unallocated_collection_cancels_cleanly() {
    let h = Harness::new();
    let customer = h.customer("C-1", 0);
    h.open(d(2));

    let collection = collect(&h, customer, d(2), 300);
    assert!(collection.allocations().is_empty());
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::new(-300));

    h.engine.cancel_collection(&h.on(d(2)), collection.id_typed()).unwrap();
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::ZERO);
}

#[test]
fn old_collections_still_cancel() {
    let h = Harness::new();
    let customer = h.customer("C-1", 0);
    h.open(d(2));
    let collection = collect(&h, customer, d(2), 300);

    let cancelled = h
        .engine
        .cancel_collection(&h.on(d(28)), collection.id_typed())
        .unwrap();
    assert!(!cancelled.is_confirmed());
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::ZERO);

    let err = h
        .engine
        .cancel_collection(&h.on(d(28)), collection.id_typed())
        .unwrap_err();
    assert_eq!(err.code(), "already_cancelled");
}

#[test]
fn collections_are_never_deleted() {
    let h = Harness::new();
    let customer = h.customer("C-1", 0);
    h.open(d(2));
    let collection = collect(&h, customer, d(2), 300);

    let err = h
        .engine
        .delete_collection(&h.on(d(2)), collection.id_typed())
        .unwrap_err();
    assert_eq!(
        err.as_ledger(),
        Some(&LedgerError::DeletionNotAllowed { entity: "collection" })
    );
    assert!(h.engine.collection(collection.id_typed()).unwrap().is_confirmed());
}

#[test]
fn collections_need_the_open_day() {
    let h = Harness::new();
    let customer = h.customer("C-1", 0);
    h.open(d(2));

    let err = h
        .engine
        .create_collection(&h.on(d(3)), &request(customer, d(3), 10, DistributionMethod::OldestFirst))
        .unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::NoOpenWorkingDay { date: d(3) }));
}
