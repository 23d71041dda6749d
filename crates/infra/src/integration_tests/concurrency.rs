use std::thread;

use stockbook_core::{LedgerError, Money};
use stockbook_invoicing::InvoiceLineRequest;

use super::collections::collect;
use super::{Harness, d};

#[test]
fn racing_invoices_never_oversell() {
    let h = Harness::new();
    let rice = h.product("rice");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    let (first, _) = h.shipment(supplier, d(1), &[(rice, 30)]);
    let (second, _) = h.shipment(supplier, d(1), &[(rice, 20)]);
    h.open(d(2));

    let outcomes: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let line = InvoiceLineRequest::new(rice, 10, Money::new(50));
                    h.engine
                        .create_invoice(&h.on(d(2)), customer, d(2), Money::ZERO, &[line])
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    let sold = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(sold, 5);
    for failure in outcomes.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            failure.as_ledger(),
            Some(LedgerError::InsufficientStock { requested: 10, available: 0 })
        ));
    }
    assert_eq!(h.remaining(first), vec![0]);
    assert_eq!(h.remaining(second), vec![0]);
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::new(2_500));
}

#[test]
fn racing_collections_apply_each_payment_once() {
    let h = Harness::new();
    let rice = h.product("rice");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    h.shipment(supplier, d(1), &[(rice, 30)]);
    h.open(d(2));
    let invoice = h.sell(customer, d(2), &[(rice, 10, 50)]);

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| collect(&h, customer, d(2), 200));
        }
    });

    let invoice = h.engine.invoice(invoice.id_typed()).unwrap();
    assert_eq!(invoice.paid_amount(), Money::new(500));
    let statement = h.engine.customer_statement(customer).unwrap();
    assert_eq!(statement.collected, Money::new(800));
    assert_eq!(statement.unallocated_credit, Money::new(300));
    assert_eq!(statement.balance, Money::new(-300));
    assert!(statement.is_consistent());
}
