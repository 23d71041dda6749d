use stockbook_auth::Role;
use stockbook_core::{LedgerError, Money};
use stockbook_events::AuditAction;
use stockbook_invoicing::InvoiceLineRequest;

use super::{Harness, d};
use crate::engine::ReturnRequest;
use crate::error::EngineError;

fn ledger_err(err: EngineError) -> LedgerError {
    err.as_ledger().cloned().expect("business error")
}

#[test]
fn sale_draws_oldest_lot_dry_before_the_next() {
    let h = Harness::new();
    let apples = h.product("apples");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    let (first, first_lots) = h.shipment(supplier, d(1), &[(apples, 30)]);
    let (second, second_lots) = h.shipment(supplier, d(1), &[(apples, 70)]);
    h.open(d(2));

    let invoice = h.sell(customer, d(2), &[(apples, 60, 100)]);

    let drawn: Vec<_> = invoice
        .items()
        .iter()
        .map(|i| (i.shipment_item_id, i.cartons))
        .collect();
    assert_eq!(drawn, vec![(first_lots[0], 30), (second_lots[0], 30)]);
    assert_eq!(invoice.items()[0].quantity, 30 * 5_000);
    assert_eq!(invoice.total(), Money::new(6_000));
    assert_eq!(invoice.balance(), invoice.total());
    assert_eq!(invoice.number(), "INV-000001");

    assert_eq!(h.remaining(first), vec![0]);
    assert_eq!(h.remaining(second), vec![40]);
    assert_eq!(h.engine.available_stock(apples).unwrap(), 40);
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::new(6_000));
    assert_eq!(h.engine.audit().last().unwrap().action, AuditAction::InvoiceCreated);
}

#[test]
fn allocation_preview_does_not_deplete() {
    let h = Harness::new();
    let pears = h.product("pears");
    let supplier = h.supplier("S-1", 0);
    let (shipment, _) = h.shipment(supplier, d(1), &[(pears, 30)]);
    h.shipment(supplier, d(1), &[(pears, 70)]);

    let plan = h.engine.allocate(pears, 60).unwrap();
    assert_eq!(plan.iter().map(|a| a.cartons).collect::<Vec<_>>(), vec![30, 30]);
    assert_eq!(plan[0].shipment_number, "SH-000001");
    assert_eq!(h.remaining(shipment), vec![30]);
}

#[test]
fn insufficient_stock_leaves_no_trace() {
    let h = Harness::new();
    let figs = h.product("figs");
    let customer = h.customer("C-1", 250);
    let supplier = h.supplier("S-1", 0);
    let (shipment, _) = h.shipment(supplier, d(1), &[(figs, 100)]);
    h.open(d(2));
    let audited = h.engine.audit().records().len();

    let err = h
        .engine
        .create_invoice(
            &h.on(d(2)),
            customer,
            d(2),
            Money::ZERO,
            &[InvoiceLineRequest::new(figs, 150, Money::new(9))],
        )
        .unwrap_err();

    assert_eq!(
        ledger_err(err),
        LedgerError::InsufficientStock {
            requested: 150,
            available: 100
        }
    );
    assert_eq!(h.remaining(shipment), vec![100]);
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::new(250));
    assert_eq!(h.engine.audit().records().len(), audited);
}

#[test]
fn failing_second_line_rolls_back_the_first() {
    let h = Harness::new();
    let figs = h.product("figs");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    let (shipment, _) = h.shipment(supplier, d(1), &[(figs, 10)]);
    h.open(d(2));

    let err = h
        .engine
        .create_invoice(
            &h.on(d(2)),
            customer,
            d(2),
            Money::ZERO,
            &[
                InvoiceLineRequest::new(figs, 6, Money::new(9)),
                InvoiceLineRequest::new(figs, 6, Money::new(9)),
            ],
        )
        .unwrap_err();

    assert_eq!(
        ledger_err(err),
        LedgerError::InsufficientStock {
            requested: 6,
            available: 4
        }
    );
    assert_eq!(h.remaining(shipment), vec![10]);
}

#[test]
fn discount_larger_than_subtotal_is_rejected() {
    let h = Harness::new();
    let figs = h.product("figs");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    let (shipment, _) = h.shipment(supplier, d(1), &[(figs, 10)]);
    h.open(d(2));

    let err = h
        .engine
        .create_invoice(
            &h.on(d(2)),
            customer,
            d(2),
            Money::new(101),
            &[InvoiceLineRequest::new(figs, 10, Money::new(10))],
        )
        .unwrap_err();
    assert_eq!(err.code(), "discount_exceeds_subtotal");
    assert_eq!(h.remaining(shipment), vec![10]);

    let invoice = h
        .engine
        .create_invoice(
            &h.on(d(2)),
            customer,
            d(2),
            Money::new(100),
            &[InvoiceLineRequest::new(figs, 10, Money::new(10))],
        )
        .unwrap();
    assert_eq!(invoice.total(), Money::ZERO);
}

#[test]
fn invoices_need_their_date_to_be_the_open_day() {
    let h = Harness::new();
    let figs = h.product("figs");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    h.shipment(supplier, d(1), &[(figs, 10)]);
    let line = [InvoiceLineRequest::new(figs, 1, Money::new(10))];

    let err = h
        .engine
        .create_invoice(&h.on(d(2)), customer, d(2), Money::ZERO, &line)
        .unwrap_err();
    assert_eq!(ledger_err(err), LedgerError::NoOpenWorkingDay { date: d(2) });

    h.open(d(2));
    let err = h
        .engine
        .create_invoice(&h.on(d(3)), customer, d(3), Money::ZERO, &line)
        .unwrap_err();
    assert_eq!(ledger_err(err), LedgerError::NoOpenWorkingDay { date: d(3) });
}

#[test]
fn inactive_customer_cannot_be_invoiced() {
    let h = Harness::new();
    let figs = h.product("figs");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    h.shipment(supplier, d(1), &[(figs, 10)]);
    h.open(d(2));
    h.engine.deactivate_customer(&h.on(d(2)), customer).unwrap();

    let err = h
        .engine
        .create_invoice(
            &h.on(d(2)),
            customer,
            d(2),
            Money::ZERO,
            &[InvoiceLineRequest::new(figs, 1, Money::new(10))],
        )
        .unwrap_err();
    assert_eq!(err.code(), "validation");
}

#[test]
fn cancelling_restores_stock_and_balance_once() {
    let h = Harness::new();
    let figs = h.product("figs");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    let (shipment, _) = h.shipment(supplier, d(1), &[(figs, 10)]);
    h.open(d(2));
    let invoice = h.sell(customer, d(2), &[(figs, 4, 25)]);

    let cancelled = h.engine.cancel_invoice(&h.on(d(2)), invoice.id_typed()).unwrap();
    assert!(!cancelled.is_active());
    assert_eq!(h.remaining(shipment), vec![10]);
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::ZERO);

    let err = h.engine.cancel_invoice(&h.on(d(2)), invoice.id_typed()).unwrap_err();
    assert_eq!(ledger_err(err), LedgerError::AlreadyCancelled);
    assert_eq!(h.remaining(shipment), vec![10]);
}

#[test]
fn cancellation_is_refused_while_paid_or_after_the_window() {
    let h = Harness::new();
    let figs = h.product("figs");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    h.shipment(supplier, d(1), &[(figs, 10)]);
    h.open(d(2));
    let first = h.sell(customer, d(2), &[(figs, 2, 50)]);
    let second = h.sell(customer, d(2), &[(figs, 2, 50)]);

    let collection = super::collections::collect(&h, customer, d(2), 60);
    assert_eq!(collection.allocations().len(), 1);
    let paid = collection.allocations()[0].invoice_id;
    let unpaid = if paid == first.id_typed() { second.id_typed() } else { first.id_typed() };

    let err = h.engine.cancel_invoice(&h.on(d(2)), paid).unwrap_err();
    assert_eq!(ledger_err(err), LedgerError::InvoiceHasPayments);

    let err = h.engine.cancel_invoice(&h.on(d(10)), unpaid).unwrap_err();
    assert_eq!(ledger_err(err), LedgerError::EditWindowExpired { window_days: 7 });
    h.engine.cancel_invoice(&h.on(d(9)), unpaid).unwrap();
}

#[test]
fn returns_put_cartons_back_and_credit_the_customer() {
    let h = Harness::new();
    let figs = h.product("figs");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    let (shipment, _) = h.shipment(supplier, d(1), &[(figs, 10)]);
    h.open(d(2));
    let invoice = h.sell(customer, d(2), &[(figs, 6, 30)]);
    let item = invoice.items()[0].id;
    let request = |cartons| ReturnRequest {
        invoice_id: invoice.id_typed(),
        invoice_item_id: item,
        cartons,
    };

    let ret = h
        .engine
        .create_return(&h.on(d(2)), customer, d(2), &[request(4)], Some("bruised"))
        .unwrap();
    assert_eq!(ret.total(), Money::new(120));
    assert_eq!(h.remaining(shipment), vec![8]);
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::new(60));

    let err = h
        .engine
        .create_return(&h.on(d(2)), customer, d(2), &[request(3)], None)
        .unwrap_err();
    assert_eq!(err.code(), "validation");

    let err = h.engine.cancel_invoice(&h.on(d(2)), invoice.id_typed()).unwrap_err();
    assert_eq!(err.code(), "validation");

    h.engine.cancel_return(&h.on(d(2)), ret.id_typed()).unwrap();
    assert_eq!(h.remaining(shipment), vec![4]);
    assert_eq!(h.engine.customer(customer).unwrap().balance(), Money::new(180));
    assert!(h.engine.customer_statement(customer).unwrap().is_consistent());
}

#[test]
fn returns_against_another_customers_invoice_are_refused() {
    let h = Harness::new();
    let figs = h.product("figs");
    let alice = h.customer("C-1", 0);
    let bob = h.customer("C-2", 0);
    let supplier = h.supplier("S-1", 0);
    h.shipment(supplier, d(1), &[(figs, 10)]);
    h.open(d(2));
    let invoice = h.sell(alice, d(2), &[(figs, 2, 30)]);

    let err = h
        .engine
        .create_return(
            &h.on(d(2)),
            bob,
            d(2),
            &[ReturnRequest {
                invoice_id: invoice.id_typed(),
                invoice_item_id: invoice.items()[0].id,
                cartons: 1,
            }],
            None,
        )
        .unwrap_err();
    assert_eq!(
        ledger_err(err),
        LedgerError::InvoiceNotOwnedByCustomer {
            invoice_id: invoice.id_typed()
        }
    );
}

#[test]
fn invoices_cannot_be_deleted() {
    let h = Harness::new();
    let figs = h.product("figs");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    h.shipment(supplier, d(1), &[(figs, 10)]);
    h.open(d(2));
    let invoice = h.sell(customer, d(2), &[(figs, 1, 30)]);

    let err = h.engine.delete_invoice(&h.on(d(2)), invoice.id_typed()).unwrap_err();
    assert_eq!(ledger_err(err), LedgerError::DeletionNotAllowed { entity: "invoice" });
    assert!(h.engine.invoice(invoice.id_typed()).unwrap().is_active());
}

#[test]
fn cashier_cannot_cancel_invoices() {
    let h = Harness::new();
    let figs = h.product("figs");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    h.shipment(supplier, d(1), &[(figs, 10)]);
    h.open(d(2));
    let invoice = h.sell(customer, d(2), &[(figs, 1, 30)]);

    let cashier = h.as_role(Role::CASHIER, d(2));
    let err = h.engine.cancel_invoice(&cashier, invoice.id_typed()).unwrap_err();
    assert_eq!(
        ledger_err(err),
        LedgerError::Unauthorized {
            operation: "invoices.cancel".into()
        }
    );
    assert!(h.engine.invoice(invoice.id_typed()).unwrap().is_active());

    let again = h
        .engine
        .create_invoice(
            &cashier,
            customer,
            d(2),
            Money::ZERO,
            &[InvoiceLineRequest::new(figs, 1, Money::new(30))],
        )
        .unwrap();
    assert_eq!(again.created_by(), cashier.actor_id());
}
