//! Random operation sequences never break the customer balance identity or
//! drive a lot negative.

use proptest::prelude::*;

use stockbook_core::{CollectionId, InvoiceId, Money, ReturnId};
use stockbook_invoicing::InvoiceLineRequest;

use super::collections::collect;
use super::{Harness, d};
use crate::engine::ReturnRequest;

#[derive(Debug, Clone)]
enum Step {
    Sell { cartons: i64, price: i64 },
    Collect { amount: i64 },
    Return { invoice: usize, cartons: i64 },
    CancelInvoice(usize),
    CancelCollection(usize),
    CancelReturn(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (1i64..25, 1i64..500).prop_map(|(cartons, price)| Step::Sell { cartons, price }),
        3 => (1i64..5_000).prop_map(|amount| Step::Collect { amount }),
        2 => (0usize..8, 1i64..6).prop_map(|(invoice, cartons)| Step::Return { invoice, cartons }),
        1 => (0usize..8).prop_map(Step::CancelInvoice),
        1 => (0usize..8).prop_map(Step::CancelCollection),
        1 => (0usize..8).prop_map(Step::CancelReturn),
    ]
}

fn pick<T: Copy>(items: &[T], idx: usize) -> Option<T> {
    (!items.is_empty()).then(|| items[idx % items.len()])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    #[test]
    fn customer_balance_always_matches_records(steps in prop::collection::vec(step(), 1..30)) {
        let h = Harness::new();
        let figs = h.product("figs");
        let customer = h.customer("C-1", 250);
        let supplier = h.supplier("S-1", 0);
        let (first, _) = h.shipment(supplier, d(1), &[(figs, 40)]);
        let (second, _) = h.shipment(supplier, d(1), &[(figs, 40)]);
        h.open(d(1));
        let ctx = h.on(d(1));

        let mut invoices: Vec<InvoiceId> = Vec::new();
        let mut collections: Vec<CollectionId> = Vec::new();
        let mut returns: Vec<ReturnId> = Vec::new();

        for step in steps {
            match step {
                Step::Sell { cartons, price } => {
                    let line = InvoiceLineRequest::new(figs, cartons, Money::new(price));
                    if let Ok(invoice) = h.engine.create_invoice(&ctx, customer, d(1), Money::ZERO, &[line]) {
                        invoices.push(invoice.id_typed());
                    }
                }
                Step::Collect { amount } => {
                    collections.push(collect(&h, customer, d(1), amount).id_typed());
                }
                Step::Return { invoice, cartons } => {
                    if let Some(invoice_id) = pick(&invoices, invoice) {
                        let item = h.engine.invoice(invoice_id).unwrap().items()[0].id;
                        let request = ReturnRequest { invoice_id, invoice_item_id: item, cartons };
                        if let Ok(ret) = h.engine.create_return(&ctx, customer, d(1), &[request], None) {
                            returns.push(ret.id_typed());
                        }
                    }
                }
                Step::CancelInvoice(idx) => {
                    if let Some(id) = pick(&invoices, idx) {
                        let _ = h.engine.cancel_invoice(&ctx, id);
                    }
                }
                Step::CancelCollection(idx) => {
                    if let Some(id) = pick(&collections, idx) {
                        let _ = h.engine.cancel_collection(&ctx, id);
                    }
                }
                Step::CancelReturn(idx) => {
                    if let Some(id) = pick(&returns, idx) {
                        let _ = h.engine.cancel_return(&ctx, id);
                    }
                }
            }

            let statement = h.engine.customer_statement(customer).unwrap();
            prop_assert!(statement.is_consistent(), "{statement:?}");
            prop_assert!(statement.unallocated_credit >= Money::ZERO);
        }

        let mut on_hand = 0;
        for shipment in [first, second] {
            for lot in h.engine.shipment_items(shipment).unwrap() {
                prop_assert!(lot.check_invariants().is_ok());
                prop_assert!(lot.remaining() >= 0);
                on_hand += lot.remaining();
            }
        }
        prop_assert_eq!(h.engine.available_stock(figs).unwrap(), on_hand);

        for id in &invoices {
            let invoice = h.engine.invoice(*id).unwrap();
            prop_assert!(invoice.paid_amount() >= Money::ZERO);
            prop_assert!(invoice.paid_amount() <= invoice.total());
        }
    }
}
