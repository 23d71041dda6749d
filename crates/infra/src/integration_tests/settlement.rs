use stockbook_accounting::{CashAccount, ExpenseKind, NewExpense};
use stockbook_core::{LedgerError, Money, ShipmentId};
use stockbook_events::AuditAction;

use super::{Harness, d};
use crate::engine::ReturnRequest;
use crate::settings::StaticSettings;

fn supplier_expense(h: &Harness, shipment: ShipmentId, amount: i64) {
    h.engine
        .create_expense(
            &h.on(d(2)),
            NewExpense {
                date: d(2),
                amount: Money::new(amount),
                kind: ExpenseKind::Supplier,
                shipment_id: Some(shipment),
                account: CashAccount::Cashbox,
                description: "freight".into(),
            },
        )
        .unwrap();
}

#[test]
fn balances_chain_from_one_settlement_to_the_next() {
    let h = Harness::new();
    let dates = h.product("dates");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 10_000);
    let (first, _) = h.shipment(supplier, d(1), &[(dates, 50)]);
    let (second, _) = h.shipment(supplier, d(1), &[(dates, 30)]);
    h.open(d(2));
    h.sell(customer, d(2), &[(dates, 80, 1_000)]);

    let statement = h.engine.settle_shipment(&h.on(d(2)), first, None).unwrap();
    assert_eq!(statement.gross_sales, Money::new(50_000));
    assert_eq!(statement.commission, Money::new(3_000));
    assert_eq!(statement.previous_balance, Money::new(10_000));
    assert_eq!(statement.final_balance, Money::new(57_000));

    let statement = h.engine.settle_shipment(&h.on(d(2)), second, None).unwrap();
    assert_eq!(statement.commission, Money::new(1_800));
    assert_eq!(statement.previous_balance, Money::new(57_000));
    assert_eq!(statement.final_balance, Money::new(85_200));

    assert_eq!(h.engine.supplier(supplier).unwrap().balance(), Money::new(85_200));
    let shipment = h.engine.shipment(second).unwrap();
    assert!(shipment.is_settled());
    assert_eq!(shipment.final_supplier_balance(), Some(Money::new(85_200)));
    assert_eq!(h.engine.settlement_statement(second).unwrap(), statement);
}

#[test]
fn settling_twice_is_refused() {
    let h = Harness::new();
    let dates = h.product("dates");
    let supplier = h.supplier("S-1", 0);
    let (shipment, _) = h.shipment(supplier, d(1), &[(dates, 5)]);

    h.engine.settle_shipment(&h.on(d(2)), shipment, None).unwrap();
    let err = h.engine.settle_shipment(&h.on(d(2)), shipment, None).unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::AlreadySettled));
}

#[test]
fn expenses_returns_and_commission_rate_shape_the_statement() {
    let h = Harness::with_settings(StaticSettings::default().with_commission_bps(500));
    let dates = h.product("dates");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    let (shipment, _) = h.shipment(supplier, d(1), &[(dates, 20)]);
    h.open(d(2));
    let invoice = h.sell(customer, d(2), &[(dates, 20, 100)]);
    h.engine
        .create_return(
            &h.on(d(2)),
            customer,
            d(2),
            &[ReturnRequest {
                invoice_id: invoice.id_typed(),
                invoice_item_id: invoice.items()[0].id,
                cartons: 4,
            }],
            None,
        )
        .unwrap();
    supplier_expense(&h, shipment, 150);

    let statement = h.engine.settle_shipment(&h.on(d(2)), shipment, None).unwrap();
    assert_eq!(statement.gross_sales, Money::new(2_000));
    assert_eq!(statement.returns, Money::new(400));
    assert_eq!(statement.net_sales, Money::new(1_600));
    assert_eq!(statement.commission, Money::new(80));
    assert_eq!(statement.supplier_expenses, Money::new(150));
    assert_eq!(statement.final_balance, Money::new(1_370));

    let err = h
        .engine
        .create_expense(
            &h.on(d(2)),
            NewExpense {
                date: d(2),
                amount: Money::new(10),
                kind: ExpenseKind::Supplier,
                shipment_id: Some(shipment),
                account: CashAccount::Cashbox,
                description: "late freight".into(),
            },
        )
        .unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::AlreadySettled));
}

#[test]
fn unsold_stock_moves_to_the_successor_and_keeps_selling() {
    let h = Harness::new();
    let dates = h.product("dates");
    let figs = h.product("figs");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    let (first, first_lots) = h.shipment(supplier, d(1), &[(dates, 100)]);
    let (second, _) = h.shipment(supplier, d(1), &[(figs, 10)]);
    h.open(d(2));
    h.sell(customer, d(2), &[(dates, 60, 10)]);

    let statement = h.engine.settle_shipment(&h.on(d(2)), first, Some(second)).unwrap();
    assert_eq!(statement.carryovers.len(), 1);
    let carried = &statement.carryovers[0];
    assert_eq!(carried.from_shipment_item_id, first_lots[0]);
    assert_eq!(carried.cartons, 40);

    assert_eq!(h.remaining(first), vec![0]);
    let target = h
        .engine
        .shipment_items(second)
        .unwrap()
        .into_iter()
        .find(|lot| lot.product_id() == dates)
        .unwrap();
    assert_eq!(target.cartons(), 0);
    assert_eq!(target.carryover_in_cartons(), 40);
    assert_eq!(h.engine.available_stock(dates).unwrap(), 40);

    let invoice = h.sell(customer, d(2), &[(dates, 5, 10)]);
    assert_eq!(invoice.items()[0].shipment_id, second);
}

#[test]
fn unsettle_restores_stock_and_supplier_balance() {
    let h = Harness::new();
    let dates = h.product("dates");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 500);
    let (first, _) = h.shipment(supplier, d(1), &[(dates, 100)]);
    let (second, _) = h.shipment(supplier, d(1), &[]);
    h.open(d(2));
    h.sell(customer, d(2), &[(dates, 60, 10)]);

    h.engine.settle_shipment(&h.on(d(2)), first, Some(second)).unwrap();
    assert_eq!(h.engine.shipment_items(second).unwrap().len(), 1);

    let shipment = h.engine.unsettle_shipment(&h.on(d(2)), first).unwrap();
    assert!(!shipment.is_settled());
    assert_eq!(shipment.final_supplier_balance(), None);
    assert_eq!(h.remaining(first), vec![40]);
    assert!(h.engine.shipment_items(second).unwrap().is_empty());
    assert_eq!(h.engine.supplier(supplier).unwrap().balance(), Money::new(500));
    assert!(h.engine.settlement_statement(first).is_err());
    assert_eq!(
        h.engine.audit().last().unwrap().action,
        AuditAction::ShipmentUnsettled
    );

    let again = h.engine.settle_shipment(&h.on(d(2)), first, None).unwrap();
    assert_eq!(again.previous_balance, Money::new(500));
}

#[test]
fn unsettle_is_refused_once_carried_stock_has_sold() {
    let h = Harness::new();
    let dates = h.product("dates");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    let (first, _) = h.shipment(supplier, d(1), &[(dates, 10)]);
    let (second, _) = h.shipment(supplier, d(1), &[]);
    h.open(d(2));
    h.engine.settle_shipment(&h.on(d(2)), first, Some(second)).unwrap();
    h.sell(customer, d(2), &[(dates, 1, 10)]);

    let err = h.engine.unsettle_shipment(&h.on(d(2)), first).unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::CannotUnsettleCarryoverSold));
    assert!(h.engine.shipment(first).unwrap().is_settled());
    assert_eq!(h.remaining(second), vec![9]);
}

#[test]
fn unsettle_is_refused_behind_a_later_settlement() {
    let h = Harness::new();
    let dates = h.product("dates");
    let supplier = h.supplier("S-1", 0);
    let (first, _) = h.shipment(supplier, d(1), &[(dates, 10)]);
    let (second, _) = h.shipment(supplier, d(1), &[(dates, 10)]);
    h.engine.settle_shipment(&h.on(d(2)), first, None).unwrap();
    h.engine.settle_shipment(&h.on(d(2)), second, None).unwrap();

    let err = h.engine.unsettle_shipment(&h.on(d(2)), first).unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::LaterShipmentSettled));
    h.engine.unsettle_shipment(&h.on(d(2)), second).unwrap();
    h.engine.unsettle_shipment(&h.on(d(2)), first).unwrap();
}

#[test]
fn out_of_order_settlements_chain_in_the_order_they_were_made() {
    let h = Harness::new();
    let dates = h.product("dates");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 10_000);
    let (first, _) = h.shipment(supplier, d(1), &[(dates, 50)]);
    let (second, _) = h.shipment(supplier, d(1), &[(dates, 30)]);
    let (third, _) = h.shipment(supplier, d(1), &[(dates, 10)]);
    h.open(d(2));
    h.sell(customer, d(2), &[(dates, 90, 1_000)]);

    let statement = h.engine.settle_shipment(&h.on(d(2)), second, None).unwrap();
    assert_eq!(statement.previous_balance, Money::new(10_000));
    assert_eq!(statement.final_balance, Money::new(38_200));

    let statement = h.engine.settle_shipment(&h.on(d(2)), first, None).unwrap();
    assert_eq!(statement.previous_balance, Money::new(38_200));
    assert_eq!(statement.final_balance, Money::new(85_200));

    let statement = h.engine.settle_shipment(&h.on(d(2)), third, None).unwrap();
    assert_eq!(statement.previous_balance, Money::new(85_200));
    assert_eq!(statement.final_balance, Money::new(94_600));
    assert_eq!(h.engine.supplier(supplier).unwrap().balance(), Money::new(94_600));
}

#[test]
fn unsettle_follows_settlement_order_not_fifo_order() {
    let h = Harness::new();
    let dates = h.product("dates");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 10_000);
    let (first, _) = h.shipment(supplier, d(1), &[(dates, 50)]);
    let (second, _) = h.shipment(supplier, d(1), &[(dates, 30)]);
    h.open(d(2));
    h.sell(customer, d(2), &[(dates, 80, 1_000)]);
    h.engine.settle_shipment(&h.on(d(2)), second, None).unwrap();
    h.engine.settle_shipment(&h.on(d(2)), first, None).unwrap();

    let err = h.engine.unsettle_shipment(&h.on(d(2)), second).unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::LaterShipmentSettled));
    assert!(h.engine.shipment(second).unwrap().is_settled());
    assert_eq!(h.engine.supplier(supplier).unwrap().balance(), Money::new(85_200));

    h.engine.unsettle_shipment(&h.on(d(2)), first).unwrap();
    assert_eq!(h.engine.supplier(supplier).unwrap().balance(), Money::new(38_200));
    h.engine.unsettle_shipment(&h.on(d(2)), second).unwrap();
    assert_eq!(h.engine.supplier(supplier).unwrap().balance(), Money::new(10_000));

    let again = h.engine.settle_shipment(&h.on(d(2)), first, None).unwrap();
    assert_eq!(again.previous_balance, Money::new(10_000));
    assert_eq!(again.final_balance, Money::new(57_000));
}

#[test]
fn settled_lots_are_frozen() {
    let h = Harness::new();
    let dates = h.product("dates");
    let customer = h.customer("C-1", 0);
    let supplier = h.supplier("S-1", 0);
    let (shipment, lots) = h.shipment(supplier, d(1), &[(dates, 10)]);
    h.open(d(2));
    let invoice = h.sell(customer, d(2), &[(dates, 2, 10)]);
    h.engine.settle_shipment(&h.on(d(2)), shipment, None).unwrap();

    assert_eq!(h.engine.available_stock(dates).unwrap(), 0);
    let err = h
        .engine
        .record_wastage(&h.on(d(2)), lots[0], 1, d(2), "crushed")
        .unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::LotSettled));
    let err = h.engine.cancel_invoice(&h.on(d(2)), invoice.id_typed()).unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::LotSettled));
    let err = h
        .engine
        .add_shipment_item(
            &h.on(d(2)),
            shipment,
            &stockbook_inventory::NewShipmentItem {
                product_id: dates,
                cartons: 1,
                weight_per_unit: 1,
                unit_cost: Money::new(1),
            },
        )
        .unwrap_err();
    assert_eq!(err.as_ledger(), Some(&LedgerError::AlreadySettled));
}

#[test]
fn successor_must_be_an_unsettled_shipment_of_the_same_supplier() {
    let h = Harness::new();
    let dates = h.product("dates");
    let supplier = h.supplier("S-1", 0);
    let other = h.supplier("S-2", 0);
    let (shipment, _) = h.shipment(supplier, d(1), &[(dates, 10)]);
    let (foreign, _) = h.shipment(other, d(1), &[]);

    let err = h
        .engine
        .settle_shipment(&h.on(d(2)), shipment, Some(shipment))
        .unwrap_err();
    assert_eq!(err.code(), "validation");
    let err = h
        .engine
        .settle_shipment(&h.on(d(2)), shipment, Some(foreign))
        .unwrap_err();
    assert_eq!(err.code(), "validation");
    assert!(!h.engine.shipment(shipment).unwrap().is_settled());
}

#[test]
fn successor_cannot_precede_the_settled_shipment() {
    let h = Harness::new();
    let dates = h.product("dates");
    let supplier = h.supplier("S-1", 0);
    let (earlier, _) = h.shipment(supplier, d(1), &[(dates, 5)]);
    let (later, _) = h.shipment(supplier, d(1), &[(dates, 10)]);

    let err = h
        .engine
        .settle_shipment(&h.on(d(2)), later, Some(earlier))
        .unwrap_err();
    assert_eq!(err.code(), "validation");
    assert!(!h.engine.shipment(later).unwrap().is_settled());
    assert_eq!(h.remaining(earlier), vec![5]);
}

#[test]
fn wastage_is_taken_off_the_lot() {
    let h = Harness::new();
    let dates = h.product("dates");
    let supplier = h.supplier("S-1", 0);
    let (shipment, lots) = h.shipment(supplier, d(1), &[(dates, 10)]);
    h.open(d(2));

    h.engine
        .record_wastage(&h.on(d(2)), lots[0], 3, d(2), "mould")
        .unwrap();
    assert_eq!(h.remaining(shipment), vec![7]);

    let err = h
        .engine
        .record_wastage(&h.on(d(2)), lots[0], 8, d(2), "mould")
        .unwrap_err();
    assert_eq!(err.code(), "insufficient_stock");
    assert_eq!(h.remaining(shipment), vec![7]);

    let err = h.engine.delete_shipment(&h.on(d(2)), shipment).unwrap_err();
    assert_eq!(err.code(), "deletion_not_allowed");
}
