//! Expenses and transfers between the cashbox and the bank.

use chrono::NaiveDate;
use tracing::instrument;

use stockbook_accounting::{AccountTransfer, CashAccount, Expense, NewExpense};
use stockbook_auth::{Authorizer, Operation};
use stockbook_core::{ExpenseId, Money, TransferId};
use stockbook_events::{AuditAction, AuditSink};

use super::LedgerEngine;
use crate::context::OperationContext;
use crate::error::EngineResult;
use crate::ledger_store::LedgerStore;
use crate::settings::Settings;

impl<S, A, Z, C> LedgerEngine<S, A, Z, C>
where
    S: LedgerStore,
    A: Authorizer,
    Z: AuditSink,
    C: Settings,
{
    /// Book an expense on the open working day. Supplier expenses are charged
    /// to a shipment that has not been settled yet.
    #[instrument(skip(self, ctx, input), fields(actor = %ctx.actor_id(), amount = %input.amount))]
    pub fn create_expense(&self, ctx: &OperationContext, input: NewExpense) -> EngineResult<Expense> {
        self.execute(ctx, Operation::CreateExpense, |state, trail| {
            state.session_for(input.date)?;
            if let Some(shipment_id) = input.shipment_id {
                state.shipment(shipment_id)?.ensure_not_settled()?;
            }

            let expense = Expense::new(ExpenseId::new(), input, ctx.actor_id(), ctx.now)?;
            state.expenses.insert(expense.id_typed(), expense.clone());

            let record = trail
                .entry(AuditAction::ExpenseCreated, expense.id_typed())
                .with_after(&expense);
            trail.push(record);
            Ok(expense)
        })
    }

    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn cancel_expense(&self, ctx: &OperationContext, expense_id: ExpenseId) -> EngineResult<Expense> {
        let window = self.settings.edit_window();
        self.execute(ctx, Operation::CancelExpense, |state, trail| {
            let expense = state.expense_mut(expense_id)?;
            let before = expense.clone();
            expense.cancel(ctx.now)?;
            window.ensure_open(before.date(), ctx.today())?;
            if let Some(shipment_id) = before.shipment_id() {
                state.shipment(shipment_id)?.ensure_not_settled()?;
            }

            let after = state.expense(expense_id)?.clone();
            let record = trail
                .entry(AuditAction::ExpenseCancelled, expense_id)
                .with_before(&before)
                .with_after(&after);
            trail.push(record);
            Ok(after)
        })
    }

    /// Move money between the cashbox and the bank on the open working day.
    #[instrument(skip(self, ctx, note), fields(actor = %ctx.actor_id()))]
    pub fn create_transfer(
        &self,
        ctx: &OperationContext,
        date: NaiveDate,
        from: CashAccount,
        to: CashAccount,
        amount: Money,
        note: Option<&str>,
    ) -> EngineResult<AccountTransfer> {
        self.execute(ctx, Operation::CreateTransfer, |state, trail| {
            state.session_for(date)?;
            let transfer = AccountTransfer::new(
                TransferId::new(),
                date,
                from,
                to,
                amount,
                note.map(str::to_string),
                ctx.actor_id(),
                ctx.now,
            )?;
            state.transfers.insert(transfer.id, transfer.clone());

            let record = trail
                .entry(AuditAction::TransferCreated, transfer.id)
                .with_after(&transfer);
            trail.push(record);
            Ok(transfer)
        })
    }
}
