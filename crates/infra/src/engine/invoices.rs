//! Invoice issuance, cancellation and sales returns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use stockbook_auth::{Authorizer, Operation};
use stockbook_core::{
    CustomerId, InvoiceId, InvoiceItemId, LedgerError, Money, ReturnId,
};
use stockbook_events::{AuditAction, AuditSink};
use stockbook_inventory::allocate;
use stockbook_invoicing::{Invoice, InvoiceDraft, InvoiceLineRequest, ReturnLine, SalesReturn};

use super::LedgerEngine;
use crate::context::OperationContext;
use crate::error::EngineResult;
use crate::ledger_store::LedgerStore;
use crate::settings::Settings;

/// Cartons of one invoice item the customer hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub invoice_id: InvoiceId,
    pub invoice_item_id: InvoiceItemId,
    pub cartons: i64,
}

impl<S, A, Z, C> LedgerEngine<S, A, Z, C>
where
    S: LedgerStore,
    A: Authorizer,
    Z: AuditSink,
    C: Settings,
{
    /// Issue an invoice, depleting lots in FIFO order.
    ///
    /// Lines are allocated one after another against the lots as already
    /// depleted by earlier lines, so two lines of the same product never
    /// claim the same cartons. Either the whole invoice lands (lots, invoice,
    /// customer balance) or nothing does.
    #[instrument(skip(self, ctx, lines), fields(actor = %ctx.actor_id(), lines = lines.len()))]
    pub fn create_invoice(
        &self,
        ctx: &OperationContext,
        customer_id: CustomerId,
        date: NaiveDate,
        discount: Money,
        lines: &[InvoiceLineRequest],
    ) -> EngineResult<Invoice> {
        self.execute(ctx, Operation::CreateInvoice, |state, trail| {
            state.session_for(date)?;
            state.customer(customer_id)?.ensure_active()?;

            let number = state.next_invoice_number();
            let mut draft = InvoiceDraft::new(InvoiceId::new(), number, customer_id, date, discount);
            for line in lines {
                line.validate()?;
                state.product(line.product_id)?;
                let plan = allocate(line.product_id, line.cartons, state.lots())?;
                for step in &plan {
                    state.lot_mut(step.shipment_item_id)?.commit_sale(step.cartons)?;
                }
                draft.add_line(line, &plan)?;
            }
            let invoice = draft.finish(ctx.actor_id(), ctx.now)?;

            state.customer_mut(customer_id)?.charge_invoice(invoice.total())?;
            state.invoices.insert(invoice.id_typed(), invoice.clone());

            let record = trail
                .entry(AuditAction::InvoiceCreated, invoice.id_typed())
                .with_after(&invoice);
            trail.push(record);
            Ok(invoice)
        })
    }

    /// Cancel an invoice: put its cartons back on the lots and take its total
    /// off the customer's balance. Terminal.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn cancel_invoice(&self, ctx: &OperationContext, invoice_id: InvoiceId) -> EngineResult<Invoice> {
        let window = self.settings.edit_window();
        self.execute(ctx, Operation::CancelInvoice, |state, trail| {
            let invoice = state.invoice_mut(invoice_id)?;
            let before = invoice.clone();
            invoice.cancel(ctx.actor_id(), ctx.now)?;
            window.ensure_open(before.date(), ctx.today())?;
            if before.items().iter().any(|item| item.returned_cartons > 0) {
                return Err(LedgerError::validation(
                    "invoice has active returns; cancel them first",
                ));
            }

            for item in before.items() {
                state.ensure_lot_unsettled(item.shipment_item_id)?;
                state.lot_mut(item.shipment_item_id)?.restore_sale(item.cartons)?;
            }
            state.customer_mut(before.customer_id())?.reverse_invoice(before.total())?;

            let after = state.invoice(invoice_id)?.clone();
            let record = trail
                .entry(AuditAction::InvoiceCancelled, invoice_id)
                .with_before(&before)
                .with_after(&after);
            trail.push(record);
            Ok(after)
        })
    }

    /// Invoices are never deleted; cancel them instead.
    pub fn delete_invoice(&self, ctx: &OperationContext, invoice_id: InvoiceId) -> EngineResult<()> {
        warn!(actor = %ctx.actor_id(), invoice = %invoice_id, "invoice deletion refused");
        Err(LedgerError::DeletionNotAllowed { entity: "invoice" }.into())
    }

    /// Take cartons back from a customer on the open working day.
    #[instrument(skip(self, ctx, lines, reason), fields(actor = %ctx.actor_id(), lines = lines.len()))]
    pub fn create_return(
        &self,
        ctx: &OperationContext,
        customer_id: CustomerId,
        date: NaiveDate,
        lines: &[ReturnRequest],
        reason: Option<&str>,
    ) -> EngineResult<SalesReturn> {
        self.execute(ctx, Operation::CreateReturn, |state, trail| {
            state.session_for(date)?;
            state.customer(customer_id)?;

            let mut return_lines = Vec::with_capacity(lines.len());
            for request in lines {
                let invoice = state.invoice(request.invoice_id)?;
                if invoice.customer_id() != customer_id {
                    return Err(LedgerError::InvoiceNotOwnedByCustomer {
                        invoice_id: request.invoice_id,
                    });
                }
                let item = invoice
                    .item(request.invoice_item_id)
                    .ok_or_else(|| LedgerError::not_found("invoice item"))?;
                let line = ReturnLine::for_item(item, request.cartons)?;

                state.ensure_lot_unsettled(line.shipment_item_id)?;
                state
                    .invoice_mut(request.invoice_id)?
                    .record_return(request.invoice_item_id, request.cartons)?;
                state.lot_mut(line.shipment_item_id)?.restore_sale(line.cartons)?;
                return_lines.push(line);
            }

            let sales_return = SalesReturn::new(
                ReturnId::new(),
                customer_id,
                date,
                return_lines,
                reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
                ctx.actor_id(),
                ctx.now,
            )?;
            state.customer_mut(customer_id)?.credit_return(sales_return.total())?;
            state.returns.insert(sales_return.id_typed(), sales_return.clone());

            let record = trail
                .entry(AuditAction::ReturnCreated, sales_return.id_typed())
                .with_after(&sales_return);
            trail.push(record);
            Ok(sales_return)
        })
    }

    /// Undo a return: the cartons are sold again and the credit is withdrawn.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn cancel_return(&self, ctx: &OperationContext, return_id: ReturnId) -> EngineResult<SalesReturn> {
        let window = self.settings.edit_window();
        self.execute(ctx, Operation::CancelReturn, |state, trail| {
            let sales_return = state.sales_return_mut(return_id)?;
            let before = sales_return.clone();
            sales_return.cancel(ctx.now)?;
            window.ensure_open(before.date(), ctx.today())?;

            for line in before.lines() {
                state.ensure_lot_unsettled(line.shipment_item_id)?;
                state.lot_mut(line.shipment_item_id)?.commit_sale(line.cartons)?;
                state
                    .invoice_mut(line.invoice_id)?
                    .revert_return(line.invoice_item_id, line.cartons)?;
            }
            state.customer_mut(before.customer_id())?.reverse_return(before.total())?;

            let after = state.sales_return(return_id)?.clone();
            let record = trail
                .entry(AuditAction::ReturnCancelled, return_id)
                .with_before(&before)
                .with_after(&after);
            trail.push(record);
            Ok(after)
        })
    }

    pub fn invoice(&self, invoice_id: InvoiceId) -> EngineResult<Invoice> {
        self.query(|state| state.invoice(invoice_id).cloned())
    }

    /// Active invoices of a customer that still carry a balance, oldest first.
    pub fn open_invoices(&self, customer_id: CustomerId) -> EngineResult<Vec<Invoice>> {
        self.query(|state| {
            state.customer(customer_id)?;
            let mut open: Vec<Invoice> = state
                .customer_invoices(customer_id)
                .filter(|inv| inv.is_open())
                .cloned()
                .collect();
            open.sort_by_key(|inv| (inv.date(), inv.id_typed()));
            Ok(open)
        })
    }
}
