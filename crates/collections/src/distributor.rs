//! Collection distribution and its reversal.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use stockbook_core::{DomainResult, InvoiceId, LedgerError, Money};
use stockbook_invoicing::Invoice;

use crate::collection::{Collection, CollectionAllocation, DistributionMethod};

/// Caller-chosen amount for one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualAllocation {
    pub invoice_id: InvoiceId,
    pub amount: Money,
}

/// Plan how `collection` is spread over `invoices`.
///
/// `invoices` may contain any invoices; automatic strategies only consider
/// the collection customer's active invoices with a positive balance. The
/// plan never exceeds the collection amount or any invoice balance; what
/// does not fit stays unallocated.
pub fn distribute<'a, I>(
    collection: &Collection,
    invoices: I,
    manual_plan: &[ManualAllocation],
) -> DomainResult<Vec<CollectionAllocation>>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    match collection.distribution_method() {
        DistributionMethod::OldestFirst | DistributionMethod::NewestFirst => {
            greedy(collection, invoices)
        }
        DistributionMethod::Manual => manual(collection, invoices, manual_plan),
    }
}

fn greedy<'a, I>(collection: &Collection, invoices: I) -> DomainResult<Vec<CollectionAllocation>>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let mut open: Vec<&Invoice> = invoices
        .into_iter()
        .filter(|inv| inv.customer_id() == collection.customer_id() && inv.is_open())
        .collect();
    match collection.distribution_method() {
        DistributionMethod::NewestFirst => {
            open.sort_by_key(|inv| (Reverse(inv.date()), inv.id_typed()))
        }
        _ => open.sort_by_key(|inv| (inv.date(), inv.id_typed())),
    }

    let mut left = collection.amount();
    let mut plan = Vec::new();
    for invoice in open {
        if !left.is_positive() {
            break;
        }
        let take = invoice.balance().min(left);
        plan.push(CollectionAllocation {
            collection_id: collection.id_typed(),
            invoice_id: invoice.id_typed(),
            amount: take,
        });
        left = left.checked_sub(take)?;
    }
    Ok(plan)
}

fn manual<'a, I>(
    collection: &Collection,
    invoices: I,
    manual_plan: &[ManualAllocation],
) -> DomainResult<Vec<CollectionAllocation>>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let by_id: HashMap<InvoiceId, &Invoice> =
        invoices.into_iter().map(|inv| (inv.id_typed(), inv)).collect();

    for entry in manual_plan {
        let invoice = by_id
            .get(&entry.invoice_id)
            .ok_or_else(|| LedgerError::not_found("invoice"))?;
        if invoice.customer_id() != collection.customer_id() {
            return Err(LedgerError::InvoiceNotOwnedByCustomer {
                invoice_id: entry.invoice_id,
            });
        }
        if !entry.amount.is_positive() {
            return Err(LedgerError::validation("manual allocation amounts must be positive"));
        }
    }

    let allocated = Money::try_sum(manual_plan.iter().map(|e| e.amount))?;
    if allocated > collection.amount() {
        return Err(LedgerError::AllocationExceedsCollection {
            allocated,
            amount: collection.amount(),
        });
    }

    let mut per_invoice: HashMap<InvoiceId, Money> = HashMap::new();
    for entry in manual_plan {
        let slot = per_invoice.entry(entry.invoice_id).or_default();
        *slot = slot.checked_add(entry.amount)?;
    }
    for (invoice_id, amount) in &per_invoice {
        let invoice = by_id[invoice_id];
        if !invoice.is_active() {
            return Err(LedgerError::validation(format!(
                "invoice {} is cancelled",
                invoice.number()
            )));
        }
        if *amount > invoice.balance() {
            return Err(LedgerError::validation(format!(
                "allocation {amount} exceeds invoice {} balance {}",
                invoice.number(),
                invoice.balance()
            )));
        }
    }

    Ok(manual_plan
        .iter()
        .map(|entry| CollectionAllocation {
            collection_id: collection.id_typed(),
            invoice_id: entry.invoice_id,
            amount: entry.amount,
        })
        .collect())
}

/// Apply a plan: `paid_amount += x`, `balance -= x` on each invoice.
pub fn apply_allocations(
    allocations: &[CollectionAllocation],
    invoices: &mut BTreeMap<InvoiceId, Invoice>,
) -> DomainResult<()> {
    for allocation in allocations {
        invoices
            .get_mut(&allocation.invoice_id)
            .ok_or_else(|| LedgerError::not_found("invoice"))?
            .apply_payment(allocation.amount)?;
    }
    Ok(())
}

/// Undo [`apply_allocations`].
pub fn reverse_allocations(
    allocations: &[CollectionAllocation],
    invoices: &mut BTreeMap<InvoiceId, Invoice>,
) -> DomainResult<()> {
    for allocation in allocations {
        invoices
            .get_mut(&allocation.invoice_id)
            .ok_or_else(|| LedgerError::not_found("invoice"))?
            .reverse_payment(allocation.amount)?;
    }
    Ok(())
}
