//! Day-close aggregation and cashbox reconciliation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockbook_accounting::{AccountBalances, AccountTransfer, Expense};
use stockbook_collections::Collection;
use stockbook_core::{DomainResult, LedgerError, Money};
use stockbook_inventory::WastageRecord;
use stockbook_invoicing::{Invoice, SalesReturn};

/// Records a day summary is aggregated from. Entries dated on other days
/// are ignored, as are cancelled records.
#[derive(Debug, Default)]
pub struct DayActivity<'a> {
    pub invoices: Vec<&'a Invoice>,
    pub returns: Vec<&'a SalesReturn>,
    pub collections: Vec<&'a Collection>,
    pub expenses: Vec<&'a Expense>,
    pub transfers: Vec<&'a AccountTransfer>,
    pub wastage: Vec<&'a WastageRecord>,
}

/// Aggregated totals of one working day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub invoice_count: u32,
    pub sales_total: Money,
    pub returns_total: Money,
    pub collections: AccountBalances,
    pub expenses: AccountBalances,
    pub transfers_in: AccountBalances,
    pub transfers_out: AccountBalances,
    pub wastage_cartons: i64,
}

impl DaySummary {
    pub fn aggregate(date: NaiveDate, activity: &DayActivity<'_>) -> DomainResult<Self> {
        let mut summary = DaySummary::default();

        for invoice in activity.invoices.iter().filter(|i| i.date() == date && i.is_active()) {
            summary.invoice_count += 1;
            summary.sales_total = summary.sales_total.checked_add(invoice.total())?;
        }
        for ret in activity.returns.iter().filter(|r| r.date() == date && r.is_active()) {
            summary.returns_total = summary.returns_total.checked_add(ret.total())?;
        }
        for c in activity.collections.iter().filter(|c| c.date() == date && c.is_confirmed()) {
            summary.collections.credit(c.payment_method().account(), c.amount())?;
        }
        for e in activity.expenses.iter().filter(|e| e.date() == date && e.is_active()) {
            summary.expenses.credit(e.account(), e.amount())?;
        }
        for t in activity.transfers.iter().filter(|t| t.date == date) {
            summary.transfers_out.credit(t.from, t.amount)?;
            summary.transfers_in.credit(t.to, t.amount)?;
        }
        summary.wastage_cartons = activity
            .wastage
            .iter()
            .filter(|w| w.date == date)
            .map(|w| w.cartons)
            .sum();

        Ok(summary)
    }

    /// `opening + collections - expenses + transfers_in - transfers_out`, per account.
    pub fn expected_closing(&self, opening: &AccountBalances) -> DomainResult<AccountBalances> {
        opening
            .plus(&self.collections)?
            .minus(&self.expenses)?
            .plus(&self.transfers_in)?
            .minus(&self.transfers_out)
    }
}

/// Outcome of comparing counted cash with the books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub expected_closing: AccountBalances,
    pub counted_cash: Money,
    /// `counted_cash - expected_closing.cashbox`.
    pub cashbox_difference: Money,
}

impl Reconciliation {
    pub fn new(expected_closing: AccountBalances, counted_cash: Money) -> DomainResult<Self> {
        Ok(Self {
            expected_closing,
            counted_cash,
            cashbox_difference: counted_cash.checked_sub(expected_closing.cashbox)?,
        })
    }

    /// Actual closing balances: the counted cash replaces the expected cashbox.
    pub fn closing_balances(&self) -> AccountBalances {
        AccountBalances::new(self.counted_cash, self.expected_closing.bank)
    }

    pub fn check(&self, tolerance: Money) -> DomainResult<()> {
        if self.cashbox_difference.abs() > tolerance.abs() {
            return Err(LedgerError::CashboxMismatch {
                difference: self.cashbox_difference,
                tolerance,
            });
        }
        Ok(())
    }
}
