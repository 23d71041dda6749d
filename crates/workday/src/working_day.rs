use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_accounting::AccountBalances;
use stockbook_core::{DomainResult, LedgerError, Lifecycle, Money, UserId};

use crate::reconciliation::{DaySummary, Reconciliation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Open,
    Closed,
}

impl Lifecycle for DayStatus {
    const ENTITY: &'static str = "working_day";

    fn name(self) -> &'static str {
        match self {
            DayStatus::Open => "open",
            DayStatus::Closed => "closed",
        }
    }

    fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (DayStatus::Open, DayStatus::Closed) | (DayStatus::Closed, DayStatus::Open)
        )
    }

    fn rejection(self, next: Self) -> LedgerError {
        match (self, next) {
            (DayStatus::Open, DayStatus::Open) => LedgerError::DayNotClosed,
            _ => LedgerError::InvalidTransition {
                entity: Self::ENTITY,
                from: self.name(),
                to: next.name(),
            },
        }
    }
}

/// One accounting day. Unique per date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDay {
    date: NaiveDate,
    status: DayStatus,
    opening_balances: AccountBalances,
    closing_balances: Option<AccountBalances>,
    summary: Option<DaySummary>,
    reconciliation: Option<Reconciliation>,
    opened_by: UserId,
    opened_at: DateTime<Utc>,
    closed_by: Option<UserId>,
    closed_at: Option<DateTime<Utc>>,
    force_close_reason: Option<String>,
    reopen_count: u32,
}

impl WorkingDay {
    pub fn open(
        date: NaiveDate,
        opening_balances: AccountBalances,
        opened_by: UserId,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            status: DayStatus::Open,
            opening_balances,
            closing_balances: None,
            summary: None,
            reconciliation: None,
            opened_by,
            opened_at,
            closed_by: None,
            closed_at: None,
            force_close_reason: None,
            reopen_count: 0,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn status(&self) -> DayStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == DayStatus::Open
    }

    pub fn opening_balances(&self) -> AccountBalances {
        self.opening_balances
    }

    pub fn closing_balances(&self) -> Option<AccountBalances> {
        self.closing_balances
    }

    pub fn summary(&self) -> Option<&DaySummary> {
        self.summary.as_ref()
    }

    pub fn reconciliation(&self) -> Option<&Reconciliation> {
        self.reconciliation.as_ref()
    }

    pub fn cashbox_difference(&self) -> Option<Money> {
        self.reconciliation.map(|r| r.cashbox_difference)
    }

    pub fn opened_by(&self) -> UserId {
        self.opened_by
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn closed_by(&self) -> Option<UserId> {
        self.closed_by
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn force_close_reason(&self) -> Option<&str> {
        self.force_close_reason.as_deref()
    }

    pub fn reopen_count(&self) -> u32 {
        self.reopen_count
    }

    /// Normal close: the cashbox must reconcile within `tolerance`.
    pub fn close(
        &mut self,
        summary: DaySummary,
        counted_cash: Money,
        tolerance: Money,
        by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let reconciliation = self.reconcile(&summary, counted_cash)?;
        reconciliation.check(tolerance)?;
        self.finish_close(summary, reconciliation, None, by, at)
    }

    /// Privileged close that accepts any cashbox difference.
    pub fn force_close(
        &mut self,
        summary: DaySummary,
        counted_cash: Money,
        reason: &str,
        by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if reason.trim().is_empty() {
            return Err(LedgerError::ForceCloseReasonRequired);
        }
        let reconciliation = self.reconcile(&summary, counted_cash)?;
        self.finish_close(summary, reconciliation, Some(reason.trim().to_string()), by, at)
    }

    /// Flip a closed day back to open for corrections. Opening balances are kept.
    pub fn reopen(&mut self) -> DomainResult<()> {
        if self.status != DayStatus::Closed {
            return Err(LedgerError::DayNotClosed);
        }
        self.status = self.status.transition(DayStatus::Open)?;
        self.closing_balances = None;
        self.summary = None;
        self.reconciliation = None;
        self.closed_by = None;
        self.closed_at = None;
        self.force_close_reason = None;
        self.reopen_count += 1;
        Ok(())
    }

    fn reconcile(&self, summary: &DaySummary, counted_cash: Money) -> DomainResult<Reconciliation> {
        if !self.is_open() {
            return Err(LedgerError::NoOpenWorkingDay { date: self.date });
        }
        Reconciliation::new(summary.expected_closing(&self.opening_balances)?, counted_cash)
    }

    fn finish_close(
        &mut self,
        summary: DaySummary,
        reconciliation: Reconciliation,
        reason: Option<String>,
        by: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.status = self.status.transition(DayStatus::Closed)?;
        self.closing_balances = Some(reconciliation.closing_balances());
        self.summary = Some(summary);
        self.reconciliation = Some(reconciliation);
        self.closed_by = Some(by);
        self.closed_at = Some(at);
        self.force_close_reason = reason;
        Ok(())
    }
}
