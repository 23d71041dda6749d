//! Working-day open/close/reopen.

use chrono::NaiveDate;
use tracing::{info, instrument};

use stockbook_accounting::AccountBalances;
use stockbook_auth::{Authorizer, Operation};
use stockbook_core::{DomainResult, LedgerError, Money};
use stockbook_events::{AuditAction, AuditSink};
use stockbook_workday::{
    DayActivity, DaySummary, WorkingDay, ensure_no_open_day, opening_balances_for,
};

use super::LedgerEngine;
use crate::context::OperationContext;
use crate::error::EngineResult;
use crate::ledger_store::{LedgerState, LedgerStore};
use crate::settings::Settings;

impl<S, A, Z, C> LedgerEngine<S, A, Z, C>
where
    S: LedgerStore,
    A: Authorizer,
    Z: AuditSink,
    C: Settings,
{
    /// Open `date` for business.
    ///
    /// Opening balances are the closing balances of the latest closed day
    /// before `date`, or the configured opening balances for the first day.
    /// Opening a date that was already closed is a reopen and needs that
    /// permission as well.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn open_day(&self, ctx: &OperationContext, date: NaiveDate) -> EngineResult<WorkingDay> {
        let already_closed = self.query(|state| {
            Ok(state.working_days.get(&date).is_some_and(|day| !day.is_open()))
        })?;
        if already_closed {
            self.authorize(ctx, Operation::OpenDay)?;
            return self.reopen_day(ctx, date);
        }

        let configured = self.settings.opening_balances();
        self.execute(ctx, Operation::OpenDay, |state, trail| {
            ensure_no_open_day(state.working_days.values())?;
            if state.working_days.contains_key(&date) {
                return Err(LedgerError::validation(format!("working day {date} already exists")));
            }
            let opening = opening_balances_for(state.working_days.values(), date, configured);
            let day = WorkingDay::open(date, opening, ctx.actor_id(), ctx.now);
            state.working_days.insert(date, day.clone());

            let record = trail.entry(AuditAction::DayOpened, date).with_after(&day);
            trail.push(record);
            Ok(day)
        })
    }

    /// Close the open day; the counted cash must match the books within
    /// the configured tolerance.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id(), counted_cash = %counted_cash))]
    pub fn close_day(&self, ctx: &OperationContext, counted_cash: Money) -> EngineResult<WorkingDay> {
        let tolerance = self.settings.cashbox_tolerance();
        self.execute(ctx, Operation::CloseDay, |state, trail| {
            let (date, summary) = summarize_open_day(state, ctx.today())?;
            let day = open_day_mut(state, date)?;
            let before = day.clone();
            day.close(summary, counted_cash, tolerance, ctx.actor_id(), ctx.now)?;
            let after = day.clone();

            info!(%date, cashbox_difference = ?after.cashbox_difference(), "working day closed");
            let record = trail
                .entry(AuditAction::DayClosed, date)
                .with_before(&before)
                .with_after(&after);
            trail.push(record);
            Ok(after)
        })
    }

    /// Close the open day whatever the cashbox difference. `reason` is kept
    /// on the day and in the audit record.
    #[instrument(skip(self, ctx, reason), fields(actor = %ctx.actor_id(), counted_cash = %counted_cash))]
    pub fn force_close_day(
        &self,
        ctx: &OperationContext,
        reason: &str,
        counted_cash: Money,
    ) -> EngineResult<WorkingDay> {
        self.execute(ctx, Operation::ForceCloseDay, |state, trail| {
            let (date, summary) = summarize_open_day(state, ctx.today())?;
            let day = open_day_mut(state, date)?;
            let before = day.clone();
            day.force_close(summary, counted_cash, reason, ctx.actor_id(), ctx.now)?;
            let after = day.clone();

            let record = trail
                .entry(AuditAction::DayForceClosed, date)
                .with_before(&before)
                .with_after(&after)
                .with_reason(reason.trim());
            trail.push(record);
            Ok(after)
        })
    }

    /// Flip a closed day back to open for corrections.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn reopen_day(&self, ctx: &OperationContext, date: NaiveDate) -> EngineResult<WorkingDay> {
        self.execute(ctx, Operation::ReopenDay, |state, trail| {
            let closed = state
                .working_days
                .get(&date)
                .ok_or_else(|| LedgerError::not_found("working day"))?;
            if closed.is_open() {
                return Err(LedgerError::DayNotClosed);
            }
            ensure_no_open_day(state.working_days.values())?;

            let day = state
                .working_days
                .get_mut(&date)
                .ok_or_else(|| LedgerError::not_found("working day"))?;
            let before = day.clone();
            day.reopen()?;
            let after = day.clone();

            let record = trail
                .entry(AuditAction::DayReopened, date)
                .with_before(&before)
                .with_after(&after);
            trail.push(record);
            Ok(after)
        })
    }

    /// Summary and expected closing balances of the open day `date`, without
    /// closing it.
    pub fn preview_close(&self, date: NaiveDate) -> EngineResult<(DaySummary, AccountBalances)> {
        self.query(|state| {
            state.session_for(date)?;
            let (_, summary) = summarize_open_day(state, date)?;
            let opening = state
                .working_days
                .get(&date)
                .map(WorkingDay::opening_balances)
                .ok_or(LedgerError::NoOpenWorkingDay { date })?;
            let expected = summary.expected_closing(&opening)?;
            Ok((summary, expected))
        })
    }

    /// The day currently open, if any.
    pub fn current_day(&self) -> EngineResult<Option<WorkingDay>> {
        self.query(|state| Ok(state.current_day().cloned()))
    }

    pub fn working_day(&self, date: NaiveDate) -> EngineResult<WorkingDay> {
        self.query(|state| {
            state
                .working_days
                .get(&date)
                .cloned()
                .ok_or_else(|| LedgerError::not_found("working day"))
        })
    }
}

/// Totals of the open day, computed from every record in the ledger.
fn summarize_open_day(state: &LedgerState, today: NaiveDate) -> DomainResult<(NaiveDate, DaySummary)> {
    let date = state
        .current_day()
        .map(WorkingDay::date)
        .ok_or(LedgerError::NoOpenWorkingDay { date: today })?;
    let activity = DayActivity {
        invoices: state.invoices.values().collect(),
        returns: state.returns.values().collect(),
        collections: state.collections.values().collect(),
        expenses: state.expenses.values().collect(),
        transfers: state.transfers.values().collect(),
        wastage: state.wastage.values().collect(),
    };
    Ok((date, DaySummary::aggregate(date, &activity)?))
}

fn open_day_mut(state: &mut LedgerState, date: NaiveDate) -> DomainResult<&mut WorkingDay> {
    state
        .working_days
        .get_mut(&date)
        .ok_or(LedgerError::NoOpenWorkingDay { date })
}
