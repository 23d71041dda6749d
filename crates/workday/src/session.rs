//! The open-day gate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockbook_accounting::AccountBalances;
use stockbook_core::{DomainResult, LedgerError};

use crate::working_day::WorkingDay;

/// Proof that `date` is the currently open working day.
///
/// Calendar-scoped operations take one of these rather than consulting a
/// process-wide "current day".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySession {
    date: NaiveDate,
}

impl DaySession {
    /// The session of the open day among `days`, if any.
    pub fn current<'a, I>(days: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a WorkingDay>,
    {
        days.into_iter()
            .find(|d| d.is_open())
            .map(|d| DaySession { date: d.date() })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Fails with `NoOpenWorkingDay` unless `date` is this session's day.
    pub fn ensure_date(&self, date: NaiveDate) -> DomainResult<()> {
        if self.date != date {
            return Err(LedgerError::NoOpenWorkingDay { date });
        }
        Ok(())
    }
}

/// Session for an operation dated `date`.
pub fn require_open_day<'a, I>(days: I, date: NaiveDate) -> DomainResult<DaySession>
where
    I: IntoIterator<Item = &'a WorkingDay>,
{
    let session = DaySession::current(days).ok_or(LedgerError::NoOpenWorkingDay { date })?;
    session.ensure_date(date)?;
    Ok(session)
}

/// Fails with `AnotherDayOpen` if any day is open.
pub fn ensure_no_open_day<'a, I>(days: I) -> DomainResult<()>
where
    I: IntoIterator<Item = &'a WorkingDay>,
{
    match DaySession::current(days) {
        Some(open) => Err(LedgerError::AnotherDayOpen {
            open_date: open.date(),
        }),
        None => Ok(()),
    }
}

/// Opening balances for a new day: the closing balances of the latest closed
/// day before `date`, or `configured` when there is none.
pub fn opening_balances_for<'a, I>(days: I, date: NaiveDate, configured: AccountBalances) -> AccountBalances
where
    I: IntoIterator<Item = &'a WorkingDay>,
{
    days.into_iter()
        .filter(|d| d.date() < date)
        .filter_map(|d| d.closing_balances().map(|b| (d.date(), b)))
        .max_by_key(|(day, _)| *day)
        .map(|(_, balances)| balances)
        .unwrap_or(configured)
}
