//! Correction window for calendar-scoped records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DomainResult, LedgerError};
use crate::value_object::ValueObject;

/// How many days after its date a record may still be cancelled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditWindow(i64);

impl ValueObject for EditWindow {}

impl EditWindow {
    pub const fn days(days: i64) -> Self {
        Self(days)
    }

    pub fn window_days(self) -> i64 {
        self.0
    }

    /// Fails with `EditWindowExpired` once `today - record_date > days`.
    pub fn ensure_open(self, record_date: NaiveDate, today: NaiveDate) -> DomainResult<()> {
        let age = (today - record_date).num_days();
        if age > self.0 {
            return Err(LedgerError::EditWindowExpired {
                window_days: self.0,
            });
        }
        Ok(())
    }
}

impl Default for EditWindow {
    fn default() -> Self {
        Self(7)
    }
}
