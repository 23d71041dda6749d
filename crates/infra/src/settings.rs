//! Settings lookup consumed by the ledger.
//!
//! Where settings are stored is not the ledger's concern; it only asks for
//! named values when an operation needs them (e.g. the commission rate at
//! settlement time).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockbook_accounting::AccountBalances;
use stockbook_core::{EditWindow, Money};

pub const COMMISSION_RATE_BPS: &str = "commission_rate_bps";
pub const EDIT_WINDOW_DAYS: &str = "edit_window_days";
pub const CASHBOX_TOLERANCE: &str = "cashbox_tolerance";
pub const OPENING_CASHBOX: &str = "opening_cashbox";
pub const OPENING_BANK: &str = "opening_bank";

/// Named numeric/string configuration.
pub trait Settings: Send + Sync {
    fn number(&self, name: &str) -> Option<i64>;

    fn text(&self, name: &str) -> Option<String>;

    /// Commission in basis points; 600 (6%) when unset.
    fn commission_rate_bps(&self) -> u32 {
        self.number(COMMISSION_RATE_BPS)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(600)
    }

    /// Days a calendar-scoped record stays cancellable; 7 when unset.
    fn edit_window_days(&self) -> i64 {
        self.number(EDIT_WINDOW_DAYS)
            .unwrap_or(EditWindow::default().window_days())
    }

    fn edit_window(&self) -> EditWindow {
        EditWindow::days(self.edit_window_days())
    }

    fn cashbox_tolerance(&self) -> Money {
        Money::new(self.number(CASHBOX_TOLERANCE).unwrap_or(0))
    }

    fn opening_cashbox(&self) -> Money {
        Money::new(self.number(OPENING_CASHBOX).unwrap_or(0))
    }

    fn opening_bank(&self) -> Money {
        Money::new(self.number(OPENING_BANK).unwrap_or(0))
    }

    /// Balances the very first working day opens with.
    fn opening_balances(&self) -> AccountBalances {
        AccountBalances::new(self.opening_cashbox(), self.opening_bank())
    }
}

impl<S> Settings for Arc<S>
where
    S: Settings + ?Sized,
{
    fn number(&self, name: &str) -> Option<i64> {
        (**self).number(name)
    }

    fn text(&self, name: &str) -> Option<String> {
        (**self).text(name)
    }
}

/// Fixed settings, deserializable from a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticSettings {
    pub commission_rate_bps: u32,
    pub edit_window_days: i64,
    pub cashbox_tolerance: i64,
    pub opening_cashbox: i64,
    pub opening_bank: i64,
    /// Any other named value.
    pub extra: BTreeMap<String, JsonValue>,
}

impl Default for StaticSettings {
    fn default() -> Self {
        Self {
            commission_rate_bps: 600,
            edit_window_days: 7,
            cashbox_tolerance: 0,
            opening_cashbox: 0,
            opening_bank: 0,
            extra: BTreeMap::new(),
        }
    }
}

impl StaticSettings {
    pub fn with_commission_bps(mut self, bps: u32) -> Self {
        self.commission_rate_bps = bps;
        self
    }

    pub fn with_edit_window_days(mut self, days: i64) -> Self {
        self.edit_window_days = days;
        self
    }

    pub fn with_cashbox_tolerance(mut self, tolerance: i64) -> Self {
        self.cashbox_tolerance = tolerance;
        self
    }

    pub fn with_opening_balances(mut self, cashbox: i64, bank: i64) -> Self {
        self.opening_cashbox = cashbox;
        self.opening_bank = bank;
        self
    }
}

impl Settings for StaticSettings {
    fn number(&self, name: &str) -> Option<i64> {
        match name {
            COMMISSION_RATE_BPS => Some(i64::from(self.commission_rate_bps)),
            EDIT_WINDOW_DAYS => Some(self.edit_window_days),
            CASHBOX_TOLERANCE => Some(self.cashbox_tolerance),
            OPENING_CASHBOX => Some(self.opening_cashbox),
            OPENING_BANK => Some(self.opening_bank),
            other => self.extra.get(other).and_then(JsonValue::as_i64),
        }
    }

    fn text(&self, name: &str) -> Option<String> {
        match self.extra.get(name)? {
            JsonValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
