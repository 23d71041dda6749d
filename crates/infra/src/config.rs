//! Environment-driven configuration.
//!
//! ```text
//! STOCKBOOK_SETTINGS_JSON      settings document, inline or a file path (applied first)
//! STOCKBOOK_COMMISSION_BPS     commission in basis points (600 = 6%)
//! STOCKBOOK_EDIT_WINDOW_DAYS   days a record stays editable
//! STOCKBOOK_CASHBOX_TOLERANCE  accepted cashbox difference at day close
//! STOCKBOOK_OPENING_CASHBOX    first-day opening cashbox
//! STOCKBOOK_OPENING_BANK       first-day opening bank balance
//! ```

use std::str::FromStr;

use anyhow::{Context, bail};

use crate::settings::StaticSettings;

pub const SETTINGS_JSON: &str = "STOCKBOOK_SETTINGS_JSON";
pub const COMMISSION_BPS: &str = "STOCKBOOK_COMMISSION_BPS";
pub const EDIT_WINDOW_DAYS: &str = "STOCKBOOK_EDIT_WINDOW_DAYS";
pub const CASHBOX_TOLERANCE: &str = "STOCKBOOK_CASHBOX_TOLERANCE";
pub const OPENING_CASHBOX: &str = "STOCKBOOK_OPENING_CASHBOX";
pub const OPENING_BANK: &str = "STOCKBOOK_OPENING_BANK";

/// Ledger configuration resolved at startup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerConfig {
    pub settings: StaticSettings,
}

impl LedgerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match lookup(SETTINGS_JSON) {
            Some(source) => load_document(&source)?,
            None => StaticSettings::default(),
        };

        if let Some(bps) = parse::<u32, _>(&lookup, COMMISSION_BPS)? {
            if bps > 10_000 {
                bail!("{COMMISSION_BPS} must be at most 10000, got {bps}");
            }
            settings.commission_rate_bps = bps;
        }
        if let Some(days) = parse::<i64, _>(&lookup, EDIT_WINDOW_DAYS)? {
            if days < 0 {
                bail!("{EDIT_WINDOW_DAYS} cannot be negative, got {days}");
            }
            settings.edit_window_days = days;
        }
        if let Some(tolerance) = parse::<i64, _>(&lookup, CASHBOX_TOLERANCE)? {
            settings.cashbox_tolerance = tolerance.abs();
        }
        if let Some(cash) = parse::<i64, _>(&lookup, OPENING_CASHBOX)? {
            settings.opening_cashbox = cash;
        }
        if let Some(bank) = parse::<i64, _>(&lookup, OPENING_BANK)? {
            settings.opening_bank = bank;
        }

        Ok(Self { settings })
    }
}

/// `source` is either the JSON document itself or the path of a file holding it.
fn load_document(source: &str) -> anyhow::Result<StaticSettings> {
    let trimmed = source.trim();
    let doc = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        std::fs::read_to_string(trimmed)
            .with_context(|| format!("reading {SETTINGS_JSON} file {trimmed}"))?
    };
    serde_json::from_str(&doc)
        .with_context(|| format!("{SETTINGS_JSON} is not a valid settings document"))
}

fn parse<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key}={raw:?} is not a valid number"))
        })
        .transpose()
}
