//! Single-currency monetary amounts.

use serde::{Deserialize, Serialize};

use crate::error::{DomainResult, LedgerError};
use crate::value_object::ValueObject;

/// Signed amount in the smallest currency unit.
///
/// Balances may legitimately go negative (a supplier owed less than was
/// advanced, a customer holding credit), so this is an `i64`. All arithmetic
/// is checked; overflow is reported as an invariant violation.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn checked_add(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| LedgerError::invariant("money overflow"))
    }

    pub fn checked_sub(self, other: Money) -> DomainResult<Money> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or_else(|| LedgerError::invariant("money overflow"))
    }

    /// Multiply a unit price by a count (e.g. cartons).
    pub fn times(self, count: i64) -> DomainResult<Money> {
        self.0
            .checked_mul(count)
            .map(Money)
            .ok_or_else(|| LedgerError::invariant("money overflow"))
    }

    /// Apply a rate expressed in basis points, rounding half away from zero.
    pub fn apply_bps(self, bps: u32) -> DomainResult<Money> {
        let scaled = (self.0 as i128) * (bps as i128);
        let half = 5_000i128;
        let rounded = if scaled >= 0 {
            (scaled + half) / 10_000
        } else {
            (scaled - half) / 10_000
        };
        i64::try_from(rounded)
            .map(Money)
            .map_err(|_| LedgerError::invariant("money overflow"))
    }

    /// Sum an iterator of amounts with overflow checking.
    pub fn try_sum<I>(amounts: I) -> DomainResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.checked_add(m))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl core::ops::Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(self.0.saturating_neg())
    }
}
