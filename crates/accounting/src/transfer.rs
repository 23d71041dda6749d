use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{DomainResult, LedgerError, Money, TransferId, UserId, impl_entity};

use crate::account::{AccountBalances, CashAccount};

/// Money moved between the cashbox and the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTransfer {
    pub id: TransferId,
    pub date: NaiveDate,
    pub from: CashAccount,
    pub to: CashAccount,
    pub amount: Money,
    pub note: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl_entity!(AccountTransfer, TransferId);

impl AccountTransfer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: TransferId,
        date: NaiveDate,
        from: CashAccount,
        to: CashAccount,
        amount: Money,
        note: Option<String>,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if from == to {
            return Err(LedgerError::validation("transfer source and destination must differ"));
        }
        if !amount.is_positive() {
            return Err(LedgerError::validation("transfer amount must be positive"));
        }
        Ok(Self {
            id,
            date,
            from,
            to,
            amount,
            note,
            created_by,
            created_at,
        })
    }

    /// Net effect on account balances: out of `from`, into `to`.
    pub fn net_effect(&self) -> DomainResult<AccountBalances> {
        let mut effect = AccountBalances::default();
        effect.debit(self.from, self.amount)?;
        effect.credit(self.to, self.amount)?;
        Ok(effect)
    }
}
