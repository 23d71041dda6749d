use serde::{Deserialize, Serialize};

use stockbook_core::{DomainResult, Money, ValueObject};

/// Where money physically sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashAccount {
    Cashbox,
    Bank,
}

impl CashAccount {
    pub const ALL: [CashAccount; 2] = [CashAccount::Cashbox, CashAccount::Bank];

    pub fn as_str(self) -> &'static str {
        match self {
            CashAccount::Cashbox => "cashbox",
            CashAccount::Bank => "bank",
        }
    }
}

/// How a customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Cheque,
}

impl PaymentMethod {
    /// Account the payment lands in.
    pub fn account(self) -> CashAccount {
        match self {
            PaymentMethod::Cash => CashAccount::Cashbox,
            PaymentMethod::BankTransfer | PaymentMethod::Cheque => CashAccount::Bank,
        }
    }
}

/// One amount per cash account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalances {
    pub cashbox: Money,
    pub bank: Money,
}

impl ValueObject for AccountBalances {}

impl AccountBalances {
    pub fn new(cashbox: Money, bank: Money) -> Self {
        Self { cashbox, bank }
    }

    pub fn get(&self, account: CashAccount) -> Money {
        match account {
            CashAccount::Cashbox => self.cashbox,
            CashAccount::Bank => self.bank,
        }
    }

    fn slot(&mut self, account: CashAccount) -> &mut Money {
        match account {
            CashAccount::Cashbox => &mut self.cashbox,
            CashAccount::Bank => &mut self.bank,
        }
    }

    pub fn credit(&mut self, account: CashAccount, amount: Money) -> DomainResult<()> {
        let slot = self.slot(account);
        *slot = slot.checked_add(amount)?;
        Ok(())
    }

    pub fn debit(&mut self, account: CashAccount, amount: Money) -> DomainResult<()> {
        let slot = self.slot(account);
        *slot = slot.checked_sub(amount)?;
        Ok(())
    }

    /// Element-wise `self + other`.
    pub fn plus(&self, other: &AccountBalances) -> DomainResult<AccountBalances> {
        Ok(AccountBalances {
            cashbox: self.cashbox.checked_add(other.cashbox)?,
            bank: self.bank.checked_add(other.bank)?,
        })
    }

    /// Element-wise `self - other`.
    pub fn minus(&self, other: &AccountBalances) -> DomainResult<AccountBalances> {
        Ok(AccountBalances {
            cashbox: self.cashbox.checked_sub(other.cashbox)?,
            bank: self.bank.checked_sub(other.bank)?,
        })
    }

    pub fn total(&self) -> DomainResult<Money> {
        self.cashbox.checked_add(self.bank)
    }
}
