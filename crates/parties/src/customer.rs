use serde::{Deserialize, Serialize};

use stockbook_core::{CustomerId, DomainResult, LedgerError, Money, impl_entity};

use crate::validate_identity;

/// A trade customer.
///
/// `balance` is what the customer owes. It obeys
/// `balance = opening_balance + Σ active invoice totals − Σ confirmed collections − Σ active returns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    code: String,
    name: String,
    opening_balance: Money,
    balance: Money,
    is_active: bool,
}

impl_entity!(Customer, CustomerId);

impl Customer {
    pub fn register(
        id: CustomerId,
        code: impl Into<String>,
        name: impl Into<String>,
        opening_balance: Money,
    ) -> DomainResult<Self> {
        let code = code.into();
        let name = name.into();
        validate_identity(&code, &name)?;
        Ok(Self {
            id,
            code,
            name,
            opening_balance,
            balance: opening_balance,
            is_active: true,
        })
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn opening_balance(&self) -> Money {
        self.opening_balance
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// New invoices and collections need an active customer.
    pub fn ensure_active(&self) -> DomainResult<()> {
        if !self.is_active {
            return Err(LedgerError::validation(format!(
                "customer {} is inactive",
                self.code
            )));
        }
        Ok(())
    }

    pub fn deactivate(&mut self) -> DomainResult<()> {
        if !self.is_active {
            return Err(LedgerError::validation("customer is already inactive"));
        }
        self.is_active = false;
        Ok(())
    }

    /// An invoice of `total` was issued.
    pub fn charge_invoice(&mut self, total: Money) -> DomainResult<()> {
        self.balance = self.balance.checked_add(total)?;
        Ok(())
    }

    /// An invoice of `total` was cancelled.
    pub fn reverse_invoice(&mut self, total: Money) -> DomainResult<()> {
        self.balance = self.balance.checked_sub(total)?;
        Ok(())
    }

    /// A collection of `amount` was received. Applied once at creation,
    /// independent of how the amount is distributed over invoices.
    pub fn receive_collection(&mut self, amount: Money) -> DomainResult<()> {
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }

    pub fn reverse_collection(&mut self, amount: Money) -> DomainResult<()> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    pub fn credit_return(&mut self, total: Money) -> DomainResult<()> {
        self.balance = self.balance.checked_sub(total)?;
        Ok(())
    }

    pub fn reverse_return(&mut self, total: Money) -> DomainResult<()> {
        self.balance = self.balance.checked_add(total)?;
        Ok(())
    }
}
