use serde::{Deserialize, Serialize};

use stockbook_core::{DomainResult, LedgerError, Money, SupplierId, impl_entity};

use crate::validate_identity;

/// A supplier consigning shipments.
///
/// The balance chains through settlements: after each settled shipment it
/// equals that shipment's final supplier balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    id: SupplierId,
    code: String,
    name: String,
    opening_balance: Money,
    balance: Money,
    is_active: bool,
}

impl_entity!(Supplier, SupplierId);

impl Supplier {
    pub fn register(
        id: SupplierId,
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

    pub fn id_typed(&self) -> SupplierId {
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

    pub fn ensure_active(&self) -> DomainResult<()> {
        if !self.is_active {
            return Err(LedgerError::validation(format!(
                "supplier {} is inactive",
                self.code
            )));
        }
        Ok(())
    }

    pub fn deactivate(&mut self) -> DomainResult<()> {
        if !self.is_active {
            return Err(LedgerError::validation("supplier is already inactive"));
        }
        self.is_active = false;
        Ok(())
    }

    /// Record the outcome of a settlement.
    pub fn apply_settlement(&mut self, final_balance: Money) {
        self.balance = final_balance;
    }

    /// Undo a settlement, returning to the balance it was chained from.
    pub fn revert_settlement(&mut self, previous_balance: Money) {
        self.balance = previous_balance;
    }
}
