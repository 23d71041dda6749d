//! Read-only views over the ledger.

use serde::{Deserialize, Serialize};

use stockbook_auth::Authorizer;
use stockbook_core::{CustomerId, DomainResult, Money, SupplierId};
use stockbook_events::AuditSink;
use stockbook_parties::{Customer, Supplier};

use super::LedgerEngine;
use crate::error::EngineResult;
use crate::ledger_store::{LedgerState, LedgerStore};
use crate::settings::Settings;

/// The components of a customer's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerStatement {
    pub customer_id: CustomerId,
    pub opening_balance: Money,
    /// Σ active invoice totals.
    pub invoiced: Money,
    /// Σ confirmed collection amounts.
    pub collected: Money,
    /// Σ active return totals.
    pub returned: Money,
    /// Part of the collections not applied to any invoice.
    pub unallocated_credit: Money,
    /// The maintained running balance.
    pub balance: Money,
}

impl CustomerStatement {
    pub fn build(state: &LedgerState, customer_id: CustomerId) -> DomainResult<Self> {
        let customer = state.customer(customer_id)?;
        let invoiced = Money::try_sum(
            state
                .customer_invoices(customer_id)
                .filter(|inv| inv.is_active())
                .map(|inv| inv.total()),
        )?;
        let confirmed = || {
            state
                .collections
                .values()
                .filter(move |c| c.customer_id() == customer_id && c.is_confirmed())
        };
        let collected = Money::try_sum(confirmed().map(|c| c.amount()))?;
        let unallocated_credit = Money::try_sum(confirmed().map(|c| c.unallocated_amount()))?;
        let returned = Money::try_sum(
            state
                .returns
                .values()
                .filter(|r| r.customer_id() == customer_id && r.is_active())
                .map(|r| r.total()),
        )?;

        Ok(Self {
            customer_id,
            opening_balance: customer.opening_balance(),
            invoiced,
            collected,
            returned,
            unallocated_credit,
            balance: customer.balance(),
        })
    }

    /// `opening + invoiced − collected − returned`.
    pub fn expected_balance(&self) -> DomainResult<Money> {
        self.opening_balance
            .checked_add(self.invoiced)?
            .checked_sub(self.collected)?
            .checked_sub(self.returned)
    }

    /// Whether the running balance agrees with the records.
    pub fn is_consistent(&self) -> bool {
        self.expected_balance().is_ok_and(|expected| expected == self.balance)
    }
}

impl<S, A, Z, C> LedgerEngine<S, A, Z, C>
where
    S: LedgerStore,
    A: Authorizer,
    Z: AuditSink,
    C: Settings,
{
    pub fn customer(&self, customer_id: CustomerId) -> EngineResult<Customer> {
        self.query(|state| state.customer(customer_id).cloned())
    }

    pub fn supplier(&self, supplier_id: SupplierId) -> EngineResult<Supplier> {
        self.query(|state| state.supplier(supplier_id).cloned())
    }

    pub fn customer_statement(&self, customer_id: CustomerId) -> EngineResult<CustomerStatement> {
        self.query(|state| CustomerStatement::build(state, customer_id))
    }
}
