use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{
    DomainResult, ExpenseId, LedgerError, Lifecycle, Money, ShipmentId, UserId, impl_entity,
};

use crate::account::CashAccount;

/// General running costs, or costs paid on a supplier's behalf against a
/// shipment (deducted at settlement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseKind {
    General,
    Supplier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Active,
    Cancelled,
}

impl Lifecycle for ExpenseStatus {
    const ENTITY: &'static str = "expense";

    fn name(self) -> &'static str {
        match self {
            ExpenseStatus::Active => "active",
            ExpenseStatus::Cancelled => "cancelled",
        }
    }

    fn allows(self, next: Self) -> bool {
        matches!((self, next), (ExpenseStatus::Active, ExpenseStatus::Cancelled))
    }

    fn rejection(self, next: Self) -> LedgerError {
        match (self, next) {
            (ExpenseStatus::Cancelled, ExpenseStatus::Cancelled) => LedgerError::AlreadyCancelled,
            (ExpenseStatus::Cancelled, ExpenseStatus::Active) => {
                LedgerError::CannotReactivateCancelled
            }
            _ => LedgerError::InvalidTransition {
                entity: Self::ENTITY,
                from: self.name(),
                to: next.name(),
            },
        }
    }
}

/// Expense request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub amount: Money,
    pub kind: ExpenseKind,
    #[serde(default)]
    pub shipment_id: Option<ShipmentId>,
    pub account: CashAccount,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    id: ExpenseId,
    date: NaiveDate,
    amount: Money,
    kind: ExpenseKind,
    shipment_id: Option<ShipmentId>,
    account: CashAccount,
    description: String,
    status: ExpenseStatus,
    created_by: UserId,
    created_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl_entity!(Expense, ExpenseId);

impl Expense {
    pub fn new(
        id: ExpenseId,
        input: NewExpense,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !input.amount.is_positive() {
            return Err(LedgerError::validation("expense amount must be positive"));
        }
        match (input.kind, input.shipment_id) {
            (ExpenseKind::Supplier, None) => {
                return Err(LedgerError::validation("supplier expense must reference a shipment"));
            }
            (ExpenseKind::General, Some(_)) => {
                return Err(LedgerError::validation("general expense cannot reference a shipment"));
            }
            _ => {}
        }
        Ok(Self {
            id,
            date: input.date,
            amount: input.amount,
            kind: input.kind,
            shipment_id: input.shipment_id,
            account: input.account,
            description: input.description,
            status: ExpenseStatus::Active,
            created_by,
            created_at,
            cancelled_at: None,
        })
    }

    pub fn id_typed(&self) -> ExpenseId {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn kind(&self) -> ExpenseKind {
        self.kind
    }

    pub fn shipment_id(&self) -> Option<ShipmentId> {
        self.shipment_id
    }

    pub fn account(&self) -> CashAccount {
        self.account
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> ExpenseStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ExpenseStatus::Active
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Whether this expense is deducted when `shipment_id` settles.
    pub fn charges_shipment(&self, shipment_id: ShipmentId) -> bool {
        self.is_active() && self.kind == ExpenseKind::Supplier && self.shipment_id == Some(shipment_id)
    }

    pub fn cancel(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        self.status = self.status.transition(ExpenseStatus::Cancelled)?;
        self.cancelled_at = Some(at);
        Ok(())
    }
}
