use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_accounting::Expense;
use stockbook_core::{DomainResult, LedgerError, Money, ShipmentId, SupplierId, UserId};
use stockbook_inventory::Carryover;
use stockbook_invoicing::{Invoice, SalesReturn};

/// Sum of invoice item subtotals drawn from `shipment_id`'s lots, over active
/// invoices only.
pub fn gross_sales<'a, I>(shipment_id: ShipmentId, invoices: I) -> DomainResult<Money>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    Money::try_sum(
        invoices
            .into_iter()
            .filter(|inv| inv.is_active())
            .flat_map(|inv| inv.items())
            .filter(|item| item.shipment_id == shipment_id)
            .map(|item| item.subtotal),
    )
}

/// Value of active sales returns against `shipment_id`'s lots.
pub fn returned_sales<'a, I>(shipment_id: ShipmentId, returns: I) -> DomainResult<Money>
where
    I: IntoIterator<Item = &'a SalesReturn>,
{
    Money::try_sum(
        returns
            .into_iter()
            .filter(|r| r.is_active())
            .flat_map(|r| r.lines())
            .filter(|line| line.shipment_id == shipment_id)
            .map(|line| line.amount),
    )
}

/// Active supplier-type expenses booked against `shipment_id`.
pub fn supplier_expenses<'a, I>(shipment_id: ShipmentId, expenses: I) -> DomainResult<Money>
where
    I: IntoIterator<Item = &'a Expense>,
{
    Money::try_sum(
        expenses
            .into_iter()
            .filter(|e| e.charges_shipment(shipment_id))
            .map(|e| e.amount()),
    )
}

/// Figures a settlement is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementInput {
    pub shipment_id: ShipmentId,
    pub supplier_id: SupplierId,
    pub gross_sales: Money,
    pub returns: Money,
    pub supplier_expenses: Money,
    pub previous_balance: Money,
    pub commission_rate_bps: u32,
}

/// The settled figures of one shipment. Kept until the shipment is unsettled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementStatement {
    pub shipment_id: ShipmentId,
    pub supplier_id: SupplierId,
    pub gross_sales: Money,
    pub returns: Money,
    pub net_sales: Money,
    pub commission_rate_bps: u32,
    pub commission: Money,
    pub supplier_expenses: Money,
    pub previous_balance: Money,
    pub final_balance: Money,
    pub carryovers: Vec<Carryover>,
    pub settled_by: UserId,
    pub settled_at: DateTime<Utc>,
}

impl SettlementStatement {
    pub fn compute(
        input: StatementInput,
        settled_by: UserId,
        settled_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.returns > input.gross_sales {
            return Err(LedgerError::invariant(format!(
                "returns {} exceed gross sales {}",
                input.returns, input.gross_sales
            )));
        }
        let net_sales = input.gross_sales.checked_sub(input.returns)?;
        let commission = net_sales.apply_bps(input.commission_rate_bps)?;
        let final_balance = net_sales
            .checked_sub(commission)?
            .checked_sub(input.supplier_expenses)?
            .checked_add(input.previous_balance)?;

        Ok(Self {
            shipment_id: input.shipment_id,
            supplier_id: input.supplier_id,
            gross_sales: input.gross_sales,
            returns: input.returns,
            net_sales,
            commission_rate_bps: input.commission_rate_bps,
            commission,
            supplier_expenses: input.supplier_expenses,
            previous_balance: input.previous_balance,
            final_balance,
            carryovers: Vec::new(),
            settled_by,
            settled_at,
        })
    }

    pub fn with_carryovers(mut self, carryovers: Vec<Carryover>) -> Self {
        self.carryovers = carryovers;
        self
    }
}
