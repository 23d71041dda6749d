//! Reference data: products, customers, suppliers.

use tracing::instrument;

use stockbook_auth::{Authorizer, Operation};
use stockbook_core::{CustomerId, Money, ProductId, SupplierId};
use stockbook_events::{AuditAction, AuditSink};
use stockbook_inventory::Product;
use stockbook_parties::{Customer, Supplier};

use super::LedgerEngine;
use crate::context::OperationContext;
use crate::error::EngineResult;
use crate::ledger_store::LedgerStore;
use crate::settings::Settings;

impl<S, A, Z, C> LedgerEngine<S, A, Z, C>
where
    S: LedgerStore,
    A: Authorizer,
    Z: AuditSink,
    C: Settings,
{
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn register_product(&self, ctx: &OperationContext, name: &str, unit: &str) -> EngineResult<Product> {
        self.execute(ctx, Operation::RegisterProduct, |state, trail| {
            let product = Product::new(ProductId::new(), name, unit)?;
            state.products.insert(product.id_typed(), product.clone());
            let record = trail
                .entry(AuditAction::ProductRegistered, product.id_typed())
                .with_after(&product);
            trail.push(record);
            Ok(product)
        })
    }

    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn register_customer(
        &self,
        ctx: &OperationContext,
        code: &str,
        name: &str,
        opening_balance: Money,
    ) -> EngineResult<Customer> {
        self.execute(ctx, Operation::RegisterCustomer, |state, trail| {
            let customer = Customer::register(CustomerId::new(), code, name, opening_balance)?;
            state.customers.insert(customer.id_typed(), customer.clone());
            let record = trail
                .entry(AuditAction::CustomerRegistered, customer.id_typed())
                .with_after(&customer);
            trail.push(record);
            Ok(customer)
        })
    }

    /// Inactive customers keep their history but take no new invoices or collections.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn deactivate_customer(&self, ctx: &OperationContext, customer_id: CustomerId) -> EngineResult<Customer> {
        self.execute(ctx, Operation::DeactivateCustomer, |state, trail| {
            let customer = state.customer_mut(customer_id)?;
            let before = customer.clone();
            customer.deactivate()?;
            let after = customer.clone();
            let record = trail
                .entry(AuditAction::CustomerDeactivated, customer_id)
                .with_before(&before)
                .with_after(&after);
            trail.push(record);
            Ok(after)
        })
    }

    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn register_supplier(
        &self,
        ctx: &OperationContext,
        code: &str,
        name: &str,
        opening_balance: Money,
    ) -> EngineResult<Supplier> {
        self.execute(ctx, Operation::RegisterSupplier, |state, trail| {
            let supplier = Supplier::register(SupplierId::new(), code, name, opening_balance)?;
            state.suppliers.insert(supplier.id_typed(), supplier.clone());
            let record = trail
                .entry(AuditAction::SupplierRegistered, supplier.id_typed())
                .with_after(&supplier);
            trail.push(record);
            Ok(supplier)
        })
    }

    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn deactivate_supplier(&self, ctx: &OperationContext, supplier_id: SupplierId) -> EngineResult<Supplier> {
        self.execute(ctx, Operation::DeactivateSupplier, |state, trail| {
            let supplier = state.supplier_mut(supplier_id)?;
            let before = supplier.clone();
            supplier.deactivate()?;
            let after = supplier.clone();
            let record = trail
                .entry(AuditAction::SupplierDeactivated, supplier_id)
                .with_before(&before)
                .with_after(&after);
            trail.push(record);
            Ok(after)
        })
    }
}
