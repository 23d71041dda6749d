use std::collections::HashMap;

use thiserror::Error;

use crate::{Actor, Permission, Role};

/// Every ledger operation that needs an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RegisterProduct,
    RegisterCustomer,
    DeactivateCustomer,
    RegisterSupplier,
    DeactivateSupplier,
    CreateShipment,
    AddShipmentItem,
    CloseShipment,
    SettleShipment,
    UnsettleShipment,
    RecordWastage,
    CreateInvoice,
    CancelInvoice,
    CreateReturn,
    CancelReturn,
    CreateCollection,
    CancelCollection,
    CreateExpense,
    CancelExpense,
    CreateTransfer,
    OpenDay,
    CloseDay,
    ForceCloseDay,
    ReopenDay,
    DeleteRecord,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        self.required_permission_name()
    }

    /// Permission an actor must hold to perform this operation.
    pub fn required_permission(self) -> Permission {
        Permission::from_static(self.required_permission_name())
    }

    fn required_permission_name(self) -> &'static str {
        use Operation::*;
        match self {
            RegisterProduct => "products.register",
            RegisterCustomer => "customers.register",
            DeactivateCustomer => "customers.deactivate",
            RegisterSupplier => "suppliers.register",
            DeactivateSupplier => "suppliers.deactivate",
            CreateShipment => "shipments.create",
            AddShipmentItem => "shipments.add_item",
            CloseShipment => "shipments.close",
            SettleShipment => "shipments.settle",
            UnsettleShipment => "shipments.unsettle",
            RecordWastage => "shipments.record_wastage",
            CreateInvoice => "invoices.create",
            CancelInvoice => "invoices.cancel",
            CreateReturn => "returns.create",
            CancelReturn => "returns.cancel",
            CreateCollection => "collections.create",
            CancelCollection => "collections.cancel",
            CreateExpense => "expenses.create",
            CancelExpense => "expenses.cancel",
            CreateTransfer => "transfers.create",
            OpenDay => "days.open",
            CloseDay => "days.close",
            ForceCloseDay => "days.force_close",
            ReopenDay => "days.reopen",
            DeleteRecord => "records.delete",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// External authorization decision consumed by the ledger.
///
/// - No IO expected on the hot path
/// - No panics
/// - No business logic (pure policy check)
pub trait Authorizer: Send + Sync {
    fn is_allowed(&self, actor: &Actor, operation: Operation) -> bool;
}

impl<A> Authorizer for std::sync::Arc<A>
where
    A: Authorizer + ?Sized,
{
    fn is_allowed(&self, actor: &Actor, operation: Operation) -> bool {
        (**self).is_allowed(actor, operation)
    }
}

/// Grants every operation. Intended for tests and single-user setups.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn is_allowed(&self, _actor: &Actor, _operation: Operation) -> bool {
        true
    }
}

/// Role → permission mapping.
#[derive(Debug, Clone, Default)]
pub struct RolePolicy {
    grants: HashMap<Role, Vec<Permission>>,
}

impl RolePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, role: Role, permission: Permission) -> Self {
        self.grants.entry(role).or_default().push(permission);
        self
    }

    /// The stock policy.
    ///
    /// `admin` may do anything. `manager` runs the books, including settlement,
    /// unsettlement, force close and reopening days. `cashier` handles the
    /// counter: invoices, returns, collections, expenses and the normal
    /// open/close of the day.
    pub fn standard() -> Self {
        let manager = [
            "products.*",
            "customers.*",
            "suppliers.*",
            "shipments.*",
            "invoices.*",
            "returns.*",
            "collections.*",
            "expenses.*",
            "transfers.*",
            "days.*",
        ];
        let cashier = [
            "invoices.create",
            "returns.create",
            "collections.create",
            "expenses.create",
            "transfers.create",
            "shipments.record_wastage",
            "days.open",
            "days.close",
        ];

        let mut policy = Self::new().grant(Role::ADMIN, Permission::from_static("*"));
        for p in manager {
            policy = policy.grant(Role::MANAGER, Permission::from_static(p));
        }
        for p in cashier {
            policy = policy.grant(Role::CASHIER, Permission::from_static(p));
        }
        policy
    }

    pub fn permissions_for(&self, roles: &[Role]) -> Vec<Permission> {
        roles
            .iter()
            .filter_map(|r| self.grants.get(r))
            .flatten()
            .cloned()
            .collect()
    }
}

impl Authorizer for RolePolicy {
    fn is_allowed(&self, actor: &Actor, operation: Operation) -> bool {
        authorize(&self.permissions_for(&actor.roles), &operation.required_permission()).is_ok()
    }
}

/// Check a required permission against a granted set.
pub fn authorize(granted: &[Permission], required: &Permission) -> Result<(), AuthzError> {
    if granted.iter().any(|p| p.grants(required)) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
