//! `stockbook-auth`: authorization boundary for ledger operations.
//!
//! The ledger consumes a boolean decision per operation plus an identity for
//! stamping; how principals authenticate is outside this crate.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AllowAll, Authorizer, AuthzError, Operation, RolePolicy, authorize};
pub use permissions::Permission;
pub use principal::Actor;
pub use roles::Role;
