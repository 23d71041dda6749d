//! Infrastructure layer of the ledger: the transactional store, the
//! operation engine, settings and configuration.
//!
//! Domain crates decide; this crate sequences their decisions inside one
//! transaction per operation and reports what happened.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod ledger_store;
pub mod settings;

#[cfg(test)]
mod integration_tests;

pub use config::LedgerConfig;
pub use context::OperationContext;
pub use engine::{AuditTrail, CustomerStatement, LedgerEngine, ReturnRequest};
pub use error::{EngineError, EngineResult};
pub use ledger_store::{InMemoryLedgerStore, LedgerState, LedgerStore, StoreError};
pub use settings::{Settings, StaticSettings};
