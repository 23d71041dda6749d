//! Transactional persistence boundary for the ledger.
//!
//! Every public ledger operation runs as exactly one [`LedgerStore::transaction`]:
//! the closure sees a consistent [`LedgerState`] and either all of its writes
//! become visible or none do.

pub mod in_memory;
pub mod state;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
pub use r#trait::{LedgerStore, StoreError};
pub use state::LedgerState;
