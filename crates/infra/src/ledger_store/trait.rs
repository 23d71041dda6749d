use std::sync::Arc;

use thiserror::Error;

use super::state::LedgerState;

/// Infrastructure failure of the persistence layer.
///
/// Unlike business errors these say nothing about the request; the enclosing
/// transaction is aborted with no partial writes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("ledger state lock poisoned")]
    LockPoisoned,

    #[error("ledger store unavailable: {0}")]
    Unavailable(String),
}

/// Atomic unit-of-work access to ledger state.
///
/// Implementations must:
/// - serialize transactions that touch the same rows (the in-memory store
///   serializes all of them)
/// - make a transaction's writes visible only if its closure returns `Ok`
/// - never expose a half-applied transaction to `read`
pub trait LedgerStore: Send + Sync {
    /// Run `f` as one transaction.
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut LedgerState) -> Result<T, E>,
        E: From<StoreError>;

    /// Run `f` against a consistent snapshot.
    fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&LedgerState) -> T;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut LedgerState) -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).transaction(f)
    }

    fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&LedgerState) -> T,
    {
        (**self).read(f)
    }
}
