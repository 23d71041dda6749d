use std::sync::RwLock;

use super::r#trait::{LedgerStore, StoreError};
use super::state::LedgerState;

/// In-memory ledger store.
///
/// One `RwLock` guards the whole state, so every transaction is serialized:
/// the read-decide-write of an allocation can never interleave with another
/// one, and at most one working day can be opened at a time. A transaction
/// works on a clone and swaps it in only on success.
///
/// Intended for tests, single-process deployments and as the reference for
/// persistent backends.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LedgerState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Clone of the current committed state.
    pub fn snapshot(&self) -> Result<LedgerState, StoreError> {
        self.read(LedgerState::clone)
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut LedgerState) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut guard = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut working = guard.clone();
        let value = f(&mut working)?;
        *guard = working;
        Ok(value)
    }

    fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&LedgerState) -> T,
    {
        let guard = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&guard))
    }
}
