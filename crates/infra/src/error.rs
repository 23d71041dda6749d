//! Errors surfaced by the ledger engine.

use thiserror::Error;

use stockbook_core::LedgerError;

use crate::ledger_store::StoreError;

/// Either a business-rule rejection or an infrastructure fault.
///
/// Neither is retried by the engine. In both cases the operation left no
/// trace in the ledger and produced no audit record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Ledger(e) => e.code(),
            EngineError::Store(_) => "store_unavailable",
        }
    }

    /// `true` for rejections caused by the request itself.
    pub fn is_business(&self) -> bool {
        matches!(self, EngineError::Ledger(_))
    }

    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            EngineError::Ledger(e) => Some(e),
            EngineError::Store(_) => None,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
