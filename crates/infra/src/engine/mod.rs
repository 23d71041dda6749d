//! Operation pipeline of the ledger.
//!
//! Every state-changing operation runs through [`LedgerEngine::execute`]:
//!
//! ```text
//! OperationContext + Operation
//!   ↓
//! 1. Authorize (Authorizer::is_allowed, else Unauthorized)
//!   ↓
//! 2. Transaction (LedgerStore::transaction; pure domain calls mutate a working copy)
//!   ↓
//! 3. Commit or discard (any error leaves the ledger untouched)
//!   ↓
//! 4. Audit (AuditSink::record, only after commit)
//! ```
//!
//! The domain crates decide; this module only sequences them and owns the
//! transaction boundary.

mod cash;
mod collections;
mod invoices;
mod parties;
mod queries;
mod settlement;
mod shipments;
mod trail;
mod workday;

pub use invoices::ReturnRequest;
pub use queries::CustomerStatement;
pub use trail::AuditTrail;

use tracing::{error, info, warn};

use stockbook_auth::{Authorizer, Operation};
use stockbook_core::{DomainResult, LedgerError};
use stockbook_events::AuditSink;

use crate::context::OperationContext;
use crate::error::{EngineError, EngineResult};
use crate::ledger_store::{LedgerState, LedgerStore};
use crate::settings::Settings;

/// The ledger's public operations.
///
/// - `S`: ledger store (transaction boundary)
/// - `A`: authorizer consulted before every mutation
/// - `Z`: audit sink fed after every commit
/// - `C`: settings lookup
///
/// `LedgerEngine` is `Send + Sync` whenever its parts are; share it across
/// threads behind an `Arc`.
#[derive(Debug)]
pub struct LedgerEngine<S, A, Z, C> {
    store: S,
    authorizer: A,
    audit: Z,
    settings: C,
}

impl<S, A, Z, C> LedgerEngine<S, A, Z, C> {
    pub fn new(store: S, authorizer: A, audit: Z, settings: C) -> Self {
        Self {
            store,
            authorizer,
            audit,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn audit(&self) -> &Z {
        &self.audit
    }

    pub fn settings(&self) -> &C {
        &self.settings
    }
}

impl<S, A, Z, C> LedgerEngine<S, A, Z, C>
where
    S: LedgerStore,
    A: Authorizer,
    Z: AuditSink,
    C: Settings,
{
    /// Authorize, run `f` as one transaction, then publish its audit records.
    fn execute<T, F>(&self, ctx: &OperationContext, operation: Operation, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut LedgerState, &mut AuditTrail) -> DomainResult<T>,
    {
        self.authorize(ctx, operation)?;

        let mut trail = AuditTrail::new(ctx.actor_id(), ctx.now);
        let outcome = self
            .store
            .transaction(|state| f(state, &mut trail).map_err(EngineError::from));

        match outcome {
            Ok(value) => {
                let records = trail.into_records();
                info!(
                    operation = %operation,
                    actor = %ctx.actor_id(),
                    audit_records = records.len(),
                    "operation committed"
                );
                for record in records {
                    self.audit.record(record);
                }
                Ok(value)
            }
            Err(err) => {
                if err.is_business() {
                    warn!(operation = %operation, actor = %ctx.actor_id(), code = err.code(), error = %err, "operation rejected");
                } else {
                    error!(operation = %operation, actor = %ctx.actor_id(), error = %err, "operation aborted");
                }
                Err(err)
            }
        }
    }

    fn authorize(&self, ctx: &OperationContext, operation: Operation) -> EngineResult<()> {
        if self.authorizer.is_allowed(&ctx.actor, operation) {
            return Ok(());
        }
        warn!(operation = %operation, actor = %ctx.actor_id(), "operation not authorized");
        Err(LedgerError::unauthorized(operation.as_str()).into())
    }

    /// Read-only access to a consistent snapshot.
    fn query<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&LedgerState) -> DomainResult<T>,
    {
        Ok(self.store.read(f)??)
    }
}
