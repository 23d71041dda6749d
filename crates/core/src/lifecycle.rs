//! Lifecycle transition tables.
//!
//! Ledger records are never deleted; they leave their lifecycle only by moving
//! forward through a closed set of states. Each status enum declares the
//! edges it permits in one `allows` table, and every mutation goes through
//! [`Lifecycle::transition`] instead of assigning a status directly.

use crate::error::{DomainResult, LedgerError};

/// A closed set of lifecycle states with an explicit transition table.
pub trait Lifecycle: Copy + Eq + core::fmt::Debug {
    /// Entity name used in error messages (e.g. "invoice").
    const ENTITY: &'static str;

    /// Stable state name (e.g. "active").
    fn name(self) -> &'static str;

    /// Transition table: whether `self -> next` is a permitted edge.
    fn allows(self, next: Self) -> bool;

    /// Error reported for a forbidden edge.
    ///
    /// Status types override this when a specific edge has a dedicated
    /// business error (e.g. cancelled -> active).
    fn rejection(self, next: Self) -> LedgerError {
        LedgerError::InvalidTransition {
            entity: Self::ENTITY,
            from: self.name(),
            to: next.name(),
        }
    }

    /// Validate and perform a transition, returning the new state.
    fn transition(self, next: Self) -> DomainResult<Self> {
        if self.allows(next) {
            Ok(next)
        } else {
            Err(self.rejection(next))
        }
    }
}
