//! Ledger audit trail.
//!
//! Every state-changing ledger operation produces one [`AuditRecord`] after it
//! commits. Records are handed to an [`AuditSink`], which keeps them in
//! memory, discards them or forwards them elsewhere.

pub mod audit;

pub use audit::{AuditAction, AuditRecord, AuditSink, InMemoryAuditLog, NoopAuditSink};
