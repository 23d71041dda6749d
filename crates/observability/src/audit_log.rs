//! Mirrors committed audit records into the log stream.

use stockbook_events::{AuditRecord, AuditSink};
use tracing::info;

/// Emits one `info` event per audit record on the `stockbook::audit` target,
/// then hands the record to the wrapped sink.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditSink<S> {
    inner: S,
}

impl<S> TracingAuditSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: AuditSink> AuditSink for TracingAuditSink<S> {
    fn record(&self, record: AuditRecord) {
        info!(
            target: "stockbook::audit",
            event_type = record.action.event_type(),
            entity = %record.entity,
            entity_id = %record.entity_id,
            actor = %record.actor,
            reason = record.reason.as_deref().unwrap_or(""),
            "audit"
        );
        self.inner.record(record);
    }
}
