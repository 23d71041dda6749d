use chrono::{DateTime, Utc};

use stockbook_core::UserId;
use stockbook_events::{AuditAction, AuditRecord};

/// Audit records gathered while an operation runs.
///
/// Nothing here reaches the sink unless the transaction commits.
#[derive(Debug)]
pub struct AuditTrail {
    actor: UserId,
    at: DateTime<Utc>,
    records: Vec<AuditRecord>,
}

impl AuditTrail {
    pub fn new(actor: UserId, at: DateTime<Utc>) -> Self {
        Self {
            actor,
            at,
            records: Vec::new(),
        }
    }

    pub fn actor(&self) -> UserId {
        self.actor
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.at
    }

    /// A record stamped with this operation's actor and time.
    pub fn entry(&self, action: AuditAction, entity_id: impl ToString) -> AuditRecord {
        AuditRecord::new(action, entity_id, self.actor, self.at)
    }

    pub fn push(&mut self, record: AuditRecord) {
        self.records.push(record);
    }

    pub fn into_records(self) -> Vec<AuditRecord> {
        self.records
    }
}
