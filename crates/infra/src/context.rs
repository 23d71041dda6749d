use chrono::{DateTime, NaiveDate, Utc};

use stockbook_auth::Actor;
use stockbook_core::UserId;

/// Who is calling and when.
///
/// `now` is passed in rather than read from the clock so tests can drive
/// the ledger through several days deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    pub actor: Actor,
    pub now: DateTime<Utc>,
}

impl OperationContext {
    pub fn new(actor: Actor, now: DateTime<Utc>) -> Self {
        Self { actor, now }
    }

    /// Context stamped with the current wall-clock time.
    pub fn now(actor: Actor) -> Self {
        Self::new(actor, Utc::now())
    }

    pub fn actor_id(&self) -> UserId {
        self.actor.id
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}
