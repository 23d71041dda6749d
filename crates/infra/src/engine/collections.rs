//! Customer collections.

use tracing::{instrument, warn};

use stockbook_auth::{Authorizer, Operation};
use stockbook_collections::{
    Collection, NewCollection, apply_allocations, distribute, reverse_allocations,
};
use stockbook_core::{CollectionId, LedgerError};
use stockbook_events::{AuditAction, AuditSink};

use super::LedgerEngine;
use crate::context::OperationContext;
use crate::error::EngineResult;
use crate::ledger_store::LedgerStore;
use crate::settings::Settings;

impl<S, A, Z, C> LedgerEngine<S, A, Z, C>
where
    S: LedgerStore,
    A: Authorizer,
    Z: AuditSink,
    C: Settings,
{
    /// Record a payment and spread it over the customer's invoices.
    ///
    /// The customer's balance drops by the full amount, allocated or not.
    #[instrument(
        skip(self, ctx, input),
        fields(actor = %ctx.actor_id(), customer = %input.customer_id, amount = %input.amount)
    )]
    pub fn create_collection(&self, ctx: &OperationContext, input: &NewCollection) -> EngineResult<Collection> {
        self.execute(ctx, Operation::CreateCollection, |state, trail| {
            state.session_for(input.date)?;
            state.customer(input.customer_id)?.ensure_active()?;

            let mut collection = Collection::new(CollectionId::new(), input, ctx.actor_id(), ctx.now)?;
            let plan = distribute(&collection, state.invoices.values(), &input.manual_plan)?;
            apply_allocations(&plan, &mut state.invoices)?;
            collection.record_allocations(plan)?;

            state
                .customer_mut(input.customer_id)?
                .receive_collection(collection.amount())?;
            state.collections.insert(collection.id_typed(), collection.clone());

            let record = trail
                .entry(AuditAction::CollectionCreated, collection.id_typed())
                .with_after(&collection);
            trail.push(record);
            Ok(collection)
        })
    }

    /// Cancel a collection, reversing every allocation it made. Terminal.
    ///
    /// Not bound by the edit window: a bounced payment has to be reversed
    /// whenever it comes back.
    #[instrument(skip(self, ctx), fields(actor = %ctx.actor_id()))]
    pub fn cancel_collection(&self, ctx: &OperationContext, collection_id: CollectionId) -> EngineResult<Collection> {
        self.execute(ctx, Operation::CancelCollection, |state, trail| {
            let collection = state.collection_mut(collection_id)?;
            let before = collection.clone();
            let released = collection.cancel(ctx.actor_id(), ctx.now)?;

            reverse_allocations(&released, &mut state.invoices)?;
            state
                .customer_mut(before.customer_id())?
                .reverse_collection(before.amount())?;

            let after = state.collection(collection_id)?.clone();
            let record = trail
                .entry(AuditAction::CollectionCancelled, collection_id)
                .with_before(&before)
                .with_after(&after);
            trail.push(record);
            Ok(after)
        })
    }

    /// Collections are never deleted; cancel them instead.
    pub fn delete_collection(&self, ctx: &OperationContext, collection_id: CollectionId) -> EngineResult<()> {
        warn!(actor = %ctx.actor_id(), collection = %collection_id, "collection deletion refused");
        Err(LedgerError::DeletionNotAllowed { entity: "collection" }.into())
    }

    pub fn collection(&self, collection_id: CollectionId) -> EngineResult<Collection> {
        self.query(|state| state.collection(collection_id).cloned())
    }
}
