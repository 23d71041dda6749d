//! Collections domain module: customer payments and their distribution over
//! open invoices.
//!
//! The distributor is pure: it plans allocations from a read of the
//! customer's invoices. Applying the plan to invoices (and reversing it on
//! cancellation) is done by the caller inside one transaction.

pub mod collection;
pub mod distributor;

pub use collection::{
    Collection, CollectionAllocation, CollectionStatus, DistributionMethod, NewCollection,
};
pub use distributor::{ManualAllocation, apply_allocations, distribute, reverse_allocations};
