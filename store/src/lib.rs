//! Abstract storage traits for stakegov.
//!
//! Every storage backend (the in-memory `MemStore`, or a database-backed store
//! supplied by the embedding application) implements these traits. The
//! governance core depends only on the traits.
//!
//! Records are typed (`stakegov_types`). Operations that must be atomic, such
//! as superseding a vote and inserting its replacement, are single trait
//! methods so a backend can run them inside one transaction.

pub mod delegation;
pub mod error;
pub mod proposal;
pub mod snapshot;
pub mod tally;
pub mod vote;

pub use delegation::DelegationStore;
pub use error::StoreError;
pub use proposal::ProposalStore;
pub use snapshot::SnapshotStore;
pub use tally::TallyStore;
pub use vote::VoteStore;

/// Everything the governance engine needs from a backend.
pub trait GovernanceStore:
    ProposalStore + SnapshotStore + DelegationStore + VoteStore + TallyStore + Send + Sync
{
}

impl<T> GovernanceStore for T where
    T: ProposalStore + SnapshotStore + DelegationStore + VoteStore + TallyStore + Send + Sync
{
}
