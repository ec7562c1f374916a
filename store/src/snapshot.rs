//! Power snapshot storage trait.

use crate::StoreError;
use stakegov_types::{PowerSnapshot, ProposalId};

pub trait SnapshotStore {
    /// Write the snapshot for a proposal.
    ///
    /// Snapshots are write-once: fails with [`StoreError::Duplicate`] if one
    /// already exists for the proposal.
    fn put_snapshot(&self, snapshot: &PowerSnapshot) -> Result<(), StoreError>;

    fn get_snapshot(&self, proposal: &ProposalId) -> Result<Option<PowerSnapshot>, StoreError>;
}
