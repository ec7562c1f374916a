//! Vote ledger storage trait.

use crate::StoreError;
use stakegov_types::{HolderId, ProposalId, Vote};

pub trait VoteStore {
    /// Append `vote` as the voter's current ballot.
    ///
    /// Atomically stamps `superseded_at = vote.cast_at` on the voter's
    /// previous current ballot for the same proposal (if any) and inserts the
    /// new row. Returns the superseded ballot.
    fn record_vote(&self, vote: &Vote) -> Result<Option<Vote>, StoreError>;

    /// The voter's current (non-superseded) ballot.
    fn current_vote(
        &self,
        proposal: &ProposalId,
        voter: &HolderId,
    ) -> Result<Option<Vote>, StoreError>;

    /// Every current ballot on the proposal, ordered by voter.
    fn current_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, StoreError>;

    /// All ballots by the voter on the proposal, superseded ones included,
    /// oldest first.
    fn vote_history(
        &self,
        proposal: &ProposalId,
        voter: &HolderId,
    ) -> Result<Vec<Vote>, StoreError>;

    /// Number of ballots ever cast on the proposal, superseded ones included.
    fn count_ballots(&self, proposal: &ProposalId) -> Result<u64, StoreError>;
}
