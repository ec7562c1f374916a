//! Proposal storage trait.

use crate::StoreError;
use stakegov_types::{Proposal, ProposalId, ProposalStatus};

pub trait ProposalStore {
    /// Allocate the next proposal id. Ids are never reused.
    fn next_proposal_id(&self) -> Result<ProposalId, StoreError>;

    /// Insert or overwrite a proposal.
    fn put_proposal(&self, proposal: &Proposal) -> Result<(), StoreError>;

    fn get_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, StoreError>;

    /// All proposals with the given status, ordered by id.
    fn list_proposals_by_status(&self, status: ProposalStatus) -> Result<Vec<Proposal>, StoreError>;
}
