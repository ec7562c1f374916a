//! Tally cache storage trait.

use crate::StoreError;
use stakegov_types::{ProposalId, TallyResult};

/// Cache of final tallies, written when a proposal closes.
pub trait TallyStore {
    fn put_tally(&self, tally: &TallyResult) -> Result<(), StoreError>;

    fn get_tally(&self, proposal: &ProposalId) -> Result<Option<TallyResult>, StoreError>;
}
