//! Ballots recorded in the vote ledger.

use crate::ids::{HolderId, ProposalId};
use crate::state::VoteChoice;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// One ballot. Recasting never edits a row; it stamps `superseded_at` on the
/// previous one and appends a new one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal: ProposalId,
    pub voter: HolderId,
    pub choice: VoteChoice,
    pub cast_at: Timestamp,
    /// `None` while this is the voter's current ballot.
    pub superseded_at: Option<Timestamp>,
}

impl Vote {
    pub fn new(
        proposal: ProposalId,
        voter: HolderId,
        choice: VoteChoice,
        cast_at: Timestamp,
    ) -> Self {
        Self {
            proposal,
            voter,
            choice,
            cast_at,
            superseded_at: None,
        }
    }

    pub fn is_current(&self) -> bool {
        self.superseded_at.is_none()
    }
}
