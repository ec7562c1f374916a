//! Tally results.

use crate::ids::ProposalId;
use crate::power::PowerUnits;
use crate::state::{FailureReason, Outcome};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Result of counting a proposal.
///
/// Derived data: always reproducible from the snapshot, the vote ledger and
/// the delegation graph. Stored on close only as a cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyResult {
    pub proposal: ProposalId,
    pub for_power: PowerUnits,
    pub against_power: PowerUnits,
    pub abstain_power: PowerUnits,
    /// `for + against + abstain`.
    pub total_voted_power: PowerUnits,
    pub total_eligible_power: PowerUnits,
    pub quorum_met: bool,
    pub outcome: Outcome,
    /// Set iff `outcome` is `Failed`.
    pub failure_reason: Option<FailureReason>,
    pub computed_at: Timestamp,
}

impl TallyResult {
    /// The result recorded for a proposal whose snapshot was empty.
    pub fn no_eligible_voters(proposal: ProposalId, computed_at: Timestamp) -> Self {
        Self {
            proposal,
            for_power: PowerUnits::ZERO,
            against_power: PowerUnits::ZERO,
            abstain_power: PowerUnits::ZERO,
            total_voted_power: PowerUnits::ZERO,
            total_eligible_power: PowerUnits::ZERO,
            quorum_met: false,
            outcome: Outcome::Failed,
            failure_reason: Some(FailureReason::NoEligibleVoters),
            computed_at,
        }
    }
}
