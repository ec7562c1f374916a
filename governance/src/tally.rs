//! Weighted tally with liquid delegation.
//!
//! Every snapshot entry's power is attributed exactly once:
//! 1. to its own current ballot, if it cast one;
//! 2. otherwise to its effective controller's current ballot;
//! 3. otherwise to nobody.
//!
//! Quorum is `voted / eligible >= quorum_pct` (inclusive). Abstain counts
//! toward quorum but not toward the pass ratio, which is
//! `for / (for + against) > pass_pct` (strict). All comparisons are exact.

use crate::delegation::DelegationGraph;
use crate::error::GovernanceError;
use stakegov_store::DelegationStore;
use stakegov_types::{
    DelegationContext, FailureReason, HolderId, Outcome, PowerSnapshot, PowerUnits, Proposal,
    TallyResult, Thresholds, Timestamp, Vote, VoteChoice,
};
use std::collections::HashMap;

/// Outcome of applying the thresholds to a set of power sums.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub quorum_met: bool,
    pub outcome: Outcome,
    pub failure_reason: Option<FailureReason>,
}

/// Apply quorum and pass thresholds.
pub fn decide(
    for_power: PowerUnits,
    against_power: PowerUnits,
    abstain_power: PowerUnits,
    total_eligible_power: PowerUnits,
    thresholds: &Thresholds,
) -> Result<Decision, GovernanceError> {
    let fail = |quorum_met, reason| Decision {
        quorum_met,
        outcome: Outcome::Failed,
        failure_reason: Some(reason),
    };

    if total_eligible_power.is_zero() {
        return Ok(fail(false, FailureReason::NoEligibleVoters));
    }
    let voted = PowerUnits::checked_sum([for_power, against_power, abstain_power])
        .ok_or(GovernanceError::Overflow)?;
    let quorum_met = voted
        .ratio_at_least(total_eligible_power, thresholds.quorum_pct)
        .ok_or(GovernanceError::Overflow)?;
    if !quorum_met {
        return Ok(fail(false, FailureReason::QuorumNotMet));
    }

    let directional = for_power
        .checked_add(against_power)
        .ok_or(GovernanceError::Overflow)?;
    if directional.is_zero() {
        return Ok(fail(true, FailureReason::NoDirectionalVotes));
    }
    let passes = for_power
        .ratio_exceeds(directional, thresholds.pass_pct)
        .ok_or(GovernanceError::Overflow)?;
    if !passes {
        return Ok(fail(true, FailureReason::ThresholdNotMet));
    }
    Ok(Decision {
        quorum_met: true,
        outcome: Outcome::Passed,
        failure_reason: None,
    })
}

/// Compute the tally of `proposal` from its snapshot and current ballots.
///
/// Pure: reads only its inputs and the delegation log, writes nothing.
/// Delegation is resolved as of `as_of`; `computed_at` stamps the result.
pub fn compute_tally<D: DelegationStore + ?Sized>(
    proposal: &Proposal,
    snapshot: &PowerSnapshot,
    current_votes: &[Vote],
    graph: &DelegationGraph<'_, D>,
    as_of: Timestamp,
    computed_at: Timestamp,
) -> Result<TallyResult, GovernanceError> {
    let ballots: HashMap<&HolderId, VoteChoice> = current_votes
        .iter()
        .filter(|v| v.is_current())
        .map(|v| (&v.voter, v.choice))
        .collect();
    let ctx = DelegationContext::for_proposal(proposal);
    let mut resolver = graph.resolver(&ctx, as_of);

    let mut sums = [PowerUnits::ZERO; 3];
    for (holder, power) in snapshot.iter() {
        let choice = match ballots.get(holder) {
            Some(choice) => Some(*choice),
            None => {
                let controller = resolver.resolve(holder)?;
                ballots.get(&controller).copied()
            }
        };
        let slot = match choice {
            Some(VoteChoice::For) => 0,
            Some(VoteChoice::Against) => 1,
            Some(VoteChoice::Abstain) => 2,
            None => continue,
        };
        sums[slot] = sums[slot]
            .checked_add(power)
            .ok_or(GovernanceError::Overflow)?;
    }
    let [for_power, against_power, abstain_power] = sums;
    let total_voted_power =
        PowerUnits::checked_sum(sums).ok_or(GovernanceError::Overflow)?;
    let total_eligible_power = snapshot.total_eligible_power();

    let decision = decide(
        for_power,
        against_power,
        abstain_power,
        total_eligible_power,
        &proposal.thresholds,
    )?;
    Ok(TallyResult {
        proposal: proposal.id,
        for_power,
        against_power,
        abstain_power,
        total_voted_power,
        total_eligible_power,
        quorum_met: decision.quorum_met,
        outcome: decision.outcome,
        failure_reason: decision.failure_reason,
        computed_at,
    })
}
