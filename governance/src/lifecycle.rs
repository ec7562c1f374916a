//! Proposal state machine.
//!
//! ```text
//! draft ──► active ──► passed ──► executed
//!   │          │   └─► failed
//!   └──────────┴─► cancelled      (active only while no ballot exists)
//! ```
//!
//! Every mutation of `Proposal::status` goes through [`apply`], which refuses
//! any edge the machine does not have.

use crate::error::GovernanceError;
use stakegov_types::{
    FailureReason, PowerUnits, Proposal, ProposalStatus, TallyResult, Timestamp,
};

/// A requested lifecycle step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Activate,
    Close,
    Cancel,
    MarkExecuted,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Close => "close",
            Self::Cancel => "cancel",
            Self::MarkExecuted => "mark executed",
        }
    }

    fn allowed_from(&self, status: ProposalStatus) -> bool {
        use ProposalStatus::*;
        match self {
            Self::Activate => status == Draft,
            Self::Close => status == Active,
            Self::Cancel => matches!(status, Draft | Active),
            Self::MarkExecuted => status == Passed,
        }
    }
}

/// Reject `transition` unless `proposal`'s status has the matching edge.
pub fn check(proposal: &Proposal, transition: Transition) -> Result<(), GovernanceError> {
    if transition.allowed_from(proposal.status) {
        return Ok(());
    }
    tracing::error!(
        proposal = %proposal.id,
        status = proposal.status.as_str(),
        transition = transition.as_str(),
        "rejected invalid lifecycle transition"
    );
    Err(GovernanceError::InvalidTransition {
        proposal: proposal.id,
        from: proposal.status,
        action: transition.as_str(),
    })
}

fn apply(
    proposal: &mut Proposal,
    next: ProposalStatus,
    transition: Transition,
) -> Result<(), GovernanceError> {
    check(proposal, transition)?;
    if !proposal.status.can_transition_to(next) {
        return Err(GovernanceError::InvalidTransition {
            proposal: proposal.id,
            from: proposal.status,
            action: transition.as_str(),
        });
    }
    tracing::info!(
        proposal = %proposal.id,
        from = proposal.status.as_str(),
        to = next.as_str(),
        "proposal transition"
    );
    proposal.status = next;
    Ok(())
}

/// draft → active, recording the snapshot that was just taken.
pub fn activate(
    proposal: &mut Proposal,
    total_eligible_power: PowerUnits,
    now: Timestamp,
) -> Result<(), GovernanceError> {
    apply(proposal, ProposalStatus::Active, Transition::Activate)?;
    proposal.snapshot_taken_at = Some(now);
    proposal.total_eligible_power = total_eligible_power;
    Ok(())
}

/// draft → failed because nobody holds the asset.
pub fn fail_without_voters(proposal: &mut Proposal, now: Timestamp) -> Result<(), GovernanceError> {
    apply(proposal, ProposalStatus::Failed, Transition::Activate)?;
    proposal.failure_reason = Some(FailureReason::NoEligibleVoters);
    proposal.snapshot_taken_at = Some(now);
    proposal.closed_at = Some(now);
    Ok(())
}

/// active → passed | failed, per the final tally.
pub fn close(
    proposal: &mut Proposal,
    tally: &TallyResult,
    now: Timestamp,
) -> Result<(), GovernanceError> {
    apply(proposal, tally.outcome.as_status(), Transition::Close)?;
    proposal.failure_reason = tally.failure_reason;
    proposal.closed_at = Some(now);
    Ok(())
}

/// draft | active → cancelled. `ballots` is the number of ballots ever cast.
pub fn cancel(
    proposal: &mut Proposal,
    ballots: u64,
    now: Timestamp,
) -> Result<(), GovernanceError> {
    check(proposal, Transition::Cancel)?;
    if proposal.status == ProposalStatus::Active && ballots > 0 {
        return Err(GovernanceError::CancelNotAllowed(proposal.id));
    }
    apply(proposal, ProposalStatus::Cancelled, Transition::Cancel)?;
    proposal.cancelled_at = Some(now);
    Ok(())
}

/// passed → executed. Execution itself happens outside the core.
pub fn mark_executed(proposal: &mut Proposal, now: Timestamp) -> Result<(), GovernanceError> {
    apply(proposal, ProposalStatus::Executed, Transition::MarkExecuted)?;
    proposal.executed_at = Some(now);
    Ok(())
}
