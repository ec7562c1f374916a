//! Governance proposals.

use crate::error::TypesError;
use crate::ids::{AssetId, HolderId, ProposalId};
use crate::power::{Percent, PowerUnits};
use crate::state::{FailureReason, ProposalStatus};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of decision a proposal asks for.
///
/// Delegations can be scoped to a proposal type, so a holder can hand
/// operational votes to a property manager while keeping exit votes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    Operational,
    Financial,
    Exit,
    Management,
    Distribution,
    Other,
}

impl ProposalType {
    pub const ALL: [ProposalType; 6] = [
        Self::Operational,
        Self::Financial,
        Self::Exit,
        Self::Management,
        Self::Distribution,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::Financial => "financial",
            Self::Exit => "exit",
            Self::Management => "management",
            Self::Distribution => "distribution",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TypesError::UnknownVariant {
                kind: "proposal type",
                value: s.to_string(),
            })
    }
}

/// The half-open interval `[starts_at, ends_at)` during which votes are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingWindow {
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

impl VotingWindow {
    pub fn new(starts_at: Timestamp, ends_at: Timestamp) -> Self {
        Self { starts_at, ends_at }
    }

    pub fn is_well_formed(&self) -> bool {
        self.ends_at > self.starts_at
    }

    pub fn contains(&self, now: Timestamp) -> bool {
        self.starts_at <= now && now < self.ends_at
    }

    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.ends_at
    }
}

/// Quorum and pass thresholds of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum share of eligible power that must participate (inclusive).
    pub quorum_pct: Percent,
    /// Share of `for / (for + against)` that must be strictly exceeded.
    pub pass_pct: Percent,
}

impl Thresholds {
    pub fn new(quorum_pct: Percent, pass_pct: Percent) -> Self {
        Self {
            quorum_pct,
            pass_pct,
        }
    }

    /// The given quorum with the default simple-majority pass threshold.
    pub fn with_quorum(quorum_pct: Percent) -> Self {
        Self::new(quorum_pct, Percent::HALF)
    }
}

/// Request to create a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProposal {
    pub asset: AssetId,
    pub proposal_type: ProposalType,
    pub window: VotingWindow,
    pub thresholds: Thresholds,
}

/// A governance proposal scoped to one asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub asset: AssetId,
    pub proposal_type: ProposalType,
    pub created_by: HolderId,
    pub created_at: Timestamp,
    pub window: VotingWindow,
    pub thresholds: Thresholds,
    pub status: ProposalStatus,
    /// Set when the proposal fails, either at activation or at close.
    pub failure_reason: Option<FailureReason>,
    /// `None` until the power snapshot is written.
    pub snapshot_taken_at: Option<Timestamp>,
    /// Copied from the snapshot at activation; zero before that.
    pub total_eligible_power: PowerUnits,
    pub closed_at: Option<Timestamp>,
    pub executed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
}

impl Proposal {
    /// Build a draft proposal from a creation request.
    pub fn draft(
        id: ProposalId,
        created_by: HolderId,
        request: NewProposal,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            asset: request.asset,
            proposal_type: request.proposal_type,
            created_by,
            created_at: now,
            window: request.window,
            thresholds: request.thresholds,
            status: ProposalStatus::Draft,
            failure_reason: None,
            snapshot_taken_at: None,
            total_eligible_power: PowerUnits::ZERO,
            closed_at: None,
            executed_at: None,
            cancelled_at: None,
        }
    }

    /// Whether a ballot cast at `now` falls inside the voting window of an
    /// active proposal.
    pub fn accepts_votes_at(&self, now: Timestamp) -> bool {
        self.status == ProposalStatus::Active && self.window.contains(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_half_open() {
        let w = VotingWindow::new(Timestamp::new(100), Timestamp::new(200));
        assert!(!w.contains(Timestamp::new(99)));
        assert!(w.contains(Timestamp::new(100)));
        assert!(w.contains(Timestamp::new(199)));
        assert!(!w.contains(Timestamp::new(200)));
        assert!(w.has_ended(Timestamp::new(200)));
    }

    #[test]
    fn window_must_have_positive_length() {
        assert!(!VotingWindow::new(Timestamp::new(5), Timestamp::new(5)).is_well_formed());
        assert!(VotingWindow::new(Timestamp::new(5), Timestamp::new(6)).is_well_formed());
    }

    #[test]
    fn proposal_type_parses() {
        assert_eq!("exit".parse::<ProposalType>().unwrap(), ProposalType::Exit);
        assert!("vacation".parse::<ProposalType>().is_err());
    }
}
