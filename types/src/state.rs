//! State enums for proposals, votes, and outcomes.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a proposal is in its lifecycle.
///
/// ```text
/// draft ──► active ──► passed ──► executed
///   │          │   └─► failed
///   └──────────┴─► cancelled
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Active,
    Passed,
    Failed,
    Executed,
    Cancelled,
}

impl ProposalStatus {
    /// Whether the proposal has received a final outcome.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Executed)
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed | Self::Executed | Self::Cancelled)
    }

    /// Whether the state machine has an edge from `self` to `next`.
    ///
    /// Cancelling an active proposal is additionally gated on it having no
    /// votes; that check belongs to the lifecycle controller.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        use ProposalStatus::*;
        matches!(
            (self, next),
            (Draft, Active)
                | (Draft, Failed)
                | (Draft, Cancelled)
                | (Active, Passed)
                | (Active, Failed)
                | (Active, Cancelled)
                | (Passed, Executed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Executed => "executed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "passed" => Ok(Self::Passed),
            "failed" => Ok(Self::Failed),
            "executed" => Ok(Self::Executed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(TypesError::UnknownVariant {
                kind: "proposal status",
                value: other.to_string(),
            }),
        }
    }
}

/// Why a proposal ended up `failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Nobody held units of the asset when the snapshot was taken.
    NoEligibleVoters,
    QuorumNotMet,
    /// Quorum was met but only abstentions were cast.
    NoDirectionalVotes,
    ThresholdNotMet,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoEligibleVoters => "no_eligible_voters",
            Self::QuorumNotMet => "quorum_not_met",
            Self::NoDirectionalVotes => "no_directional_votes",
            Self::ThresholdNotMet => "threshold_not_met",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The choice on a single ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    For,
    Against,
    Abstain,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::For => "for",
            Self::Against => "against",
            Self::Abstain => "abstain",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteChoice {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "for" | "yes" => Ok(Self::For),
            "against" | "no" => Ok(Self::Against),
            "abstain" => Ok(Self::Abstain),
            other => Err(TypesError::UnknownVariant {
                kind: "vote choice",
                value: other.to_string(),
            }),
        }
    }
}

/// Final result of a tally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
}

impl Outcome {
    /// The proposal status this outcome closes into.
    pub fn as_status(&self) -> ProposalStatus {
        match self {
            Self::Passed => ProposalStatus::Passed,
            Self::Failed => ProposalStatus::Failed,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_only_move_forward() {
        use ProposalStatus::*;
        assert!(Draft.can_transition_to(Active));
        assert!(Active.can_transition_to(Passed));
        assert!(Passed.can_transition_to(Executed));
        assert!(!Passed.can_transition_to(Active));
        assert!(!Failed.can_transition_to(Executed));
        assert!(!Executed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Draft));
        assert!(!Passed.can_transition_to(Cancelled));
    }

    #[test]
    fn closed_and_terminal() {
        assert!(ProposalStatus::Passed.is_closed());
        assert!(!ProposalStatus::Passed.is_terminal());
        assert!(ProposalStatus::Cancelled.is_terminal());
        assert!(!ProposalStatus::Cancelled.is_closed());
    }

    #[test]
    fn wire_names_round_trip() {
        for s in ["draft", "active", "passed", "failed", "executed", "cancelled"] {
            assert_eq!(s.parse::<ProposalStatus>().unwrap().as_str(), s);
        }
        assert_eq!("yes".parse::<VoteChoice>().unwrap(), VoteChoice::For);
        assert!("maybe".parse::<VoteChoice>().is_err());
        assert_eq!(
            serde_json::to_string(&FailureReason::QuorumNotMet).unwrap(),
            "\"quorum_not_met\""
        );
    }
}
