use stakegov_holdings::HoldingsError;
use stakegov_store::StoreError;
use stakegov_types::{AssetId, DelegationScope, HolderId, ProposalId, ProposalStatus, Timestamp};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("proposal {proposal} is not accepting votes at {at}")]
    InvalidVotingWindow { proposal: ProposalId, at: Timestamp },

    #[error("holder {holder} has no own or delegated power on proposal {proposal}")]
    IneligibleVoter { proposal: ProposalId, holder: HolderId },

    #[error("cannot delegate to self")]
    SelfDelegation,

    #[error("delegation {delegator} -> {delegate} in scope {scope} would form a cycle")]
    CyclicDelegation {
        delegator: HolderId,
        delegate: HolderId,
        scope: DelegationScope,
    },

    #[error("{delegator} already has a live delegation in scope {scope}; revoke it first")]
    DuplicateEdge {
        delegator: HolderId,
        scope: DelegationScope,
    },

    #[error("delegation {delegator} -> {delegate} would make a chain longer than {max} hops")]
    ChainTooLong {
        delegator: HolderId,
        delegate: HolderId,
        max: usize,
    },

    #[error("no holder has units of asset {asset}; proposal {proposal} failed")]
    EmptyEligiblePool { proposal: ProposalId, asset: AssetId },

    #[error("holdings adapter unavailable after {attempts} attempts: {last}")]
    AdapterUnavailable { attempts: u32, last: HoldingsError },

    #[error("voting on {proposal} is open until {ends_at}")]
    VotingNotEnded { proposal: ProposalId, ends_at: Timestamp },

    #[error("proposal {0} has no power snapshot")]
    SnapshotMissing(ProposalId),

    #[error("proposal {0} already has ballots and cannot be cancelled")]
    CancelNotAllowed(ProposalId),

    #[error("write at {at} is earlier than the last recorded change at {latest}")]
    NonMonotonicTimestamp { at: Timestamp, latest: Timestamp },

    #[error("cannot {action} proposal {proposal} in status {from}")]
    InvalidTransition {
        proposal: ProposalId,
        from: ProposalStatus,
        action: &'static str,
    },

    #[error("delegation chain from {holder} exceeds {max} hops; delegation graph is corrupt")]
    DelegationDepthExceeded { holder: HolderId, max: usize },

    #[error("power arithmetic overflow")]
    Overflow,

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("holdings: {0}")]
    Holdings(#[from] HoldingsError),
}

impl GovernanceError {
    /// Stable machine-readable code for the presentation layer.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProposalNotFound(_) => "proposal_not_found",
            Self::InvalidProposal(_) => "invalid_proposal",
            Self::InvalidVotingWindow { .. } => "invalid_voting_window",
            Self::IneligibleVoter { .. } => "ineligible_voter",
            Self::SelfDelegation => "self_delegation",
            Self::CyclicDelegation { .. } => "cyclic_delegation",
            Self::DuplicateEdge { .. } => "duplicate_edge",
            Self::ChainTooLong { .. } => "chain_too_long",
            Self::EmptyEligiblePool { .. } => "empty_eligible_pool",
            Self::AdapterUnavailable { .. } => "adapter_unavailable",
            Self::VotingNotEnded { .. } => "voting_not_ended",
            Self::SnapshotMissing(_) => "snapshot_missing",
            Self::CancelNotAllowed(_) => "cancel_not_allowed",
            Self::NonMonotonicTimestamp { .. } => "non_monotonic_timestamp",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::DelegationDepthExceeded { .. } => "delegation_depth_exceeded",
            Self::Overflow => "overflow",
            Self::Store(_) => "store",
            Self::Holdings(_) => "holdings",
        }
    }

    /// Errors that indicate a caller bug or corrupt state rather than a
    /// rejected request.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. } | Self::DelegationDepthExceeded { .. } | Self::Overflow
        )
    }

    /// Whether the same request may succeed if retried later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::AdapterUnavailable { .. } => true,
            Self::Holdings(e) => e.is_transient(),
            _ => false,
        }
    }
}
