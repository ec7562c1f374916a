//! Fundamental types for stakegov.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! holder/asset/proposal ids, power units, timestamps, governance parameters, and
//! the records of the voting data model (proposals, snapshots, delegation edges,
//! votes, tally results).

pub mod delegation;
pub mod error;
pub mod ids;
pub mod params;
pub mod power;
pub mod proposal;
pub mod snapshot;
pub mod state;
pub mod tally;
pub mod time;
pub mod vote;

pub use delegation::{DelegationContext, DelegationEdge, DelegationScope};
pub use error::TypesError;
pub use ids::{AssetId, HolderId, ProposalId};
pub use params::GovernanceParams;
pub use power::{Percent, PowerUnits};
pub use proposal::{NewProposal, Proposal, ProposalType, Thresholds, VotingWindow};
pub use snapshot::PowerSnapshot;
pub use state::{FailureReason, Outcome, ProposalStatus, VoteChoice};
pub use tally::TallyResult;
pub use time::Timestamp;
pub use vote::Vote;
