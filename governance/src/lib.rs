//! Stake-weighted governance with liquid delegation.
//!
//! Holders of an asset vote on proposals scoped to it, with voting power equal
//! to the units they held when the proposal was activated. Power can be
//! delegated, transitively and per scope, and any holder may override its
//! delegate by voting directly.
//!
//! - [`snapshot`]: freezes the eligible pool once per proposal
//! - [`delegation`]: acyclic, scoped delegation graph with point-in-time resolution
//! - [`ledger`]: one current ballot per voter, full history kept
//! - [`tally`]: pure weighted tally with exact threshold arithmetic
//! - [`lifecycle`]: the proposal state machine
//! - [`engine`]: the facade tying them together under per-proposal locks

pub mod delegation;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod lifecycle;
mod locks;
pub mod snapshot;
pub mod tally;

pub use delegation::{DelegationGraph, Resolver};
pub use engine::{GovernanceEngine, SweepReport, VotingPower};
pub use error::GovernanceError;
pub use ledger::VoteLedger;
pub use lifecycle::Transition;
pub use snapshot::SnapshotService;
pub use tally::{compute_tally, decide, Decision};
