//! Vote ledger: records ballots, one current ballot per voter per proposal.

use crate::delegation::DelegationGraph;
use crate::error::GovernanceError;
use stakegov_store::{DelegationStore, VoteStore};
use stakegov_types::{
    DelegationContext, HolderId, PowerSnapshot, Proposal, Timestamp, Vote, VoteChoice,
};

/// Records ballots after checking the voting window and eligibility.
///
/// The ledger stores only who chose what. Power is looked up at tally time,
/// so a later delegation change never requires rewriting a ballot.
pub struct VoteLedger<'a, S: VoteStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: VoteStore + ?Sized> VoteLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Cast or replace `voter`'s ballot on `proposal`.
    ///
    /// A voter is eligible if it holds power in the snapshot or is, at `now`,
    /// the effective controller of someone who does. Its previous ballot, if
    /// any, is superseded in the same store operation that appends the new one.
    pub fn cast_vote<D: DelegationStore + ?Sized>(
        &self,
        proposal: &Proposal,
        snapshot: &PowerSnapshot,
        graph: &DelegationGraph<'_, D>,
        voter: &HolderId,
        choice: VoteChoice,
        now: Timestamp,
    ) -> Result<Vote, GovernanceError> {
        if !proposal.accepts_votes_at(now) {
            return Err(GovernanceError::InvalidVotingWindow {
                proposal: proposal.id,
                at: now,
            });
        }

        let ctx = DelegationContext::for_proposal(proposal);
        let eligible = !snapshot.power_of(voter).is_zero()
            || graph.controls_delegated_power(voter, snapshot, &ctx, now)?;
        if !eligible {
            return Err(GovernanceError::IneligibleVoter {
                proposal: proposal.id,
                holder: voter.clone(),
            });
        }

        if let Some(current) = self.store.current_vote(&proposal.id, voter)? {
            if now < current.cast_at {
                return Err(GovernanceError::NonMonotonicTimestamp {
                    at: now,
                    latest: current.cast_at,
                });
            }
        }

        let vote = Vote::new(proposal.id, voter.clone(), choice, now);
        let superseded = self.store.record_vote(&vote)?;
        tracing::debug!(
            proposal = %proposal.id,
            voter = %voter,
            choice = choice.as_str(),
            replaced = superseded.is_some(),
            "ballot recorded"
        );
        Ok(vote)
    }

    pub fn current_votes(&self, proposal: &Proposal) -> Result<Vec<Vote>, GovernanceError> {
        Ok(self.store.current_votes(&proposal.id)?)
    }

    pub fn history(
        &self,
        proposal: &Proposal,
        voter: &HolderId,
    ) -> Result<Vec<Vote>, GovernanceError> {
        Ok(self.store.vote_history(&proposal.id, voter)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakegov_store_mem::MemStore;
    use stakegov_types::{
        AssetId, DelegationScope, NewProposal, Percent, PowerUnits, ProposalId, ProposalStatus,
        ProposalType, Thresholds, VotingWindow,
    };

    fn holder(name: &str) -> HolderId {
        HolderId::new(name)
    }

    fn active_proposal() -> Proposal {
        let mut p = Proposal::draft(
            ProposalId::new(1),
            holder("creator"),
            NewProposal {
                asset: AssetId::new("tower-7"),
                proposal_type: ProposalType::Operational,
                window: VotingWindow::new(Timestamp::new(100), Timestamp::new(200)),
                thresholds: Thresholds::with_quorum(Percent::ZERO),
            },
            Timestamp::new(50),
        );
        p.status = ProposalStatus::Active;
        p
    }

    fn snapshot() -> PowerSnapshot {
        PowerSnapshot::new(
            ProposalId::new(1),
            Timestamp::new(100),
            Timestamp::new(100),
            vec![
                (holder("h1"), PowerUnits::new(600)),
                (holder("h2"), PowerUnits::new(400)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn recast_supersedes_previous_ballot() {
        let store = MemStore::new();
        let graph = DelegationGraph::new(&store, 8);
        let ledger = VoteLedger::new(&store);
        let p = active_proposal();
        let snap = snapshot();

        ledger
            .cast_vote(&p, &snap, &graph, &holder("h1"), VoteChoice::For, Timestamp::new(110))
            .unwrap();
        ledger
            .cast_vote(&p, &snap, &graph, &holder("h1"), VoteChoice::Against, Timestamp::new(120))
            .unwrap();

        let current = ledger.current_votes(&p).unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].choice, VoteChoice::Against);
        let history = ledger.history(&p, &holder("h1")).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].superseded_at, Some(Timestamp::new(120)));
    }

    #[test]
    fn back_dated_recast_is_rejected() {
        let store = MemStore::new();
        let graph = DelegationGraph::new(&store, 8);
        let ledger = VoteLedger::new(&store);
        let p = active_proposal();
        let snap = snapshot();

        ledger
            .cast_vote(&p, &snap, &graph, &holder("h1"), VoteChoice::For, Timestamp::new(150))
            .unwrap();
        let err = ledger
            .cast_vote(&p, &snap, &graph, &holder("h1"), VoteChoice::Against, Timestamp::new(120))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::NonMonotonicTimestamp { .. }));

        let current = ledger.current_votes(&p).unwrap();
        assert_eq!(current[0].choice, VoteChoice::For);
        assert_eq!(ledger.history(&p, &holder("h1")).unwrap().len(), 1);

        // Another voter is unaffected by h1's clock.
        ledger
            .cast_vote(&p, &snap, &graph, &holder("h2"), VoteChoice::Against, Timestamp::new(110))
            .unwrap();
    }

    #[test]
    fn votes_outside_window_are_rejected() {
        let store = MemStore::new();
        let graph = DelegationGraph::new(&store, 8);
        let ledger = VoteLedger::new(&store);
        let p = active_proposal();
        let snap = snapshot();

        for at in [99, 200, 500] {
            let err = ledger
                .cast_vote(&p, &snap, &graph, &holder("h1"), VoteChoice::For, Timestamp::new(at))
                .unwrap_err();
            assert!(matches!(err, GovernanceError::InvalidVotingWindow { .. }));
        }
        assert!(ledger.current_votes(&p).unwrap().is_empty());
    }

    #[test]
    fn holder_without_power_is_ineligible() {
        let store = MemStore::new();
        let graph = DelegationGraph::new(&store, 8);
        let ledger = VoteLedger::new(&store);
        let err = ledger
            .cast_vote(
                &active_proposal(),
                &snapshot(),
                &graph,
                &holder("stranger"),
                VoteChoice::For,
                Timestamp::new(110),
            )
            .unwrap_err();
        assert!(matches!(err, GovernanceError::IneligibleVoter { .. }));
    }

    #[test]
    fn delegate_without_own_power_may_vote() {
        let store = MemStore::new();
        let graph = DelegationGraph::new(&store, 8);
        graph
            .create_edge(&holder("h2"), &holder("rep"), DelegationScope::Global, Timestamp::new(10))
            .unwrap();
        let ledger = VoteLedger::new(&store);
        ledger
            .cast_vote(
                &active_proposal(),
                &snapshot(),
                &graph,
                &holder("rep"),
                VoteChoice::For,
                Timestamp::new(110),
            )
            .unwrap();
    }

    #[test]
    fn draft_proposal_accepts_no_votes() {
        let store = MemStore::new();
        let graph = DelegationGraph::new(&store, 8);
        let ledger = VoteLedger::new(&store);
        let mut p = active_proposal();
        p.status = ProposalStatus::Draft;
        let err = ledger
            .cast_vote(&p, &snapshot(), &graph, &holder("h1"), VoteChoice::For, Timestamp::new(110))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidVotingWindow { .. }));
    }
}
