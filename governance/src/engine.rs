//! Governance engine: the facade collaborators call.
//!
//! Owns the store, the holdings adapter, the parameters, and the lock tables
//! that serialize conflicting writes. Every operation takes the acting holder
//! and the current instant explicitly; there is no ambient session state.

use crate::delegation::DelegationGraph;
use crate::error::GovernanceError;
use crate::ledger::VoteLedger;
use crate::lifecycle;
use crate::locks::{self, LockTable};
use crate::snapshot::SnapshotService;
use crate::tally::compute_tally;
use serde::{Deserialize, Serialize};
use stakegov_holdings::HoldingsAdapter;
use stakegov_store::GovernanceStore;
use stakegov_types::{
    DelegationContext, DelegationEdge, DelegationScope, GovernanceParams, HolderId, NewProposal,
    PowerSnapshot, PowerUnits, Proposal, ProposalId, ProposalStatus, TallyResult, Timestamp, Vote,
    VoteChoice,
};
use std::sync::{Arc, Mutex, RwLock};

/// A holder's standing on one proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingPower {
    pub holder: HolderId,
    pub proposal: ProposalId,
    /// Units the holder itself holds: from the snapshot once the proposal is
    /// active, from live holdings while it is a draft.
    pub own_power: PowerUnits,
    /// Power of other holders whose chain ends at this holder.
    pub delegated_in_power: PowerUnits,
    /// Direct delegate for this proposal's context, if any.
    pub delegated_out_to: Option<HolderId>,
    /// Holder that ends up voting this holder's power when it stays silent.
    pub effective_controller: HolderId,
}

/// What one sweep did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub activated: Vec<ProposalId>,
    pub closed: Vec<ProposalId>,
    /// Drafts that failed on activation because nobody held the asset.
    pub failed_empty: Vec<ProposalId>,
    pub errors: Vec<(ProposalId, String)>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty()
            && self.closed.is_empty()
            && self.failed_empty.is_empty()
            && self.errors.is_empty()
    }
}

pub struct GovernanceEngine<S: GovernanceStore, H: HoldingsAdapter> {
    store: Arc<S>,
    holdings: Arc<H>,
    params: GovernanceParams,
    proposal_locks: LockTable<ProposalId, RwLock<()>>,
    ballot_locks: LockTable<(ProposalId, HolderId), Mutex<()>>,
    delegation_lock: Mutex<()>,
}

impl<S: GovernanceStore, H: HoldingsAdapter> GovernanceEngine<S, H> {
    pub fn new(store: Arc<S>, holdings: Arc<H>, params: GovernanceParams) -> Self {
        Self {
            store,
            holdings,
            params,
            proposal_locks: LockTable::new(),
            ballot_locks: LockTable::new(),
            delegation_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    fn graph(&self) -> DelegationGraph<'_, S> {
        DelegationGraph::new(self.store.as_ref(), self.params.max_delegation_depth)
    }

    fn load(&self, id: &ProposalId) -> Result<Proposal, GovernanceError> {
        self.store
            .get_proposal(id)?
            .ok_or(GovernanceError::ProposalNotFound(*id))
    }

    fn load_snapshot(&self, id: &ProposalId) -> Result<PowerSnapshot, GovernanceError> {
        self.store
            .get_snapshot(id)?
            .ok_or(GovernanceError::SnapshotMissing(*id))
    }

    /// Instant delegation is resolved at when tallying `proposal` at `now`:
    /// the graph as it stood when voting ended, or now if still open.
    fn tally_as_of(proposal: &Proposal, now: Timestamp) -> Timestamp {
        now.min(proposal.window.ends_at)
    }

    // ── Proposals ────────────────────────────────────────────────────────

    /// Record a new draft proposal.
    pub fn create_proposal(
        &self,
        created_by: &HolderId,
        request: NewProposal,
        now: Timestamp,
    ) -> Result<Proposal, GovernanceError> {
        if !request.window.is_well_formed() {
            return Err(GovernanceError::InvalidProposal(format!(
                "voting window must end after it starts ({} .. {})",
                request.window.starts_at, request.window.ends_at
            )));
        }
        let id = self.store.next_proposal_id()?;
        let proposal = Proposal::draft(id, created_by.clone(), request, now);
        self.store.put_proposal(&proposal)?;
        tracing::info!(
            proposal = %id,
            asset = %proposal.asset,
            proposal_type = proposal.proposal_type.as_str(),
            created_by = %created_by,
            "proposal created"
        );
        Ok(proposal)
    }

    /// draft → active. Takes the power snapshot exactly once.
    ///
    /// If nobody holds the asset the proposal moves to failed
    /// (`no_eligible_voters`) and `EmptyEligiblePool` is returned. If the
    /// holdings adapter stays unavailable the proposal remains a draft.
    pub fn activate(&self, id: &ProposalId, now: Timestamp) -> Result<Proposal, GovernanceError> {
        let lock = self.proposal_locks.get(id);
        let _guard = locks::write(&lock);

        let mut proposal = self.load(id)?;
        lifecycle::check(&proposal, lifecycle::Transition::Activate)?;

        // A snapshot left by an interrupted activation is reused, never retaken.
        let snapshot = match self.store.get_snapshot(id)? {
            Some(existing) => Ok(existing),
            None => SnapshotService::new(self.holdings.as_ref(), &self.params).take_snapshot(
                self.store.as_ref(),
                &proposal,
                now,
            ),
        };
        match snapshot {
            Ok(snapshot) => {
                lifecycle::activate(&mut proposal, snapshot.total_eligible_power(), now)?;
                self.store.put_proposal(&proposal)?;
                Ok(proposal)
            }
            Err(e @ GovernanceError::EmptyEligiblePool { .. }) => {
                lifecycle::fail_without_voters(&mut proposal, now)?;
                self.store
                    .put_tally(&TallyResult::no_eligible_voters(proposal.id, now))?;
                self.store.put_proposal(&proposal)?;
                tracing::warn!(
                    proposal = %id,
                    asset = %proposal.asset,
                    "no eligible voters; proposal failed"
                );
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// active → passed | failed once voting has ended.
    ///
    /// Idempotent: closing a closed proposal returns the stored tally.
    pub fn close(&self, id: &ProposalId, now: Timestamp) -> Result<TallyResult, GovernanceError> {
        let lock = self.proposal_locks.get(id);
        let _guard = locks::write(&lock);

        let mut proposal = self.load(id)?;
        if proposal.status.is_closed() {
            return self.stored_tally(&proposal);
        }
        lifecycle::check(&proposal, lifecycle::Transition::Close)?;
        if !proposal.window.has_ended(now) {
            return Err(GovernanceError::VotingNotEnded {
                proposal: *id,
                ends_at: proposal.window.ends_at,
            });
        }

        let tally = self.fresh_tally(&proposal, now)?;
        lifecycle::close(&mut proposal, &tally, now)?;
        self.store.put_tally(&tally)?;
        self.store.put_proposal(&proposal)?;
        tracing::info!(
            proposal = %id,
            outcome = proposal.status.as_str(),
            for_power = %tally.for_power,
            against_power = %tally.against_power,
            abstain_power = %tally.abstain_power,
            eligible = %tally.total_eligible_power,
            "proposal closed"
        );
        Ok(tally)
    }

    /// draft → cancelled, or active → cancelled while no ballot exists.
    pub fn cancel(&self, id: &ProposalId, now: Timestamp) -> Result<Proposal, GovernanceError> {
        let lock = self.proposal_locks.get(id);
        let _guard = locks::write(&lock);

        let mut proposal = self.load(id)?;
        let ballots = self.store.count_ballots(id)?;
        lifecycle::cancel(&mut proposal, ballots, now)?;
        self.store.put_proposal(&proposal)?;
        Ok(proposal)
    }

    /// passed → executed. Bookkeeping only.
    pub fn mark_executed(
        &self,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<Proposal, GovernanceError> {
        let lock = self.proposal_locks.get(id);
        let _guard = locks::write(&lock);

        let mut proposal = self.load(id)?;
        lifecycle::mark_executed(&mut proposal, now)?;
        self.store.put_proposal(&proposal)?;
        Ok(proposal)
    }

    // ── Votes ────────────────────────────────────────────────────────────

    /// Cast or replace `voter`'s ballot.
    pub fn cast_vote(
        &self,
        id: &ProposalId,
        voter: &HolderId,
        choice: VoteChoice,
        now: Timestamp,
    ) -> Result<Vote, GovernanceError> {
        let lock = self.proposal_locks.get(id);
        let _proposal_guard = locks::read(&lock);
        let ballot_lock = self.ballot_locks.get(&(*id, voter.clone()));
        let _ballot_guard = locks::exclusive(&ballot_lock);

        let proposal = self.load(id)?;
        if !proposal.accepts_votes_at(now) {
            return Err(GovernanceError::InvalidVotingWindow { proposal: *id, at: now });
        }
        let snapshot = self.load_snapshot(id)?;
        VoteLedger::new(self.store.as_ref()).cast_vote(
            &proposal,
            &snapshot,
            &self.graph(),
            voter,
            choice,
            now,
        )
    }

    // ── Delegation ───────────────────────────────────────────────────────

    pub fn create_delegation(
        &self,
        delegator: &HolderId,
        delegate: &HolderId,
        scope: DelegationScope,
        now: Timestamp,
    ) -> Result<DelegationEdge, GovernanceError> {
        let _guard = locks::exclusive(&self.delegation_lock);
        let edge = self.graph().create_edge(delegator, delegate, scope, now)?;
        tracing::info!(
            delegator = %edge.delegator,
            delegate = %edge.delegate,
            scope = %edge.scope,
            "delegation created"
        );
        Ok(edge)
    }

    pub fn revoke_delegation(
        &self,
        delegator: &HolderId,
        scope: &DelegationScope,
        now: Timestamp,
    ) -> Result<Option<DelegationEdge>, GovernanceError> {
        let _guard = locks::exclusive(&self.delegation_lock);
        let revoked = self.graph().revoke_edge(delegator, scope, now)?;
        match &revoked {
            Some(edge) => tracing::info!(
                delegator = %delegator,
                delegate = %edge.delegate,
                scope = %scope,
                "delegation revoked"
            ),
            None => tracing::debug!(
                delegator = %delegator,
                scope = %scope,
                "no live delegation to revoke"
            ),
        }
        Ok(revoked)
    }

    // ── Reads ────────────────────────────────────────────────────────────

    /// Tally of a proposal. Closed proposals serve their stored result;
    /// active and cancelled-after-activation ones are computed fresh.
    /// Takes no locks.
    pub fn get_tally(
        &self,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<TallyResult, GovernanceError> {
        let proposal = self.load(id)?;
        if proposal.status.is_closed() {
            return self.stored_tally(&proposal);
        }
        self.fresh_tally(&proposal, now)
    }

    fn fresh_tally(
        &self,
        proposal: &Proposal,
        now: Timestamp,
    ) -> Result<TallyResult, GovernanceError> {
        let snapshot = self.load_snapshot(&proposal.id)?;
        let votes = self.store.current_votes(&proposal.id)?;
        compute_tally(
            proposal,
            &snapshot,
            &votes,
            &self.graph(),
            Self::tally_as_of(proposal, now),
            now,
        )
    }

    fn stored_tally(&self, proposal: &Proposal) -> Result<TallyResult, GovernanceError> {
        if let Some(tally) = self.store.get_tally(&proposal.id)? {
            return Ok(tally);
        }
        // Closed without a stored result only if the store lost it; rebuild
        // it as of the close instant.
        let closed_at = proposal.closed_at.unwrap_or(proposal.window.ends_at);
        tracing::warn!(proposal = %proposal.id, "closed proposal has no stored tally; recomputing");
        let tally = self.fresh_tally(proposal, closed_at)?;
        self.store.put_tally(&tally)?;
        Ok(tally)
    }

    /// `holder`'s own and delegated power on proposal `id`.
    pub fn voting_power(
        &self,
        holder: &HolderId,
        id: &ProposalId,
        now: Timestamp,
    ) -> Result<VotingPower, GovernanceError> {
        let proposal = self.load(id)?;
        let snapshot = match self.store.get_snapshot(id)? {
            Some(snapshot) => snapshot,
            None if proposal.status == ProposalStatus::Draft => {
                SnapshotService::new(self.holdings.as_ref(), &self.params)
                    .read_pool(&proposal, now)?
            }
            None => return Err(GovernanceError::SnapshotMissing(*id)),
        };
        let ctx = DelegationContext::for_proposal(&proposal);
        let as_of = Self::tally_as_of(&proposal, now);
        let graph = self.graph();
        Ok(VotingPower {
            holder: holder.clone(),
            proposal: *id,
            own_power: snapshot.power_of(holder),
            delegated_in_power: graph.delegated_power(holder, &snapshot, &ctx, as_of)?,
            delegated_out_to: graph.next_hop(holder, &ctx, as_of)?,
            effective_controller: graph.resolve_effective_controller(holder, &ctx, as_of)?,
        })
    }

    pub fn proposal(&self, id: &ProposalId) -> Result<Proposal, GovernanceError> {
        self.load(id)
    }

    pub fn proposals_by_status(
        &self,
        status: ProposalStatus,
    ) -> Result<Vec<Proposal>, GovernanceError> {
        Ok(self.store.list_proposals_by_status(status)?)
    }

    /// Every ballot `voter` cast on `id`, superseded ones included.
    pub fn vote_history(
        &self,
        id: &ProposalId,
        voter: &HolderId,
    ) -> Result<Vec<Vote>, GovernanceError> {
        Ok(self.store.vote_history(id, voter)?)
    }

    pub fn current_votes(&self, id: &ProposalId) -> Result<Vec<Vote>, GovernanceError> {
        Ok(self.store.current_votes(id)?)
    }

    /// Every edge `delegator` ever created, revoked ones included.
    pub fn delegations_of(
        &self,
        delegator: &HolderId,
    ) -> Result<Vec<DelegationEdge>, GovernanceError> {
        Ok(self.store.edges_from(delegator)?)
    }

    // ── Sweep ────────────────────────────────────────────────────────────

    /// Close every active proposal whose window has ended, and with
    /// `auto_activate` activate every draft whose window has started.
    ///
    /// A failure on one proposal is logged and reported; the sweep goes on.
    pub fn sweep(
        &self,
        now: Timestamp,
        auto_activate: bool,
    ) -> Result<SweepReport, GovernanceError> {
        let mut report = SweepReport::default();

        if auto_activate {
            for draft in self.store.list_proposals_by_status(ProposalStatus::Draft)? {
                if draft.window.starts_at > now {
                    continue;
                }
                match self.activate(&draft.id, now) {
                    Ok(_) => report.activated.push(draft.id),
                    Err(GovernanceError::EmptyEligiblePool { .. }) => {
                        report.failed_empty.push(draft.id)
                    }
                    Err(e) => {
                        tracing::warn!(
                            proposal = %draft.id,
                            error = %e,
                            "sweep: activation failed"
                        );
                        report.errors.push((draft.id, e.kind().to_string()));
                    }
                }
            }
        }

        for active in self.store.list_proposals_by_status(ProposalStatus::Active)? {
            if !active.window.has_ended(now) {
                continue;
            }
            match self.close(&active.id, now) {
                Ok(_) => report.closed.push(active.id),
                Err(e) => {
                    tracing::warn!(proposal = %active.id, error = %e, "sweep: close failed");
                    report.errors.push((active.id, e.kind().to_string()));
                }
            }
        }

        let pruned = self.proposal_locks.prune() + self.ballot_locks.prune();
        if !report.is_empty() || pruned > 0 {
            tracing::debug!(
                activated = report.activated.len(),
                closed = report.closed.len(),
                failed_empty = report.failed_empty.len(),
                errors = report.errors.len(),
                pruned_locks = pruned,
                "sweep finished"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakegov_nullables::NullHoldings;
    use stakegov_store::SnapshotStore;
    use stakegov_store_mem::MemStore;
    use stakegov_types::{AssetId, Percent, ProposalType, Thresholds, VotingWindow};

    fn holder(name: &str) -> HolderId {
        HolderId::new(name)
    }

    fn engine() -> GovernanceEngine<MemStore, NullHoldings> {
        let holdings = NullHoldings::new();
        let asset = AssetId::new("tower-7");
        holdings.set(&asset, &holder("h1"), 600);
        holdings.set(&asset, &holder("h2"), 400);
        GovernanceEngine::new(
            Arc::new(MemStore::new()),
            Arc::new(holdings),
            GovernanceParams::test_defaults(),
        )
    }

    fn request(starts: u64, ends: u64) -> NewProposal {
        NewProposal {
            asset: AssetId::new("tower-7"),
            proposal_type: ProposalType::Operational,
            window: VotingWindow::new(Timestamp::new(starts), Timestamp::new(ends)),
            thresholds: Thresholds::with_quorum(Percent::new(20).unwrap()),
        }
    }

    #[test]
    fn inverted_window_is_rejected() {
        let engine = engine();
        let err = engine
            .create_proposal(&holder("c"), request(200, 100), Timestamp::new(1))
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_proposal");
    }

    #[test]
    fn unknown_proposal_is_not_found() {
        let engine = engine();
        let err = engine
            .activate(&ProposalId::new(42), Timestamp::new(1))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalNotFound(_)));
    }

    #[test]
    fn draft_voting_power_reads_live_holdings() {
        let engine = engine();
        let p = engine
            .create_proposal(&holder("c"), request(100, 200), Timestamp::new(1))
            .unwrap();
        let power = engine
            .voting_power(&holder("h1"), &p.id, Timestamp::new(2))
            .unwrap();
        assert_eq!(power.own_power, PowerUnits::new(600));
        assert_eq!(power.effective_controller, holder("h1"));
        assert!(engine.store().get_snapshot(&p.id).unwrap().is_none());
    }

    #[test]
    fn close_before_end_is_rejected() {
        let engine = engine();
        let p = engine
            .create_proposal(&holder("c"), request(100, 200), Timestamp::new(1))
            .unwrap();
        engine.activate(&p.id, Timestamp::new(100)).unwrap();
        let err = engine.close(&p.id, Timestamp::new(150)).unwrap_err();
        assert!(matches!(err, GovernanceError::VotingNotEnded { .. }));
    }

    #[test]
    fn sweep_activates_and_closes() {
        let engine = engine();
        let p = engine
            .create_proposal(&holder("c"), request(100, 200), Timestamp::new(1))
            .unwrap();

        let report = engine.sweep(Timestamp::new(50), true).unwrap();
        assert!(report.is_empty());

        let report = engine.sweep(Timestamp::new(100), true).unwrap();
        assert_eq!(report.activated, vec![p.id]);

        engine
            .cast_vote(&p.id, &holder("h1"), VoteChoice::For, Timestamp::new(150))
            .unwrap();
        let report = engine.sweep(Timestamp::new(200), true).unwrap();
        assert_eq!(report.closed, vec![p.id]);
        assert_eq!(engine.proposal(&p.id).unwrap().status, ProposalStatus::Passed);
    }

    #[test]
    fn sweep_without_auto_activate_leaves_drafts() {
        let engine = engine();
        let p = engine
            .create_proposal(&holder("c"), request(100, 200), Timestamp::new(1))
            .unwrap();
        let report = engine.sweep(Timestamp::new(150), false).unwrap();
        assert!(report.activated.is_empty());
        assert_eq!(engine.proposal(&p.id).unwrap().status, ProposalStatus::Draft);
    }
}
