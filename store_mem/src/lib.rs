//! Thread-safe in-memory implementation of every stakegov store trait.
//!
//! Each table sits behind its own `Mutex`, so operations on different tables
//! never contend and every trait method is atomic with respect to its table.
//! The whole state can be written to and read back from a bincode dump file,
//! which is how the daemon persists between runs.

pub mod dump;
mod tables;

pub use dump::{StoreDump, DUMP_FORMAT_VERSION};

use stakegov_store::{
    DelegationStore, ProposalStore, SnapshotStore, StoreError, TallyStore, VoteStore,
};
use stakegov_types::{
    DelegationEdge, DelegationScope, HolderId, PowerSnapshot, Proposal, ProposalId,
    ProposalStatus, TallyResult, Timestamp, Vote,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tables::{EdgeTable, ProposalTable, VoteTable};

/// In-memory store. Cheap to construct; share it behind an `Arc`.
pub struct MemStore {
    proposals: Mutex<ProposalTable>,
    snapshots: Mutex<HashMap<ProposalId, PowerSnapshot>>,
    edges: Mutex<EdgeTable>,
    votes: Mutex<BTreeMap<ProposalId, VoteTable>>,
    tallies: Mutex<HashMap<ProposalId, TallyResult>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            proposals: Mutex::new(ProposalTable::default()),
            snapshots: Mutex::new(HashMap::new()),
            edges: Mutex::new(EdgeTable::default()),
            votes: Mutex::new(BTreeMap::new()),
            tallies: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
}

impl ProposalStore for MemStore {
    fn next_proposal_id(&self) -> Result<ProposalId, StoreError> {
        let mut table = lock(&self.proposals)?;
        let id = table.next_id;
        table.next_id = id.next();
        Ok(id)
    }

    fn put_proposal(&self, proposal: &Proposal) -> Result<(), StoreError> {
        let mut table = lock(&self.proposals)?;
        if proposal.id >= table.next_id {
            table.next_id = proposal.id.next();
        }
        table.rows.insert(proposal.id, proposal.clone());
        Ok(())
    }

    fn get_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, StoreError> {
        Ok(lock(&self.proposals)?.rows.get(id).cloned())
    }

    fn list_proposals_by_status(
        &self,
        status: ProposalStatus,
    ) -> Result<Vec<Proposal>, StoreError> {
        Ok(lock(&self.proposals)?
            .rows
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect())
    }
}

impl SnapshotStore for MemStore {
    fn put_snapshot(&self, snapshot: &PowerSnapshot) -> Result<(), StoreError> {
        let mut snapshots = lock(&self.snapshots)?;
        if snapshots.contains_key(&snapshot.proposal) {
            return Err(StoreError::Duplicate(format!(
                "snapshot for {}",
                snapshot.proposal
            )));
        }
        snapshots.insert(snapshot.proposal, snapshot.clone());
        Ok(())
    }

    fn get_snapshot(&self, proposal: &ProposalId) -> Result<Option<PowerSnapshot>, StoreError> {
        Ok(lock(&self.snapshots)?.get(proposal).cloned())
    }
}

impl DelegationStore for MemStore {
    fn insert_edge(&self, edge: &DelegationEdge) -> Result<(), StoreError> {
        lock(&self.edges)?.insert(edge.clone())
    }

    fn revoke_edge(
        &self,
        delegator: &HolderId,
        scope: &DelegationScope,
        at: Timestamp,
    ) -> Result<Option<DelegationEdge>, StoreError> {
        Ok(lock(&self.edges)?.revoke(delegator, scope, at))
    }

    fn live_edge(
        &self,
        delegator: &HolderId,
        scope: &DelegationScope,
    ) -> Result<Option<DelegationEdge>, StoreError> {
        Ok(lock(&self.edges)?.live(delegator, scope).cloned())
    }

    fn edges_from(&self, delegator: &HolderId) -> Result<Vec<DelegationEdge>, StoreError> {
        Ok(lock(&self.edges)?.edges_from(delegator))
    }

    fn live_edges_to(&self, delegate: &HolderId) -> Result<Vec<DelegationEdge>, StoreError> {
        Ok(lock(&self.edges)?.live_to(delegate))
    }

    fn latest_change(&self) -> Result<Option<Timestamp>, StoreError> {
        Ok(lock(&self.edges)?.latest_change())
    }
}

impl VoteStore for MemStore {
    fn record_vote(&self, vote: &Vote) -> Result<Option<Vote>, StoreError> {
        let mut votes = lock(&self.votes)?;
        Ok(votes.entry(vote.proposal).or_default().record(vote.clone()))
    }

    fn current_vote(
        &self,
        proposal: &ProposalId,
        voter: &HolderId,
    ) -> Result<Option<Vote>, StoreError> {
        Ok(lock(&self.votes)?
            .get(proposal)
            .and_then(|t| t.current(voter))
            .cloned())
    }

    fn current_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, StoreError> {
        Ok(lock(&self.votes)?
            .get(proposal)
            .map(|t| t.all_current())
            .unwrap_or_default())
    }

    fn vote_history(
        &self,
        proposal: &ProposalId,
        voter: &HolderId,
    ) -> Result<Vec<Vote>, StoreError> {
        Ok(lock(&self.votes)?
            .get(proposal)
            .map(|t| t.history(voter))
            .unwrap_or_default())
    }

    fn count_ballots(&self, proposal: &ProposalId) -> Result<u64, StoreError> {
        Ok(lock(&self.votes)?
            .get(proposal)
            .map_or(0, |t| t.len() as u64))
    }
}

impl TallyStore for MemStore {
    fn put_tally(&self, tally: &TallyResult) -> Result<(), StoreError> {
        lock(&self.tallies)?.insert(tally.proposal, tally.clone());
        Ok(())
    }

    fn get_tally(&self, proposal: &ProposalId) -> Result<Option<TallyResult>, StoreError> {
        Ok(lock(&self.tallies)?.get(proposal).cloned())
    }
}
