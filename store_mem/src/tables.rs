//! Table layouts behind `MemStore`'s mutexes.

use stakegov_store::StoreError;
use stakegov_types::{
    DelegationEdge, DelegationScope, HolderId, Proposal, ProposalId, Timestamp, Vote,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub(crate) struct ProposalTable {
    pub rows: BTreeMap<ProposalId, Proposal>,
    pub next_id: ProposalId,
}

impl Default for ProposalTable {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: ProposalId::new(1),
        }
    }
}

/// Append-only edge log with indexes over it.
#[derive(Default)]
pub(crate) struct EdgeTable {
    rows: Vec<DelegationEdge>,
    /// (delegator, scope) → row of the live edge.
    live: HashMap<(HolderId, DelegationScope), usize>,
    /// delegator → rows, creation order.
    by_delegator: HashMap<HolderId, Vec<usize>>,
    /// delegate → rows of live edges pointing at it.
    live_by_delegate: HashMap<HolderId, BTreeSet<usize>>,
}

impl EdgeTable {
    /// Rebuild the indexes from a row log.
    pub fn from_rows(rows: Vec<DelegationEdge>) -> Result<Self, StoreError> {
        let mut table = Self::default();
        for edge in rows {
            let revoked_at = edge.revoked_at;
            let key = (edge.delegator.clone(), edge.scope.clone());
            let row = table.push(edge);
            if revoked_at.is_none() {
                if table.live.insert(key, row).is_some() {
                    return Err(StoreError::Corruption(
                        "two live edges for one delegator and scope".to_string(),
                    ));
                }
                let delegate = table.rows[row].delegate.clone();
                table.live_by_delegate.entry(delegate).or_default().insert(row);
            }
        }
        Ok(table)
    }

    pub fn rows(&self) -> &[DelegationEdge] {
        &self.rows
    }

    fn push(&mut self, edge: DelegationEdge) -> usize {
        let row = self.rows.len();
        self.by_delegator
            .entry(edge.delegator.clone())
            .or_default()
            .push(row);
        self.rows.push(edge);
        row
    }

    pub fn insert(&mut self, edge: DelegationEdge) -> Result<(), StoreError> {
        let key = (edge.delegator.clone(), edge.scope.clone());
        if self.live.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "live delegation from {} in scope {}",
                edge.delegator, edge.scope
            )));
        }
        let delegate = edge.delegate.clone();
        let row = self.push(edge);
        self.live.insert(key, row);
        self.live_by_delegate.entry(delegate).or_default().insert(row);
        Ok(())
    }

    pub fn revoke(
        &mut self,
        delegator: &HolderId,
        scope: &DelegationScope,
        at: Timestamp,
    ) -> Option<DelegationEdge> {
        let row = self.live.remove(&(delegator.clone(), scope.clone()))?;
        let edge = &mut self.rows[row];
        edge.revoked_at = Some(at);
        if let Some(set) = self.live_by_delegate.get_mut(&edge.delegate) {
            set.remove(&row);
            if set.is_empty() {
                self.live_by_delegate.remove(&edge.delegate);
            }
        }
        Some(edge.clone())
    }

    pub fn live(&self, delegator: &HolderId, scope: &DelegationScope) -> Option<&DelegationEdge> {
        self.live
            .get(&(delegator.clone(), scope.clone()))
            .map(|row| &self.rows[*row])
    }

    pub fn edges_from(&self, delegator: &HolderId) -> Vec<DelegationEdge> {
        self.by_delegator
            .get(delegator)
            .map(|rows| rows.iter().map(|r| self.rows[*r].clone()).collect())
            .unwrap_or_default()
    }

    pub fn live_to(&self, delegate: &HolderId) -> Vec<DelegationEdge> {
        self.live_by_delegate
            .get(delegate)
            .map(|rows| rows.iter().map(|r| self.rows[*r].clone()).collect())
            .unwrap_or_default()
    }

    pub fn latest_change(&self) -> Option<Timestamp> {
        self.rows
            .iter()
            .map(|e| e.revoked_at.map_or(e.created_at, |r| r.max(e.created_at)))
            .max()
    }
}

/// Ballots on one proposal.
#[derive(Default)]
pub(crate) struct VoteTable {
    rows: Vec<Vote>,
    /// voter → row of the current ballot.
    current: BTreeMap<HolderId, usize>,
}

impl VoteTable {
    pub fn rows(&self) -> &[Vote] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Supersede the voter's current ballot and append `vote`.
    pub fn record(&mut self, vote: Vote) -> Option<Vote> {
        let superseded = self.current.get(&vote.voter).map(|row| {
            let old = &mut self.rows[*row];
            old.superseded_at = Some(vote.cast_at);
            old.clone()
        });
        let row = self.rows.len();
        self.current.insert(vote.voter.clone(), row);
        self.rows.push(vote);
        superseded
    }

    /// Restore a row as-is from a dump.
    pub fn restore(&mut self, vote: Vote) -> Result<(), StoreError> {
        let row = self.rows.len();
        if vote.is_current() && self.current.insert(vote.voter.clone(), row).is_some() {
            return Err(StoreError::Corruption(format!(
                "two current ballots by {} on {}",
                vote.voter, vote.proposal
            )));
        }
        self.rows.push(vote);
        Ok(())
    }

    pub fn current(&self, voter: &HolderId) -> Option<&Vote> {
        self.current.get(voter).map(|row| &self.rows[*row])
    }

    pub fn all_current(&self) -> Vec<Vote> {
        self.current.values().map(|r| self.rows[*r].clone()).collect()
    }

    pub fn history(&self, voter: &HolderId) -> Vec<Vote> {
        self.rows
            .iter()
            .filter(|v| &v.voter == voter)
            .cloned()
            .collect()
    }
}
