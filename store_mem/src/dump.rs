//! Whole-store dump and restore.
//!
//! The dump is a bincode-encoded [`StoreDump`]. It is written to a sibling
//! temporary file and renamed into place, so a crash mid-write leaves the
//! previous dump intact.

use crate::tables::{EdgeTable, ProposalTable, VoteTable};
use crate::{lock, MemStore};
use serde::{Deserialize, Serialize};
use stakegov_store::StoreError;
use stakegov_types::{DelegationEdge, PowerSnapshot, Proposal, ProposalId, TallyResult, Vote};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Mutex;

/// Bumped whenever the layout of [`StoreDump`] changes.
pub const DUMP_FORMAT_VERSION: u32 = 1;

/// Serializable image of every table in a [`MemStore`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreDump {
    pub version: u32,
    pub next_proposal_id: ProposalId,
    pub proposals: Vec<Proposal>,
    pub snapshots: Vec<PowerSnapshot>,
    pub edges: Vec<DelegationEdge>,
    pub votes: Vec<Vote>,
    pub tallies: Vec<TallyResult>,
}

impl MemStore {
    /// Copy every table into a dump.
    pub fn dump(&self) -> Result<StoreDump, StoreError> {
        let proposals = lock(&self.proposals)?;
        let mut snapshots: Vec<PowerSnapshot> = lock(&self.snapshots)?.values().cloned().collect();
        snapshots.sort_by_key(|s| s.proposal);
        let mut tallies: Vec<TallyResult> = lock(&self.tallies)?.values().cloned().collect();
        tallies.sort_by_key(|t| t.proposal);
        let votes = lock(&self.votes)?
            .values()
            .flat_map(|t| t.rows().iter().cloned())
            .collect();
        Ok(StoreDump {
            version: DUMP_FORMAT_VERSION,
            next_proposal_id: proposals.next_id,
            proposals: proposals.rows.values().cloned().collect(),
            snapshots,
            edges: lock(&self.edges)?.rows().to_vec(),
            votes,
            tallies,
        })
    }

    /// Rebuild a store from a dump, re-deriving every index.
    pub fn restore(dump: StoreDump) -> Result<Self, StoreError> {
        if dump.version != DUMP_FORMAT_VERSION {
            return Err(StoreError::Corruption(format!(
                "unsupported dump version {} (expected {})",
                dump.version, DUMP_FORMAT_VERSION
            )));
        }
        let mut proposals = ProposalTable {
            rows: BTreeMap::new(),
            next_id: dump.next_proposal_id,
        };
        for p in dump.proposals {
            if p.id >= proposals.next_id {
                proposals.next_id = p.id.next();
            }
            proposals.rows.insert(p.id, p);
        }

        let mut votes: BTreeMap<ProposalId, VoteTable> = BTreeMap::new();
        for v in dump.votes {
            votes.entry(v.proposal).or_default().restore(v)?;
        }

        Ok(Self {
            proposals: Mutex::new(proposals),
            snapshots: Mutex::new(
                dump.snapshots
                    .into_iter()
                    .map(|s| (s.proposal, s))
                    .collect::<HashMap<_, _>>(),
            ),
            edges: Mutex::new(EdgeTable::from_rows(dump.edges)?),
            votes: Mutex::new(votes),
            tallies: Mutex::new(
                dump.tallies
                    .into_iter()
                    .map(|t| (t.proposal, t))
                    .collect::<HashMap<_, _>>(),
            ),
        })
    }

    /// Serialize the store to `path`.
    pub fn dump_to_file(&self, path: &Path) -> Result<(), StoreError> {
        let dump = self.dump()?;
        let bytes =
            bincode::serialize(&dump).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, &bytes).map_err(|e| StoreError::Backend(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::debug!(
            path = %path.display(),
            bytes = bytes.len(),
            proposals = dump.proposals.len(),
            "store dumped"
        );
        Ok(())
    }

    /// Load a store from `path`. A missing file yields an empty store.
    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no store dump found, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(StoreError::Backend(e.to_string())),
        };
        let dump: StoreDump =
            bincode::deserialize(&bytes).map_err(|e| StoreError::Corruption(e.to_string()))?;
        Self::restore(dump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakegov_store::{DelegationStore, ProposalStore, SnapshotStore, VoteStore};
    use stakegov_types::{
        AssetId, DelegationScope, HolderId, NewProposal, Percent, PowerUnits, ProposalType,
        Thresholds, Timestamp, VoteChoice, VotingWindow,
    };

    fn populated() -> MemStore {
        let store = MemStore::new();
        let id = store.next_proposal_id().unwrap();
        let proposal = Proposal::draft(
            id,
            HolderId::new("creator"),
            NewProposal {
                asset: AssetId::new("tower-7"),
                proposal_type: ProposalType::Exit,
                window: VotingWindow::new(Timestamp::new(10), Timestamp::new(20)),
                thresholds: Thresholds::with_quorum(Percent::new(20).unwrap()),
            },
            Timestamp::new(1),
        );
        store.put_proposal(&proposal).unwrap();
        store
            .put_snapshot(
                &PowerSnapshot::new(
                    id,
                    Timestamp::new(10),
                    Timestamp::new(10),
                    vec![(HolderId::new("a"), PowerUnits::new(7))],
                )
                .unwrap(),
            )
            .unwrap();
        store
            .insert_edge(&DelegationEdge::new(
                HolderId::new("a"),
                HolderId::new("b"),
                DelegationScope::Global,
                Timestamp::new(2),
            ))
            .unwrap();
        for (choice, at) in [(VoteChoice::For, 11), (VoteChoice::Against, 12)] {
            store
                .record_vote(&Vote::new(id, HolderId::new("a"), choice, Timestamp::new(at)))
                .unwrap();
        }
        store
    }

    #[test]
    fn file_round_trip_preserves_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.bin");
        populated().dump_to_file(&path).unwrap();

        let restored = MemStore::load_from_file(&path).unwrap();
        let id = ProposalId::new(1);
        assert!(restored.get_proposal(&id).unwrap().is_some());
        assert_eq!(restored.next_proposal_id().unwrap(), ProposalId::new(2));
        assert!(restored
            .live_edge(&HolderId::new("a"), &DelegationScope::Global)
            .unwrap()
            .is_some());
        let current = restored.current_vote(&id, &HolderId::new("a")).unwrap().unwrap();
        assert_eq!(current.choice, VoteChoice::Against);
        assert_eq!(restored.count_ballots(&id).unwrap(), 2);
        assert!(restored.get_snapshot(&id).unwrap().is_some());
    }

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemStore::load_from_file(&dir.path().join("absent.bin")).unwrap();
        assert!(store
            .list_proposals_by_status(stakegov_types::ProposalStatus::Draft)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn garbage_file_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.bin");
        std::fs::write(&path, b"not a dump").unwrap();
        assert!(matches!(
            MemStore::load_from_file(&path),
            Err(StoreError::Corruption(_))
        ));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut dump = populated().dump().unwrap();
        dump.version = 99;
        assert!(matches!(MemStore::restore(dump), Err(StoreError::Corruption(_))));
    }
}
