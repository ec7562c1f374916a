//! Power snapshots: freeze every holder's units of an asset at activation.

use crate::error::GovernanceError;
use stakegov_holdings::{HoldingsAdapter, HoldingsError};
use stakegov_store::SnapshotStore;
use stakegov_types::{GovernanceParams, HolderId, PowerSnapshot, PowerUnits, Proposal, Timestamp};
use std::time::Duration;

/// Reads a complete holder set from the holdings adapter and records it as
/// a proposal's immutable snapshot.
pub struct SnapshotService<'a, H: HoldingsAdapter + ?Sized> {
    holdings: &'a H,
    params: &'a GovernanceParams,
}

impl<'a, H: HoldingsAdapter + ?Sized> SnapshotService<'a, H> {
    pub fn new(holdings: &'a H, params: &'a GovernanceParams) -> Self {
        Self { holdings, params }
    }

    /// Snapshot `proposal`'s asset as of its voting start and store it.
    ///
    /// Nothing is written unless the pool is complete and nonempty. An empty
    /// pool yields [`GovernanceError::EmptyEligiblePool`].
    pub fn take_snapshot<S: SnapshotStore + ?Sized>(
        &self,
        store: &S,
        proposal: &Proposal,
        now: Timestamp,
    ) -> Result<PowerSnapshot, GovernanceError> {
        let snapshot = self.read_pool(proposal, now)?;
        if snapshot.is_empty() {
            return Err(GovernanceError::EmptyEligiblePool {
                proposal: proposal.id,
                asset: proposal.asset.clone(),
            });
        }
        store.put_snapshot(&snapshot)?;
        tracing::info!(
            proposal = %proposal.id,
            asset = %proposal.asset,
            holders = snapshot.holder_count(),
            total = %snapshot.total_eligible_power(),
            "power snapshot taken"
        );
        Ok(snapshot)
    }

    /// Read the full holder set without storing it. Retries transient
    /// adapter failures with exponential backoff; a partial read is never
    /// returned.
    pub fn read_pool(
        &self,
        proposal: &Proposal,
        now: Timestamp,
    ) -> Result<PowerSnapshot, GovernanceError> {
        let as_of = proposal.window.starts_at;
        let max_attempts = self.params.adapter_max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.read_once(proposal, as_of) {
                Ok(entries) => {
                    return PowerSnapshot::new(proposal.id, now, as_of, entries)
                        .ok_or(GovernanceError::Overflow);
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(
                        proposal = %proposal.id,
                        adapter = self.holdings.name(),
                        attempt,
                        max_attempts,
                        error = %e,
                        "holdings read failed"
                    );
                    if attempt >= max_attempts {
                        return Err(GovernanceError::AdapterUnavailable {
                            attempts: attempt,
                            last: e,
                        });
                    }
                    let backoff = self.params.backoff_after_attempt_ms(attempt);
                    if backoff > 0 {
                        std::thread::sleep(Duration::from_millis(backoff));
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_once(
        &self,
        proposal: &Proposal,
        as_of: Timestamp,
    ) -> Result<Vec<(HolderId, PowerUnits)>, HoldingsError> {
        let holders = self.holdings.holders_of(&proposal.asset, as_of)?;
        let mut entries = Vec::with_capacity(holders.len());
        for holder in holders {
            let units = self.holdings.get_units(&holder, &proposal.asset, as_of)?;
            entries.push((holder, PowerUnits::from(units)));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakegov_nullables::NullHoldings;
    use stakegov_store_mem::MemStore;
    use stakegov_types::{
        AssetId, NewProposal, ProposalId, ProposalType, Thresholds, VotingWindow,
    };

    fn proposal() -> Proposal {
        Proposal::draft(
            ProposalId::new(1),
            HolderId::new("creator"),
            NewProposal {
                asset: AssetId::new("tower-7"),
                proposal_type: ProposalType::Operational,
                window: VotingWindow::new(Timestamp::new(100), Timestamp::new(200)),
                thresholds: Thresholds::with_quorum(stakegov_types::Percent::ZERO),
            },
            Timestamp::new(50),
        )
    }

    fn holdings() -> NullHoldings {
        let h = NullHoldings::new();
        h.set(&AssetId::new("tower-7"), &HolderId::new("h1"), 600);
        h.set(&AssetId::new("tower-7"), &HolderId::new("h2"), 400);
        h.set(&AssetId::new("tower-7"), &HolderId::new("h3"), 0);
        h
    }

    #[test]
    fn snapshot_is_stored_without_zero_holders() {
        let store = MemStore::new();
        let holdings = holdings();
        let params = GovernanceParams::test_defaults();
        let service = SnapshotService::new(&holdings, &params);

        let snap = service
            .take_snapshot(&store, &proposal(), Timestamp::new(100))
            .unwrap();
        assert_eq!(snap.holder_count(), 2);
        assert_eq!(snap.total_eligible_power(), PowerUnits::new(1_000));
        assert_eq!(store.get_snapshot(&ProposalId::new(1)).unwrap(), Some(snap));
    }

    #[test]
    fn transient_failures_are_retried() {
        let store = MemStore::new();
        let holdings = holdings();
        holdings.fail_next(2, HoldingsError::Unavailable("flaky".into()));
        let params = GovernanceParams::test_defaults();
        let service = SnapshotService::new(&holdings, &params);

        let snap = service
            .take_snapshot(&store, &proposal(), Timestamp::new(100))
            .unwrap();
        assert_eq!(snap.total_eligible_power(), PowerUnits::new(1_000));
    }

    #[test]
    fn exhausted_retries_write_nothing() {
        let store = MemStore::new();
        let holdings = holdings();
        holdings.fail_next(10, HoldingsError::Timeout(5));
        let params = GovernanceParams::test_defaults();
        let service = SnapshotService::new(&holdings, &params);

        let err = service
            .take_snapshot(&store, &proposal(), Timestamp::new(100))
            .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::AdapterUnavailable { attempts: 3, .. }
        ));
        assert!(store.get_snapshot(&ProposalId::new(1)).unwrap().is_none());
    }

    #[test]
    fn permanent_failure_is_not_retried() {
        let store = MemStore::new();
        let holdings = holdings();
        holdings.fail_next(1, HoldingsError::UnknownAsset("tower-7".into()));
        let params = GovernanceParams::test_defaults();
        let service = SnapshotService::new(&holdings, &params);

        let err = service
            .take_snapshot(&store, &proposal(), Timestamp::new(100))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::Holdings(_)));
        assert_eq!(holdings.calls(), 1);
    }

    #[test]
    fn empty_pool_is_rejected() {
        let store = MemStore::new();
        let holdings = NullHoldings::new();
        let params = GovernanceParams::test_defaults();
        let service = SnapshotService::new(&holdings, &params);

        let err = service
            .take_snapshot(&store, &proposal(), Timestamp::new(100))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::EmptyEligiblePool { .. }));
        assert!(store.get_snapshot(&ProposalId::new(1)).unwrap().is_none());
    }
}
