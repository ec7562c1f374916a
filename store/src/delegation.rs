//! Delegation edge storage trait.

use crate::StoreError;
use stakegov_types::{DelegationEdge, DelegationScope, HolderId, Timestamp};

pub trait DelegationStore {
    /// Insert a new live edge.
    ///
    /// Fails with [`StoreError::Duplicate`] if the delegator already has a
    /// live edge in the same scope.
    fn insert_edge(&self, edge: &DelegationEdge) -> Result<(), StoreError>;

    /// Stamp `revoked_at` on the live edge for `(delegator, scope)`.
    ///
    /// Returns the revoked edge, or `None` if there was no live edge.
    fn revoke_edge(
        &self,
        delegator: &HolderId,
        scope: &DelegationScope,
        at: Timestamp,
    ) -> Result<Option<DelegationEdge>, StoreError>;

    /// The live edge for `(delegator, scope)`.
    fn live_edge(
        &self,
        delegator: &HolderId,
        scope: &DelegationScope,
    ) -> Result<Option<DelegationEdge>, StoreError>;

    /// Every edge the delegator ever created, revoked ones included, in
    /// creation order.
    fn edges_from(&self, delegator: &HolderId) -> Result<Vec<DelegationEdge>, StoreError>;

    /// Live edges pointing at `delegate`, across all scopes.
    fn live_edges_to(&self, delegate: &HolderId) -> Result<Vec<DelegationEdge>, StoreError>;

    /// Latest `created_at` or `revoked_at` anywhere in the edge log.
    fn latest_change(&self) -> Result<Option<Timestamp>, StoreError>;
}
