//! Liquid delegation: holders entrust their voting power to a representative.
//!
//! Supports:
//! - **Transitive delegation** (A→B→C means A's power is voted by C)
//! - **Scoped delegation** (per asset, per proposal type, and global)
//! - **Write-time cycle rejection**, so resolution never meets a cycle
//! - **Point-in-time resolution** against the append-only edge log
//!
//! At each hop the most specific applicable live edge wins:
//! asset scope, then proposal-type scope, then global.

use crate::error::GovernanceError;
use stakegov_store::DelegationStore;
use stakegov_types::{
    AssetId, DelegationContext, DelegationEdge, DelegationScope, HolderId, PowerSnapshot,
    PowerUnits, ProposalType, Timestamp,
};
use std::collections::HashMap;

/// Delegation graph over a [`DelegationStore`].
///
/// Writes must be serialized by the caller (the engine holds one delegation
/// write lock), because the cycle check and the insert are two store calls.
pub struct DelegationGraph<'a, S: DelegationStore + ?Sized> {
    store: &'a S,
    max_depth: usize,
}

impl<'a, S: DelegationStore + ?Sized> DelegationGraph<'a, S> {
    pub fn new(store: &'a S, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Create a live edge `delegator → delegate` in `scope`.
    ///
    /// `now` may not precede any earlier change in the edge log: the cycle
    /// check sees only the current graph, so a back-dated edge could close a
    /// loop at a past instant.
    pub fn create_edge(
        &self,
        delegator: &HolderId,
        delegate: &HolderId,
        scope: DelegationScope,
        now: Timestamp,
    ) -> Result<DelegationEdge, GovernanceError> {
        if delegator == delegate {
            return Err(GovernanceError::SelfDelegation);
        }
        self.check_write_order(now)?;
        if self.store.live_edge(delegator, &scope)?.is_some() {
            return Err(GovernanceError::DuplicateEdge {
                delegator: delegator.clone(),
                scope,
            });
        }

        let start = PathConstraint::from(&scope);
        let downstream = self.longest_path(delegate, &start, Direction::Out, Some(delegator))?;
        let Some(downstream) = downstream else {
            return Err(GovernanceError::CyclicDelegation {
                delegator: delegator.clone(),
                delegate: delegate.clone(),
                scope,
            });
        };
        let upstream = self
            .longest_path(delegator, &start, Direction::In, None)?
            .unwrap_or(0);
        if upstream + 1 + downstream > self.max_depth {
            return Err(GovernanceError::ChainTooLong {
                delegator: delegator.clone(),
                delegate: delegate.clone(),
                max: self.max_depth,
            });
        }

        let edge = DelegationEdge::new(delegator.clone(), delegate.clone(), scope, now);
        self.store.insert_edge(&edge).map_err(|e| match e {
            stakegov_store::StoreError::Duplicate(_) => GovernanceError::DuplicateEdge {
                delegator: edge.delegator.clone(),
                scope: edge.scope.clone(),
            },
            other => other.into(),
        })?;
        Ok(edge)
    }

    /// Revoke the live edge of `delegator` in `scope`. Revoking a missing
    /// edge is a no-op and returns `None`.
    pub fn revoke_edge(
        &self,
        delegator: &HolderId,
        scope: &DelegationScope,
        now: Timestamp,
    ) -> Result<Option<DelegationEdge>, GovernanceError> {
        self.check_write_order(now)?;
        Ok(self.store.revoke_edge(delegator, scope, now)?)
    }

    fn check_write_order(&self, now: Timestamp) -> Result<(), GovernanceError> {
        match self.store.latest_change()? {
            Some(latest) if now < latest => {
                Err(GovernanceError::NonMonotonicTimestamp { at: now, latest })
            }
            _ => Ok(()),
        }
    }

    /// The delegate `holder` hands its power to in `ctx` at `as_of`, if any.
    pub fn next_hop(
        &self,
        holder: &HolderId,
        ctx: &DelegationContext,
        as_of: Timestamp,
    ) -> Result<Option<HolderId>, GovernanceError> {
        let edges = self.store.edges_from(holder)?;
        for scope in ctx.applicable_scopes() {
            // Latest first: a revoke and a re-create in the same second leave
            // the new edge as the one live at that instant.
            if let Some(edge) = edges
                .iter()
                .rev()
                .find(|e| e.scope == scope && e.was_live_at(as_of))
            {
                return Ok(Some(edge.delegate.clone()));
            }
        }
        Ok(None)
    }

    /// Follow the chain from `holder` to the holder that finally exercises
    /// its power. A holder with no applicable edge controls itself.
    pub fn resolve_effective_controller(
        &self,
        holder: &HolderId,
        ctx: &DelegationContext,
        as_of: Timestamp,
    ) -> Result<HolderId, GovernanceError> {
        self.resolver(ctx, as_of).resolve(holder)
    }

    /// A memoizing resolver for many lookups in one context and instant.
    pub fn resolver<'g>(
        &'g self,
        ctx: &'g DelegationContext,
        as_of: Timestamp,
    ) -> Resolver<'g, 'a, S> {
        Resolver {
            graph: self,
            ctx,
            as_of,
            cache: HashMap::new(),
        }
    }

    /// Power delegated into `holder` from snapshot entries whose chain ends
    /// at it. Excludes `holder`'s own power.
    pub fn delegated_power(
        &self,
        holder: &HolderId,
        snapshot: &PowerSnapshot,
        ctx: &DelegationContext,
        as_of: Timestamp,
    ) -> Result<PowerUnits, GovernanceError> {
        let mut resolver = self.resolver(ctx, as_of);
        let mut total = PowerUnits::ZERO;
        for (h, power) in snapshot.iter() {
            if h == holder {
                continue;
            }
            if &resolver.resolve(h)? == holder {
                total = total.checked_add(power).ok_or(GovernanceError::Overflow)?;
            }
        }
        Ok(total)
    }

    /// Whether any other snapshot entry resolves to `holder`. Stops at the
    /// first hit.
    pub fn controls_delegated_power(
        &self,
        holder: &HolderId,
        snapshot: &PowerSnapshot,
        ctx: &DelegationContext,
        as_of: Timestamp,
    ) -> Result<bool, GovernanceError> {
        let mut resolver = self.resolver(ctx, as_of);
        for (h, _) in snapshot.iter() {
            if h != holder && &resolver.resolve(h)? == holder {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Longest chain length (in hops) from `from` along live edges that can
    /// co-apply with `constraint`. Returns `None` if `target` is reachable.
    fn longest_path(
        &self,
        from: &HolderId,
        constraint: &PathConstraint,
        direction: Direction,
        target: Option<&HolderId>,
    ) -> Result<Option<usize>, GovernanceError> {
        // (node, constraint) → deepest depth explored from there so far.
        let mut seen: HashMap<(HolderId, PathConstraint), usize> = HashMap::new();
        let mut stack = vec![(from.clone(), constraint.clone(), 0usize)];
        let mut longest = 0usize;

        while let Some((node, constraint, depth)) = stack.pop() {
            if target == Some(&node) {
                return Ok(None);
            }
            longest = longest.max(depth);
            if depth > self.max_depth {
                // Already too long to accept; no need to look further.
                continue;
            }
            match seen.get(&(node.clone(), constraint.clone())) {
                Some(d) if *d >= depth => continue,
                _ => {
                    seen.insert((node.clone(), constraint.clone()), depth);
                }
            }
            let edges = match direction {
                Direction::Out => self
                    .store
                    .edges_from(&node)?
                    .into_iter()
                    .filter(DelegationEdge::is_live)
                    .collect(),
                Direction::In => self.store.live_edges_to(&node)?,
            };
            for edge in edges {
                if let Some(narrowed) = constraint.narrow(&edge.scope) {
                    let next = match direction {
                        Direction::Out => edge.delegate,
                        Direction::In => edge.delegator,
                    };
                    stack.push((next, narrowed, depth + 1));
                }
            }
        }
        Ok(Some(longest))
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Out,
    In,
}

/// The set of resolution contexts a path of edges can all apply in.
///
/// `None` leaves a dimension open. Two edges co-apply when some proposal
/// context selects both, so an asset edge for X and one for Y never do.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PathConstraint {
    asset: Option<AssetId>,
    proposal_type: Option<ProposalType>,
}

impl PathConstraint {
    fn narrow(&self, scope: &DelegationScope) -> Option<Self> {
        match scope {
            DelegationScope::Global => Some(self.clone()),
            DelegationScope::ProposalType(t) => match self.proposal_type {
                Some(current) if current != *t => None,
                _ => Some(Self {
                    asset: self.asset.clone(),
                    proposal_type: Some(*t),
                }),
            },
            DelegationScope::Asset(a) => match &self.asset {
                Some(current) if current != a => None,
                _ => Some(Self {
                    asset: Some(a.clone()),
                    proposal_type: self.proposal_type,
                }),
            },
        }
    }
}

impl From<&DelegationScope> for PathConstraint {
    fn from(scope: &DelegationScope) -> Self {
        let ctx = DelegationContext::from(scope);
        Self {
            asset: ctx.asset,
            proposal_type: ctx.proposal_type,
        }
    }
}

/// Resolves many holders in one context, caching every node visited.
///
/// Every node on a chain shares the chain's terminal controller, so one walk
/// answers for all of them.
pub struct Resolver<'g, 'a, S: DelegationStore + ?Sized> {
    graph: &'g DelegationGraph<'a, S>,
    ctx: &'g DelegationContext,
    as_of: Timestamp,
    cache: HashMap<HolderId, HolderId>,
}

impl<S: DelegationStore + ?Sized> Resolver<'_, '_, S> {
    pub fn resolve(&mut self, holder: &HolderId) -> Result<HolderId, GovernanceError> {
        if let Some(hit) = self.cache.get(holder) {
            return Ok(hit.clone());
        }
        let mut path = vec![holder.clone()];
        let mut current = holder.clone();
        let terminal = loop {
            if let Some(hit) = self.cache.get(&current) {
                break hit.clone();
            }
            match self.graph.next_hop(&current, self.ctx, self.as_of)? {
                None => break current,
                Some(next) => {
                    if path.len() > self.graph.max_depth {
                        tracing::error!(
                            holder = %holder,
                            max = self.graph.max_depth,
                            "delegation chain exceeds hop bound"
                        );
                        return Err(GovernanceError::DelegationDepthExceeded {
                            holder: holder.clone(),
                            max: self.graph.max_depth,
                        });
                    }
                    path.push(next.clone());
                    current = next;
                }
            }
        };
        for node in path {
            self.cache.insert(node, terminal.clone());
        }
        Ok(terminal)
    }
}
