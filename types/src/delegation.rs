//! Delegation edges and their scopes.

use crate::error::TypesError;
use crate::ids::{AssetId, HolderId};
use crate::proposal::{Proposal, ProposalType};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scope for a delegation: determines which proposals it applies to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationScope {
    /// Applies to all proposals.
    Global,
    /// Applies to proposals of one type, on any asset.
    ProposalType(ProposalType),
    /// Applies to proposals on one asset, of any type.
    Asset(AssetId),
}

impl fmt::Display for DelegationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::ProposalType(t) => write!(f, "type:{t}"),
            Self::Asset(a) => write!(f, "asset:{a}"),
        }
    }
}

impl FromStr for DelegationScope {
    type Err = TypesError;

    /// Parses `global`, `type:<proposal type>` or `asset:<asset id>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            return Ok(Self::Global);
        }
        match s.split_once(':') {
            Some(("type", t)) => t
                .parse()
                .map(Self::ProposalType)
                .map_err(|_| TypesError::InvalidScope(s.to_string())),
            Some(("asset", a)) => a
                .parse()
                .map(Self::Asset)
                .map_err(|_| TypesError::InvalidScope(s.to_string())),
            _ => Err(TypesError::InvalidScope(s.to_string())),
        }
    }
}

/// The situation a delegation chain is resolved in.
///
/// When a holder has live edges in several scopes, the most specific one that
/// applies to the context wins: asset, then proposal type, then global.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelegationContext {
    pub asset: Option<AssetId>,
    pub proposal_type: Option<ProposalType>,
}

impl DelegationContext {
    /// Context in which only global edges apply.
    pub fn global() -> Self {
        Self::default()
    }

    pub fn for_proposal(proposal: &Proposal) -> Self {
        Self {
            asset: Some(proposal.asset.clone()),
            proposal_type: Some(proposal.proposal_type),
        }
    }

    /// Scopes whose edges apply in this context, most specific first.
    pub fn applicable_scopes(&self) -> Vec<DelegationScope> {
        let mut scopes = Vec::with_capacity(3);
        if let Some(asset) = &self.asset {
            scopes.push(DelegationScope::Asset(asset.clone()));
        }
        if let Some(t) = self.proposal_type {
            scopes.push(DelegationScope::ProposalType(t));
        }
        scopes.push(DelegationScope::Global);
        scopes
    }
}

impl From<&DelegationScope> for DelegationContext {
    fn from(scope: &DelegationScope) -> Self {
        match scope {
            DelegationScope::Global => Self::global(),
            DelegationScope::ProposalType(t) => Self {
                asset: None,
                proposal_type: Some(*t),
            },
            DelegationScope::Asset(a) => Self {
                asset: Some(a.clone()),
                proposal_type: None,
            },
        }
    }
}

/// One directed delegation from `delegator` to `delegate`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationEdge {
    pub delegator: HolderId,
    pub delegate: HolderId,
    pub scope: DelegationScope,
    pub created_at: Timestamp,
    /// `None` while the edge is live.
    pub revoked_at: Option<Timestamp>,
}

impl DelegationEdge {
    pub fn new(
        delegator: HolderId,
        delegate: HolderId,
        scope: DelegationScope,
        created_at: Timestamp,
    ) -> Self {
        Self {
            delegator,
            delegate,
            scope,
            created_at,
            revoked_at: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.revoked_at.is_none()
    }

    /// Whether the edge was in force at `at`: created at or before it, and
    /// not yet revoked.
    pub fn was_live_at(&self, at: Timestamp) -> bool {
        self.created_at <= at && self.revoked_at.map_or(true, |r| r > at)
    }
}
