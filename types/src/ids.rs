//! Identifiers for holders, assets, and proposals.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An identity that owns units of an asset and can vote or delegate.
///
/// Holder ids are opaque to the governance core; the identity layer that
/// issues them is external. The only requirement is a non-empty string with
/// no surrounding whitespace.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HolderId(String);

impl HolderId {
    /// Create a holder id from a raw string.
    ///
    /// # Panics
    /// Panics if the string is empty or padded with whitespace. Use
    /// [`str::parse`] for untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(is_well_formed(&s), "holder id must be non-empty and trimmed");
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HolderId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_well_formed(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(TypesError::InvalidHolderId(s.to_string()))
        }
    }
}

/// The shared asset (property, loan) a proposal is scoped to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// # Panics
    /// Panics if the string is empty or padded with whitespace.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(is_well_formed(&s), "asset id must be non-empty and trimmed");
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssetId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_well_formed(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(TypesError::InvalidAssetId(s.to_string()))
        }
    }
}

/// Sequential proposal identifier, allocated by the proposal store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProposalId(u64);

impl ProposalId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

impl FromStr for ProposalId {
    type Err = TypesError;

    /// Accepts both the bare number and the `P-` display form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("P-").unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypesError::InvalidProposalId(s.to_string()))
    }
}

fn is_well_formed(s: &str) -> bool {
    !s.is_empty() && s.trim() == s
}
