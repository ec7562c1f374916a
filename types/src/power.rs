//! Voting power and percentage types.
//!
//! Power is represented as integer ownership units (u128) so that summation
//! never drifts. One unit of ownership is one unit of voting power. Ratio
//! checks against a percentage are done by cross-multiplication, never by
//! division, so boundaries like "exactly 20%" are decided exactly.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Voting power, in raw ownership units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PowerUnits(u128);

impl PowerUnits {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked sum of an iterator of power values.
    pub fn checked_sum(iter: impl IntoIterator<Item = Self>) -> Option<Self> {
        iter.into_iter()
            .try_fold(Self::ZERO, |acc, p| acc.checked_add(p))
    }

    /// `self / whole >= pct / 100`, decided exactly.
    ///
    /// Returns `None` if the cross-multiplication overflows.
    pub fn ratio_at_least(self, whole: Self, pct: Percent) -> Option<bool> {
        let lhs = self.0.checked_mul(100)?;
        let rhs = whole.0.checked_mul(u128::from(pct.get()))?;
        Some(lhs >= rhs)
    }

    /// `self / whole > pct / 100`, decided exactly.
    ///
    /// Returns `None` if the cross-multiplication overflows.
    pub fn ratio_exceeds(self, whole: Self, pct: Percent) -> Option<bool> {
        let lhs = self.0.checked_mul(100)?;
        let rhs = whole.0.checked_mul(u128::from(pct.get()))?;
        Some(lhs > rhs)
    }
}

impl From<u64> for PowerUnits {
    fn from(units: u64) -> Self {
        Self(u128::from(units))
    }
}

impl fmt::Display for PowerUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A whole-number percentage in `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Self = Self(0);
    pub const HALF: Self = Self(50);
    pub const FULL: Self = Self(100);

    pub fn new(value: u8) -> Result<Self, TypesError> {
        if value <= 100 {
            Ok(Self(value))
        } else {
            Err(TypesError::PercentOutOfRange(u32::from(value)))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Percent {
    type Error = TypesError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percent> for u8 {
    fn from(p: Percent) -> u8 {
        p.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
