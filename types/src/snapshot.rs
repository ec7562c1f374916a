//! Frozen voting power captured at proposal activation.

use crate::ids::{HolderId, ProposalId};
use crate::power::PowerUnits;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable map of holder → power for one proposal.
///
/// Written once when the proposal becomes active. Later changes in holdings
/// never reach it. Entries are kept in a `BTreeMap` so iteration order, and
/// with it every derived tally, is deterministic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSnapshot {
    pub proposal: ProposalId,
    pub taken_at: Timestamp,
    /// The instant holdings were queried as of (the window start).
    pub holdings_as_of: Timestamp,
    powers: BTreeMap<HolderId, PowerUnits>,
    total_eligible_power: PowerUnits,
}

impl PowerSnapshot {
    /// Build a snapshot, dropping zero entries.
    ///
    /// Returns `None` if the total overflows.
    pub fn new(
        proposal: ProposalId,
        taken_at: Timestamp,
        holdings_as_of: Timestamp,
        powers: impl IntoIterator<Item = (HolderId, PowerUnits)>,
    ) -> Option<Self> {
        let powers: BTreeMap<HolderId, PowerUnits> =
            powers.into_iter().filter(|(_, p)| !p.is_zero()).collect();
        let total_eligible_power = PowerUnits::checked_sum(powers.values().copied())?;
        Some(Self {
            proposal,
            taken_at,
            holdings_as_of,
            powers,
            total_eligible_power,
        })
    }

    /// Power held by `holder`, zero if absent.
    pub fn power_of(&self, holder: &HolderId) -> PowerUnits {
        self.powers.get(holder).copied().unwrap_or(PowerUnits::ZERO)
    }

    pub fn total_eligible_power(&self) -> PowerUnits {
        self.total_eligible_power
    }

    pub fn holder_count(&self) -> usize {
        self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_eligible_power.is_zero()
    }

    /// Entries in holder order.
    pub fn iter(&self) -> impl Iterator<Item = (&HolderId, PowerUnits)> {
        self.powers.iter().map(|(h, p)| (h, *p))
    }
}
