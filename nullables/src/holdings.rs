//! Nullable holdings adapter: scripted balances and injected failures.

use stakegov_holdings::{HoldingsAdapter, HoldingsError};
use stakegov_types::{AssetId, HolderId, Timestamp};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// An in-memory holdings adapter for tests.
///
/// Balances ignore `as_of`. Failures can be queued with [`fail_next`]; each
/// queued failure is returned by exactly one subsequent call, of either
/// method.
///
/// [`fail_next`]: NullHoldings::fail_next
#[derive(Default)]
pub struct NullHoldings {
    balances: Mutex<BTreeMap<AssetId, BTreeMap<HolderId, u64>>>,
    failures: Mutex<Vec<HoldingsError>>,
    calls: AtomicUsize,
}

impl NullHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `holder`'s units of `asset`. Zero keeps the holder listed.
    pub fn set(&self, asset: &AssetId, holder: &HolderId, units: u64) {
        self.balances
            .lock()
            .expect("NullHoldings lock")
            .entry(asset.clone())
            .or_default()
            .insert(holder.clone(), units);
    }

    /// Make the next `count` calls fail with `error`.
    pub fn fail_next(&self, count: usize, error: HoldingsError) {
        let mut failures = self.failures.lock().expect("NullHoldings lock");
        failures.extend(std::iter::repeat(error).take(count));
    }

    /// Number of adapter calls made so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_call(&self) -> Result<(), HoldingsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut failures = self.failures.lock().expect("NullHoldings lock");
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.remove(0))
        }
    }
}

impl HoldingsAdapter for NullHoldings {
    fn holders_of(
        &self,
        asset: &AssetId,
        _as_of: Timestamp,
    ) -> Result<Vec<HolderId>, HoldingsError> {
        self.next_call()?;
        Ok(self
            .balances
            .lock()
            .expect("NullHoldings lock")
            .get(asset)
            .map(|holders| holders.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn get_units(
        &self,
        holder: &HolderId,
        asset: &AssetId,
        _as_of: Timestamp,
    ) -> Result<u64, HoldingsError> {
        self.next_call()?;
        Ok(self
            .balances
            .lock()
            .expect("NullHoldings lock")
            .get(asset)
            .and_then(|holders| holders.get(holder))
            .copied()
            .unwrap_or(0))
    }

    fn name(&self) -> &str {
        "null"
    }
}
