//! Deadline enforcement for adapter calls.

use crate::{HoldingsAdapter, HoldingsError};
use stakegov_types::{AssetId, HolderId, Timestamp};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

/// Wraps an adapter so that no call blocks longer than `timeout`.
///
/// Each call runs on a short-lived helper thread. When the deadline passes
/// the caller gets [`HoldingsError::Timeout`]; the helper thread is left to
/// finish on its own and its late answer is discarded.
pub struct TimeoutHoldings<A> {
    inner: Arc<A>,
    timeout: Duration,
}

impl<A: HoldingsAdapter + 'static> TimeoutHoldings<A> {
    pub fn new(inner: A, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }

    fn call<T, F>(&self, f: F) -> Result<T, HoldingsError>
    where
        T: Send + 'static,
        F: FnOnce(&A) -> Result<T, HoldingsError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        std::thread::Builder::new()
            .name("holdings-call".to_string())
            .spawn(move || {
                // The receiver may already be gone after a timeout.
                let _ = tx.send(f(inner.as_ref()));
            })
            .map_err(|e| HoldingsError::Unavailable(format!("spawn failed: {e}")))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let ms = self.timeout.as_millis() as u64;
                tracing::warn!(
                    adapter = self.inner.name(),
                    timeout_ms = ms,
                    "holdings call timed out"
                );
                Err(HoldingsError::Timeout(ms))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(HoldingsError::Unavailable(
                "holdings call panicked".to_string(),
            )),
        }
    }
}

impl<A: HoldingsAdapter + 'static> HoldingsAdapter for TimeoutHoldings<A> {
    fn holders_of(
        &self,
        asset: &AssetId,
        as_of: Timestamp,
    ) -> Result<Vec<HolderId>, HoldingsError> {
        let asset = asset.clone();
        self.call(move |inner| inner.holders_of(&asset, as_of))
    }

    fn get_units(
        &self,
        holder: &HolderId,
        asset: &AssetId,
        as_of: Timestamp,
    ) -> Result<u64, HoldingsError> {
        let holder = holder.clone();
        let asset = asset.clone();
        self.call(move |inner| inner.get_units(&holder, &asset, as_of))
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticHoldings;

    struct SlowHoldings(Duration);

    impl HoldingsAdapter for SlowHoldings {
        fn holders_of(&self, _: &AssetId, _: Timestamp) -> Result<Vec<HolderId>, HoldingsError> {
            std::thread::sleep(self.0);
            Ok(vec![HolderId::new("late")])
        }

        fn get_units(&self, _: &HolderId, _: &AssetId, _: Timestamp) -> Result<u64, HoldingsError> {
            std::thread::sleep(self.0);
            Ok(1)
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[test]
    fn fast_calls_pass_through() {
        let mut inner = StaticHoldings::new();
        inner.set(AssetId::new("a"), HolderId::new("h"), 9);
        let adapter = TimeoutHoldings::new(inner, Duration::from_secs(5));
        let units = adapter
            .get_units(&HolderId::new("h"), &AssetId::new("a"), Timestamp::EPOCH)
            .unwrap();
        assert_eq!(units, 9);
    }

    #[test]
    fn slow_calls_time_out_as_transient() {
        let adapter = TimeoutHoldings::new(
            SlowHoldings(Duration::from_millis(500)),
            Duration::from_millis(20),
        );
        let err = adapter
            .holders_of(&AssetId::new("a"), Timestamp::EPOCH)
            .unwrap_err();
        assert_eq!(err, HoldingsError::Timeout(20));
        assert!(err.is_transient());
    }
}
