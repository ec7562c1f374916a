//! Tunable parameters of the governance core.

use crate::power::Percent;
use serde::{Deserialize, Serialize};

/// Parameters every governance engine is constructed with.
///
/// Deserializes with per-field defaults so a config file only needs to name
/// the values it overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceParams {
    // ── Delegation ───────────────────────────────────────────────────────
    /// Maximum hops followed when resolving or cycle-checking a delegation
    /// chain. Chains can never be cyclic, so hitting this bound on read means
    /// the stored graph is corrupt.
    pub max_delegation_depth: usize,

    // ── Proposals ────────────────────────────────────────────────────────
    /// Pass threshold applied by callers that do not specify one.
    pub default_pass_threshold_pct: Percent,

    // ── Holdings adapter ─────────────────────────────────────────────────
    /// Attempts made to read a full holder set before activation gives up.
    pub adapter_max_attempts: u32,

    /// Backoff before the second attempt; doubles on each further attempt.
    pub adapter_backoff_ms: u64,

    /// Deadline for a single adapter call.
    pub adapter_timeout_ms: u64,
}

impl GovernanceParams {
    /// Parameters for tests: no backoff sleeps, shallow chains.
    pub fn test_defaults() -> Self {
        Self {
            max_delegation_depth: 16,
            adapter_backoff_ms: 0,
            adapter_timeout_ms: 1_000,
            ..Self::default()
        }
    }

    /// Backoff to sleep after failed attempt number `attempt` (1-based).
    pub fn backoff_after_attempt_ms(&self, attempt: u32) -> u64 {
        let shift = attempt.saturating_sub(1).min(16);
        self.adapter_backoff_ms.saturating_mul(1u64 << shift)
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            max_delegation_depth: 32,
            default_pass_threshold_pct: Percent::HALF,
            adapter_max_attempts: 3,
            adapter_backoff_ms: 200,
            adapter_timeout_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let params = GovernanceParams::default();
        assert_eq!(params.backoff_after_attempt_ms(1), 200);
        assert_eq!(params.backoff_after_attempt_ms(2), 400);
        assert_eq!(params.backoff_after_attempt_ms(3), 800);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let params: GovernanceParams =
            serde_json::from_str(r#"{ "max_delegation_depth": 8 }"#).unwrap();
        assert_eq!(params.max_delegation_depth, 8);
        assert_eq!(params.adapter_max_attempts, 3);
        assert_eq!(params.default_pass_threshold_pct, Percent::HALF);
    }
}
