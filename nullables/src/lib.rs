//! Nullable infrastructure for deterministic testing.
//!
//! The governance core's external dependencies (time and the holdings
//! service) have test-friendly stand-ins here that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod holdings;

pub use clock::NullClock;
pub use holdings::NullHoldings;
