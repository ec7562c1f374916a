//! Holdings adapter: the governance core's view of who owns what.
//!
//! The holdings service itself is external. The core only consumes it, at
//! snapshot time, through [`HoldingsAdapter`]. This crate provides the trait,
//! a file-backed [`StaticHoldings`] for operators and demos, and
//! [`TimeoutHoldings`], which puts a deadline on every call of another
//! adapter.

pub mod error;
pub mod static_file;
pub mod timeout;

pub use error::HoldingsError;
pub use static_file::StaticHoldings;
pub use timeout::TimeoutHoldings;

use stakegov_types::{AssetId, HolderId, Timestamp};

/// Trait for reading ownership units of an asset.
pub trait HoldingsAdapter: Send + Sync {
    /// Every holder who may hold units of `asset` as of `as_of`.
    ///
    /// May include holders with a zero balance; callers filter.
    fn holders_of(&self, asset: &AssetId, as_of: Timestamp) -> Result<Vec<HolderId>, HoldingsError>;

    /// Raw ownership units `holder` held in `asset` as of `as_of`.
    fn get_units(
        &self,
        holder: &HolderId,
        asset: &AssetId,
        as_of: Timestamp,
    ) -> Result<u64, HoldingsError>;

    /// Human-readable name of this adapter.
    fn name(&self) -> &str;
}

impl<T: HoldingsAdapter + ?Sized> HoldingsAdapter for std::sync::Arc<T> {
    fn holders_of(
        &self,
        asset: &AssetId,
        as_of: Timestamp,
    ) -> Result<Vec<HolderId>, HoldingsError> {
        (**self).holders_of(asset, as_of)
    }

    fn get_units(
        &self,
        holder: &HolderId,
        asset: &AssetId,
        as_of: Timestamp,
    ) -> Result<u64, HoldingsError> {
        (**self).get_units(holder, asset, as_of)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
