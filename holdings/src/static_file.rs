//! File-backed holdings, for operators and demos.

use crate::{HoldingsAdapter, HoldingsError};
use stakegov_types::{AssetId, HolderId, Timestamp};
use std::collections::BTreeMap;
use std::path::Path;

/// Holdings read once from a JSON document of the form
/// `{ "<asset>": { "<holder>": <units>, ... }, ... }`.
///
/// Balances do not change over time, so `as_of` is ignored.
#[derive(Clone, Debug, Default)]
pub struct StaticHoldings {
    assets: BTreeMap<AssetId, BTreeMap<HolderId, u64>>,
}

impl StaticHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a holder's balance, replacing any previous one.
    pub fn set(&mut self, asset: AssetId, holder: HolderId, units: u64) {
        self.assets.entry(asset).or_default().insert(holder, units);
    }

    pub fn from_json_str(s: &str) -> Result<Self, HoldingsError> {
        let raw: BTreeMap<String, BTreeMap<String, u64>> =
            serde_json::from_str(s).map_err(|e| HoldingsError::Other(e.to_string()))?;
        let mut holdings = Self::new();
        for (asset, holders) in raw {
            let asset: AssetId = asset
                .parse()
                .map_err(|e: stakegov_types::TypesError| HoldingsError::Other(e.to_string()))?;
            for (holder, units) in holders {
                let holder: HolderId = holder
                    .parse()
                    .map_err(|e: stakegov_types::TypesError| HoldingsError::Other(e.to_string()))?;
                holdings.set(asset.clone(), holder, units);
            }
        }
        Ok(holdings)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, HoldingsError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HoldingsError::Unavailable(format!("{}: {e}", path.display())))?;
        let holdings = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            assets = holdings.assets.len(),
            "loaded static holdings"
        );
        Ok(holdings)
    }
}

impl HoldingsAdapter for StaticHoldings {
    fn holders_of(
        &self,
        asset: &AssetId,
        _as_of: Timestamp,
    ) -> Result<Vec<HolderId>, HoldingsError> {
        self.assets
            .get(asset)
            .map(|holders| holders.keys().cloned().collect())
            .ok_or_else(|| HoldingsError::UnknownAsset(asset.to_string()))
    }

    fn get_units(
        &self,
        holder: &HolderId,
        asset: &AssetId,
        _as_of: Timestamp,
    ) -> Result<u64, HoldingsError> {
        let holders = self
            .assets
            .get(asset)
            .ok_or_else(|| HoldingsError::UnknownAsset(asset.to_string()))?;
        Ok(holders.get(holder).copied().unwrap_or(0))
    }

    fn name(&self) -> &str {
        "static-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_document() {
        let holdings = StaticHoldings::from_json_str(
            r#"{ "tower-7": { "h1": 600, "h2": 300, "h3": 100 } }"#,
        )
        .unwrap();
        let asset = AssetId::new("tower-7");
        let holders = holdings.holders_of(&asset, Timestamp::EPOCH).unwrap();
        assert_eq!(holders.len(), 3);
        assert_eq!(
            holdings
                .get_units(&HolderId::new("h2"), &asset, Timestamp::EPOCH)
                .unwrap(),
            300
        );
        assert_eq!(
            holdings
                .get_units(&HolderId::new("nobody"), &asset, Timestamp::EPOCH)
                .unwrap(),
            0
        );
    }

    #[test]
    fn unknown_asset_is_not_transient() {
        let holdings = StaticHoldings::new();
        let err = holdings
            .holders_of(&AssetId::new("missing"), Timestamp::EPOCH)
            .unwrap_err();
        assert!(matches!(err, HoldingsError::UnknownAsset(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn blank_holder_is_rejected() {
        assert!(StaticHoldings::from_json_str(r#"{ "a": { "": 1 } }"#).is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holdings.json");
        std::fs::write(&path, r#"{ "loan-3": { "x": 5 } }"#).unwrap();
        let holdings = StaticHoldings::from_json_file(&path).unwrap();
        assert_eq!(
            holdings
                .get_units(&HolderId::new("x"), &AssetId::new("loan-3"), Timestamp::EPOCH)
                .unwrap(),
            5
        );
    }
}
