use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HoldingsError {
    #[error("holdings service unavailable: {0}")]
    Unavailable(String),

    #[error("holdings call timed out after {0} ms")]
    Timeout(u64),

    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    #[error("{0}")]
    Other(String),
}

impl HoldingsError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}
