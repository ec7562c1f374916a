//! Parse and validation errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid holder id: {0:?}")]
    InvalidHolderId(String),

    #[error("invalid asset id: {0:?}")]
    InvalidAssetId(String),

    #[error("invalid proposal id: {0:?}")]
    InvalidProposalId(String),

    #[error("percentage out of range (0-100): {0}")]
    PercentOutOfRange(u32),

    #[error("unknown {kind}: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("invalid delegation scope: {0:?}")]
    InvalidScope(String),
}
