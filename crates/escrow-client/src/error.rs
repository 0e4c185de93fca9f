//! error types for escrow client

use thiserror::Error;

use crate::units::UnitsError;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("invalid rpc endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    #[error("confirmation failed: {0}")]
    ConfirmationFailed(String),

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error(transparent)]
    Units(#[from] UnitsError),
}

impl ChainError {
    /// most specific failure reason carried by this error, if any
    ///
    /// rpc and contract failures wrap the node's message; the others are
    /// already specific enough to show as-is.
    pub fn reason(&self) -> Option<String> {
        let reason = match self {
            ChainError::QueryFailed(r)
            | ChainError::SubmissionFailed(r)
            | ChainError::ConfirmationFailed(r) => r.trim().to_string(),
            other => other.to_string(),
        };

        if reason.is_empty() {
            None
        } else {
            Some(reason)
        }
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
