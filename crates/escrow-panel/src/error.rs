//! error types for the transfer panel

use escrow_client::{units::UnitsError, ChainError};
use thiserror::Error;

/// shown when the chain gave no usable reason
pub const GENERIC_FAILURE: &str = "unknown error";

#[derive(Error, Debug)]
pub enum PanelError {
    // === validation: never reaches the network ===
    #[error("invalid recipient")]
    InvalidRecipient,

    #[error("invalid wallet")]
    InvalidWallet,

    #[error("amount is not a number")]
    AmountNotANumber,

    #[error("amount must be greater than 0")]
    AmountNotPositive,

    // === preconditions ===
    #[error("a transfer is already in progress")]
    TransferInProgress,

    #[error("user has not approved enough {symbol}. allowance: {allowance} {symbol}")]
    InsufficientAllowance { allowance: String, symbol: String },

    #[error("{0}")]
    Amount(#[from] UnitsError),

    // === chain ===
    #[error("{}", chain_reason(.0))]
    Chain(#[from] ChainError),

    #[error("internal error: {0}")]
    Internal(String),
}

fn chain_reason(err: &ChainError) -> String {
    err.reason().unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

impl PanelError {
    /// input errors caught before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PanelError::InvalidRecipient
                | PanelError::InvalidWallet
                | PanelError::AmountNotANumber
                | PanelError::AmountNotPositive
        )
    }

    /// metrics label
    pub fn outcome(&self) -> &'static str {
        match self {
            e if e.is_validation() => "invalid",
            PanelError::TransferInProgress => "busy",
            PanelError::InsufficientAllowance { .. } => "insufficient_allowance",
            PanelError::Amount(_) => "invalid",
            PanelError::Chain(ChainError::Reverted { .. }) => "reverted",
            _ => "failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
