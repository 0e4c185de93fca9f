//! chain configuration and contract addresses

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};
use crate::units::parse_address;
use alloy::primitives::Address;

/// public bsc dataseed endpoint
pub const BSC_RPC_ENDPOINT: &str = "https://bsc-dataseed.binance.org/";

/// bscscan
pub const BSC_EXPLORER_URL: &str = "https://bscscan.com";

/// chain the panel talks to
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChainConfig {
    /// json-rpc http endpoint
    pub rpc_endpoint: String,
    /// block explorer base url, transaction pages live under `/tx/<hash>`
    pub explorer_url: String,
    /// token symbol shown to the operator
    pub token_symbol: String,
}

impl ChainConfig {
    /// bsc mainnet with usdt
    pub fn bsc() -> Self {
        Self {
            rpc_endpoint: BSC_RPC_ENDPOINT.into(),
            explorer_url: BSC_EXPLORER_URL.into(),
            token_symbol: "USDT".into(),
        }
    }

    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::bsc()
    }
}

/// parsed contract and wallet addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractAddresses {
    pub escrow: Address,
    pub token: Address,
    pub company_wallet: Address,
}

impl ContractAddresses {
    pub fn parse(escrow: &str, token: &str, company_wallet: &str) -> Result<Self> {
        let parse = |label: &str, value: &str| {
            parse_address(value.trim())
                .ok_or_else(|| ChainError::InvalidAddress(format!("{label}: {value}")))
        };

        Ok(Self {
            escrow: parse("escrow contract", escrow)?,
            token: parse("token contract", token)?,
            company_wallet: parse("company wallet", company_wallet)?,
        })
    }
}
