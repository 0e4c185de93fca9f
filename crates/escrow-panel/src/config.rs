//! panel configuration
//!
//! an optional toml file provides the base; flags and their environment
//! variables override it field by field.
//!
//! ```toml
//! sender_key = "..."            # prefer SENDER_KEY in the environment
//!
//! [contracts]
//! escrow = "0x..."
//! token = "0x55d398326f99059fF775485246999027B3197955"
//! company_wallet = "0x..."
//!
//! [chain]
//! rpc_endpoint = "https://bsc-dataseed.binance.org/"
//! explorer_url = "https://bscscan.com"
//! token_symbol = "USDT"
//!
//! [server]
//! listen = "127.0.0.1:8080"
//! metrics_port = 9100
//! ```

use clap::Parser;
use escrow_client::ChainConfig;
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// loopback by default; this panel signs with the company key
pub const DEFAULT_LISTEN: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing {field} (use --{flag} / {env} or the config file)")]
    Missing {
        field: &'static str,
        flag: &'static str,
        env: &'static str,
    },
}

/// escrow-panel - pull approved usdt through the bsc escrow
#[derive(Parser, Debug, Default)]
#[command(name = "escrow-panel")]
#[command(about = "admin panel for pulling approved usdt through the bsc escrow")]
#[command(version)]
pub struct Args {
    /// toml config file
    #[arg(short, long, env = "ESCROW_PANEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// escrow contract address
    #[arg(long, env = "ESCROW_CONTRACT_ADDRESS")]
    pub escrow: Option<String>,

    /// usdt token contract address
    #[arg(long, env = "USDT_TOKEN_ADDRESS")]
    pub token: Option<String>,

    /// company wallet address (must match the escrow's companyWallet)
    #[arg(long, env = "COMPANY_WALLET_ADDRESS")]
    pub company_wallet: Option<String>,

    /// company wallet private key, hex
    #[arg(long, env = "SENDER_KEY", hide_env_values = true)]
    pub sender_key: Option<String>,

    /// bsc json-rpc endpoint
    #[arg(long, env = "BSC_RPC_URL")]
    pub rpc: Option<String>,

    /// block explorer base url
    #[arg(long)]
    pub explorer: Option<String>,

    /// token symbol shown in messages
    #[arg(long)]
    pub symbol: Option<String>,

    /// http listen address (default: 127.0.0.1:8080)
    #[arg(short, long, env = "ESCROW_PANEL_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// prometheus metrics port on the listen ip (disabled when unset)
    #[arg(long)]
    pub metrics_port: Option<u16>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub sender_key: Option<String>,
    pub contracts: ContractsSection,
    pub chain: ChainConfig,
    pub server: ServerSection,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractsSection {
    pub escrow: Option<String>,
    pub token: Option<String>,
    pub company_wallet: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub listen: Option<SocketAddr>,
    pub metrics_port: Option<u16>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::parse(&text, &display)
    }

    pub fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }
}

/// resolved configuration the panel is initialized from
///
/// addresses and key stay opaque strings here; the chain connection parses
/// them.
#[derive(Clone)]
pub struct PanelConfig {
    pub escrow: String,
    pub token: String,
    pub company_wallet: String,
    pub sender_key: String,
    pub chain: ChainConfig,
    pub listen: SocketAddr,
    pub metrics_port: Option<u16>,
}

impl PanelConfig {
    /// read the config file named in `args` (if any) and apply overrides
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Self::merge(file, args)
    }

    pub fn merge(file: FileConfig, args: Args) -> Result<Self, ConfigError> {
        let required = |value: Option<String>,
                        field: &'static str,
                        flag: &'static str,
                        env: &'static str| {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing { field, flag, env })
        };

        let mut chain = file.chain;
        if let Some(rpc) = args.rpc {
            chain.rpc_endpoint = rpc;
        }
        if let Some(explorer) = args.explorer {
            chain.explorer_url = explorer;
        }
        if let Some(symbol) = args.symbol {
            chain.token_symbol = symbol;
        }

        Ok(Self {
            escrow: required(
                args.escrow.or(file.contracts.escrow),
                "escrow contract address",
                "escrow",
                "ESCROW_CONTRACT_ADDRESS",
            )?,
            token: required(
                args.token.or(file.contracts.token),
                "token contract address",
                "token",
                "USDT_TOKEN_ADDRESS",
            )?,
            company_wallet: required(
                args.company_wallet.or(file.contracts.company_wallet),
                "company wallet address",
                "company-wallet",
                "COMPANY_WALLET_ADDRESS",
            )?,
            sender_key: required(
                args.sender_key.or(file.sender_key),
                "company wallet private key",
                "sender-key",
                "SENDER_KEY",
            )?,
            chain,
            listen: args.listen.or(file.server.listen).unwrap_or(DEFAULT_LISTEN),
            metrics_port: args.metrics_port.or(file.server.metrics_port),
        })
    }
}

impl fmt::Debug for PanelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelConfig")
            .field("escrow", &self.escrow)
            .field("token", &self.token)
            .field("company_wallet", &self.company_wallet)
            .field("sender_key", &"<redacted>")
            .field("chain", &self.chain)
            .field("listen", &self.listen)
            .field("metrics_port", &self.metrics_port)
            .finish()
    }
}
