//! escrow-client: bsc escrow contract access for the transfer panel
//!
//! the panel moves bep-20 tokens out of a user's wallet by calling the
//! escrow's privileged `pullFunds`. this crate holds everything that touches
//! the chain or its number formats:
//!
//! - [`units`]: address validation and decimal <-> smallest-unit conversion
//! - [`contracts`]: solidity bindings for the escrow and token interfaces
//! - [`chain`]: the [`EscrowChain`] trait the panel is written against
//! - [`rpc`]: [`RpcChain`], the json-rpc implementation signed by the company key
//!
//! ## usage
//!
//! ```rust,ignore
//! let config = ChainConfig::bsc();
//! let chain = RpcChain::connect(&config, addresses, &signing_key)?;
//!
//! let decimals = chain.decimals().await?;
//! let amount = units::to_smallest_unit("12.5", decimals)?;
//! let tx_hash = chain.submit_pull(user, recipient, amount).await?;
//! let confirmation = chain.confirm(tx_hash).await?;
//! ```

pub mod chain;
pub mod config;
pub mod contracts;
pub mod error;
pub mod rpc;
pub mod units;

pub use alloy::primitives::{Address, TxHash, U256};

pub use chain::*;
pub use config::*;
pub use error::*;
pub use rpc::RpcChain;
pub use units::{format_display, format_units, is_valid_address, parse_address, to_smallest_unit};
