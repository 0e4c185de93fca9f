//! the chain surface the transfer panel depends on
//!
//! [`crate::RpcChain`] is the real implementation; tests substitute an
//! in-memory one.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::error::Result;

/// mined receipt for a submitted `pullFunds`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// token reads and the escrow write, bound to one token and one escrow
#[async_trait]
pub trait EscrowChain: Send + Sync {
    /// token contract address
    fn token(&self) -> Address;

    /// escrow contract address (the spender for allowances)
    fn escrow(&self) -> Address;

    /// address derived from the signing key
    fn signer(&self) -> Address;

    async fn decimals(&self) -> Result<u8>;

    async fn balance_of(&self, owner: Address) -> Result<U256>;

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256>;

    /// `companyWallet()` as stored in the escrow
    async fn company_wallet(&self) -> Result<Address>;

    /// send `pullFunds(token, user, recipient, amount)`; returns once the
    /// node has accepted the transaction
    async fn submit_pull(&self, user: Address, recipient: Address, amount: U256) -> Result<TxHash>;

    /// wait until the transaction is mined; a reverted receipt is an error
    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation>;
}
