//! json-rpc implementation of [`EscrowChain`]
//!
//! one http provider carrying the company wallet; gas, nonce and chain id are
//! filled by alloy's recommended fillers.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::{http::reqwest::Url, RpcError},
};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    chain::{Confirmation, EscrowChain},
    config::{ChainConfig, ContractAddresses},
    contracts::{IBep20, IEscrow},
    error::{ChainError, Result},
};

/// escrow + token bound to a json-rpc endpoint and the company signing key
pub struct RpcChain {
    provider: DynProvider,
    addresses: ContractAddresses,
    signer: Address,
}

impl RpcChain {
    /// build the connection and signing identity; no request is made until
    /// the first call
    pub fn connect(
        config: &ChainConfig,
        addresses: ContractAddresses,
        signing_key: &str,
    ) -> Result<Self> {
        let wallet = signing_key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|e| ChainError::InvalidKey(e.to_string()))?;
        let signer = wallet.address();

        let url = config
            .rpc_endpoint
            .parse::<Url>()
            .map_err(|e| ChainError::InvalidEndpoint(format!("{}: {}", config.rpc_endpoint, e)))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(wallet))
            .connect_http(url)
            .erased();

        info!("rpc endpoint {}, signing as {}", config.rpc_endpoint, signer);

        Ok(Self {
            provider,
            addresses,
            signer,
        })
    }

    fn token_contract(&self) -> IBep20::IBep20Instance<DynProvider> {
        IBep20::new(self.addresses.token, self.provider.clone())
    }

    fn escrow_contract(&self) -> IEscrow::IEscrowInstance<DynProvider> {
        IEscrow::new(self.addresses.escrow, self.provider.clone())
    }
}

/// pull the node's own message out of rpc error responses
fn contract_reason(err: &alloy::contract::Error) -> String {
    match err {
        alloy::contract::Error::TransportError(RpcError::ErrorResp(payload)) => {
            payload.message.to_string()
        }
        other => other.to_string(),
    }
}

#[async_trait]
impl EscrowChain for RpcChain {
    fn token(&self) -> Address {
        self.addresses.token
    }

    fn escrow(&self) -> Address {
        self.addresses.escrow
    }

    fn signer(&self) -> Address {
        self.signer
    }

    async fn decimals(&self) -> Result<u8> {
        self.token_contract()
            .decimals()
            .call()
            .await
            .map_err(|e| ChainError::QueryFailed(contract_reason(&e)))
    }

    async fn balance_of(&self, owner: Address) -> Result<U256> {
        debug!("balanceOf({})", owner);
        self.token_contract()
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ChainError::QueryFailed(contract_reason(&e)))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256> {
        debug!("allowance({}, {})", owner, spender);
        self.token_contract()
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| ChainError::QueryFailed(contract_reason(&e)))
    }

    async fn company_wallet(&self) -> Result<Address> {
        self.escrow_contract()
            .companyWallet()
            .call()
            .await
            .map_err(|e| ChainError::QueryFailed(contract_reason(&e)))
    }

    async fn submit_pull(&self, user: Address, recipient: Address, amount: U256) -> Result<TxHash> {
        let pending = self
            .escrow_contract()
            .pullFunds(self.addresses.token, user, recipient, amount)
            .send()
            .await
            .map_err(|e| ChainError::SubmissionFailed(contract_reason(&e)))?;

        Ok(*pending.tx_hash())
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .map_err(|e| ChainError::ConfirmationFailed(e.to_string()))?;

        if !receipt.status() {
            return Err(ChainError::Reverted {
                tx_hash: tx_hash.to_string(),
            });
        }

        Ok(Confirmation {
            tx_hash,
            block_number: receipt.block_number,
        })
    }
}
