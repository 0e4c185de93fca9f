//! in-memory escrow chain for panel tests

#![allow(dead_code)]

use async_trait::async_trait;
use escrow_client::{Address, ChainConfig, ChainError, Confirmation, EscrowChain, TxHash, U256};
use escrow_panel::{TransferForm, TransferPanel};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const DECIMALS: u8 = 18;
pub const ESCROW: &str = "0x1111111111111111111111111111111111111111";
pub const TOKEN: &str = "0x55d398326f99059fF775485246999027B3197955";
pub const COMPANY: &str = "0x2222222222222222222222222222222222222222";
pub const USER: &str = "0x3333333333333333333333333333333333333333";
pub const RECIPIENT: &str = "0x4444444444444444444444444444444444444444";

/// whole tokens at 18 decimals
pub fn tokens(n: u64) -> U256 {
    escrow_client::to_smallest_unit(&n.to_string(), DECIMALS).unwrap()
}

pub fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

pub fn form(amount: &str) -> TransferForm {
    TransferForm {
        recipient_address: RECIPIENT.into(),
        from_address: USER.into(),
        amount: amount.into(),
    }
}

#[derive(Clone, Debug)]
pub enum Confirm {
    Mined,
    Reverted,
    Fails(String),
}

/// token reads that can be made to fail
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Read {
    Decimals,
    Balance,
    Allowance,
}

#[derive(Default)]
pub struct Calls {
    pub decimals: AtomicUsize,
    pub balance: AtomicUsize,
    pub allowance: AtomicUsize,
    pub company_wallet: AtomicUsize,
    pub submit: AtomicUsize,
    pub confirm: AtomicUsize,
}

impl Calls {
    pub fn total(&self) -> usize {
        [
            &self.decimals,
            &self.balance,
            &self.allowance,
            &self.company_wallet,
            &self.submit,
            &self.confirm,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }

    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct MockChain {
    pub calls: Calls,
    pub balance: U256,
    pub allowance: U256,
    pub company_wallet: Address,
    pub tx_hash: TxHash,
    pub submit_error: Option<String>,
    pub read_error: Option<(Read, String)>,
    pub confirm: Confirm,
    /// when set, `confirm` waits for a permit before answering
    pub hold_confirm: Option<Arc<Notify>>,
    pub submitted: Mutex<Vec<(Address, Address, U256)>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            calls: Calls::default(),
            balance: tokens(1_000),
            allowance: tokens(500),
            company_wallet: addr(COMPANY),
            tx_hash: TxHash::repeat_byte(0xab),
            submit_error: None,
            read_error: None,
            confirm: Confirm::Mined,
            hold_confirm: None,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_allowance(mut self, allowance: U256) -> Self {
        self.allowance = allowance;
        self
    }

    pub fn with_balance(mut self, balance: U256) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_tx_hash(mut self, tx_hash: TxHash) -> Self {
        self.tx_hash = tx_hash;
        self
    }

    pub fn with_confirm(mut self, confirm: Confirm) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn with_submit_error(mut self, reason: &str) -> Self {
        self.submit_error = Some(reason.into());
        self
    }

    pub fn with_read_error(mut self, read: Read, reason: &str) -> Self {
        self.read_error = Some((read, reason.into()));
        self
    }

    pub fn with_hold(mut self, gate: Arc<Notify>) -> Self {
        self.hold_confirm = Some(gate);
        self
    }

    pub fn with_company_wallet(mut self, wallet: Address) -> Self {
        self.company_wallet = wallet;
        self
    }

    fn read(&self, read: Read) -> Result<(), ChainError> {
        match &self.read_error {
            Some((failing, reason)) if *failing == read => {
                Err(ChainError::QueryFailed(reason.clone()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl EscrowChain for MockChain {
    fn token(&self) -> Address {
        addr(TOKEN)
    }

    fn escrow(&self) -> Address {
        addr(ESCROW)
    }

    fn signer(&self) -> Address {
        addr(COMPANY)
    }

    async fn decimals(&self) -> Result<u8, ChainError> {
        self.calls.decimals.fetch_add(1, Ordering::SeqCst);
        self.read(Read::Decimals)?;
        Ok(DECIMALS)
    }

    async fn balance_of(&self, _owner: Address) -> Result<U256, ChainError> {
        self.calls.balance.fetch_add(1, Ordering::SeqCst);
        self.read(Read::Balance)?;
        Ok(self.balance)
    }

    async fn allowance(&self, _owner: Address, spender: Address) -> Result<U256, ChainError> {
        self.calls.allowance.fetch_add(1, Ordering::SeqCst);
        assert_eq!(spender, addr(ESCROW), "allowance must be read towards the escrow");
        self.read(Read::Allowance)?;
        Ok(self.allowance)
    }

    async fn company_wallet(&self) -> Result<Address, ChainError> {
        self.calls.company_wallet.fetch_add(1, Ordering::SeqCst);
        Ok(self.company_wallet)
    }

    async fn submit_pull(
        &self,
        user: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        self.calls.submit.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.submit_error {
            return Err(ChainError::SubmissionFailed(reason.clone()));
        }
        self.submitted.lock().unwrap().push((user, recipient, amount));
        Ok(self.tx_hash)
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation, ChainError> {
        self.calls.confirm.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.hold_confirm {
            gate.notified().await;
        }
        match &self.confirm {
            Confirm::Mined => Ok(Confirmation {
                tx_hash,
                block_number: Some(42),
            }),
            Confirm::Reverted => Err(ChainError::Reverted {
                tx_hash: tx_hash.to_string(),
            }),
            Confirm::Fails(reason) => Err(ChainError::ConfirmationFailed(reason.clone())),
        }
    }
}

pub fn panel(chain: Arc<MockChain>) -> TransferPanel {
    TransferPanel::new(chain, addr(COMPANY), ChainConfig::bsc())
}
