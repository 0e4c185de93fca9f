//! transfer panel controller
//!
//! mediates between operator input, the escrow/token contracts and the
//! notification/history surfaces. one instance per process, constructed
//! explicitly and shared behind an `Arc`.
//!
//! ## transfer flow
//!
//! ```text
//! validate ──► checking allowance ──► submitting ──► awaiting confirmation ──► idle
//!    │               │                    │                   │
//!    └───────────────┴────────────────────┴───────────────────┴──► idle (error)
//! ```
//!
//! validation is pure and short-circuits before any network call. the
//! in-flight guard is taken right after it and released on every exit path,
//! which also puts the phase back to idle (re-enabling submit).

use escrow_client::{
    format_display, format_units, parse_address,
    units::{shorten_address, DecimalAmount},
    Address, ChainConfig, ContractAddresses, EscrowChain, RpcChain,
};
use metrics::{counter, histogram};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    config::PanelConfig,
    error::{PanelError, Result},
    history::{TransferHistory, TransferRecord},
    notify::{unix_now, Notification, Notifier},
};

/// where an in-flight transfer is
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    CheckingAllowance,
    Submitting,
    AwaitingConfirmation,
}

/// submit button state as the page renders it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub submit_enabled: bool,
    pub loading: bool,
}

impl Phase {
    /// submit is disabled from submission until the receipt is in
    pub fn control(self) -> ControlState {
        let busy = matches!(self, Phase::Submitting | Phase::AwaitingConfirmation);
        ControlState {
            submit_enabled: !busy,
            loading: busy,
        }
    }
}

/// static display fields
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContractInfo {
    pub token: String,
    pub company_wallet: String,
    pub escrow: String,
    pub signer: String,
    pub symbol: String,
    pub explorer_url: String,
}

/// transfer form as submitted
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TransferForm {
    pub recipient_address: String,
    pub from_address: String,
    pub amount: String,
}

/// a validated transfer form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: Address,
    pub recipient: Address,
    pub amount: DecimalAmount,
}

impl TransferRequest {
    /// recipient, then source, then amount; first failure wins
    pub fn validate(form: &TransferForm) -> Result<Self> {
        let recipient =
            parse_address(form.recipient_address.trim()).ok_or(PanelError::InvalidRecipient)?;
        let from = parse_address(form.from_address.trim()).ok_or(PanelError::InvalidWallet)?;

        let amount: DecimalAmount = form
            .amount
            .parse()
            .map_err(|_| PanelError::AmountNotANumber)?;
        if !amount.is_positive() {
            return Err(PanelError::AmountNotPositive);
        }

        Ok(Self {
            from,
            recipient,
            amount,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub address: String,
    pub decimals: u8,
    pub symbol: String,
    /// exact, token precision
    pub balance: String,
    pub allowance: String,
    /// rounded to two places
    pub balance_display: String,
    pub allowance_display: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PanelStatus {
    pub phase: Phase,
    pub control: ControlState,
    pub latest_notification: Option<Notification>,
    pub transfers: usize,
}

pub struct TransferPanel {
    chain: Arc<dyn EscrowChain>,
    company_wallet: Address,
    config: ChainConfig,
    info: ContractInfo,
    phase: Mutex<Phase>,
    in_flight: AtomicBool,
    history: TransferHistory,
    notifier: Notifier,
}

/// held for the lifetime of one transfer
struct InFlight<'a> {
    panel: &'a TransferPanel,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.panel.phase.lock() = Phase::Idle;
        self.panel.in_flight.store(false, Ordering::Release);
    }
}

impl TransferPanel {
    pub fn new(chain: Arc<dyn EscrowChain>, company_wallet: Address, config: ChainConfig) -> Self {
        let info = ContractInfo {
            token: chain.token().to_string(),
            company_wallet: company_wallet.to_string(),
            escrow: chain.escrow().to_string(),
            signer: chain.signer().to_string(),
            symbol: config.token_symbol.clone(),
            explorer_url: config.explorer_url.clone(),
        };

        Self {
            chain,
            company_wallet,
            config,
            info,
            phase: Mutex::new(Phase::Idle),
            in_flight: AtomicBool::new(false),
            history: TransferHistory::new(),
            notifier: Notifier::new(),
        }
    }

    /// build the json-rpc connection, signing identity and contract proxies
    /// from configuration. no network call is made here.
    pub fn connect(config: &PanelConfig) -> Result<Self> {
        let addresses =
            ContractAddresses::parse(&config.escrow, &config.token, &config.company_wallet)?;
        let chain = RpcChain::connect(&config.chain, addresses, &config.sender_key)?;

        Ok(Self::new(
            Arc::new(chain),
            addresses.company_wallet,
            config.chain.clone(),
        ))
    }

    pub fn info(&self) -> &ContractInfo {
        &self.info
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    pub fn status(&self) -> PanelStatus {
        let phase = self.phase();
        PanelStatus {
            phase,
            control: phase.control(),
            latest_notification: self.notifier.latest(),
            transfers: self.history.len(),
        }
    }

    pub fn history(&self) -> Vec<TransferRecord> {
        self.history.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn latest_notification(&self) -> Option<Notification> {
        self.notifier.latest()
    }

    /// read balance and allowance (towards the escrow) for a wallet
    pub async fn check_balance(&self, from_address: &str) -> Result<BalanceReport> {
        let result = self.read_balance(from_address.trim()).await;

        match &result {
            Ok(report) => {
                counter!("panel_balance_checks_total", "outcome" => "ok").increment(1);
                self.notifier.info(format!(
                    "balance: {} {symbol} | allowance: {} {symbol}",
                    report.balance_display,
                    report.allowance_display,
                    symbol = report.symbol,
                ));
            }
            Err(err) => {
                counter!("panel_balance_checks_total", "outcome" => err.outcome()).increment(1);
                if err.is_validation() {
                    self.notifier.error(err.to_string());
                } else {
                    self.notifier.error(format!("failed to check balance: {err}"));
                }
            }
        }

        result
    }

    async fn read_balance(&self, from_address: &str) -> Result<BalanceReport> {
        let owner = parse_address(from_address).ok_or(PanelError::InvalidWallet)?;

        let balance = self.chain.balance_of(owner).await?;
        let allowance = self.chain.allowance(owner, self.chain.escrow()).await?;
        let decimals = self.chain.decimals().await?;

        Ok(BalanceReport {
            address: owner.to_string(),
            decimals,
            symbol: self.config.token_symbol.clone(),
            balance: format_units(balance, decimals),
            allowance: format_units(allowance, decimals),
            balance_display: format_display(balance, decimals),
            allowance_display: format_display(allowance, decimals),
        })
    }

    /// validate, check allowance, `pullFunds`, wait for the receipt
    ///
    /// a record is added only once the transaction is mined successfully.
    pub async fn handle_transfer(&self, form: TransferForm) -> Result<TransferRecord> {
        let started = Instant::now();
        let result = self.run_transfer(&form).await;

        match &result {
            Ok(_) => {
                counter!("panel_transfers_total", "outcome" => "confirmed").increment(1);
                histogram!("panel_transfer_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
            }
            Err(err) => {
                counter!("panel_transfers_total", "outcome" => err.outcome()).increment(1);
                match err {
                    PanelError::Chain(_) | PanelError::Amount(_) | PanelError::Internal(_) => {
                        self.notifier.error(format!("transfer failed: {err}"));
                    }
                    _ => {
                        self.notifier.error(err.to_string());
                    }
                }
            }
        }

        result
    }

    async fn run_transfer(&self, form: &TransferForm) -> Result<TransferRecord> {
        let request = TransferRequest::validate(form)?;
        let _guard = self.begin_transfer()?;
        let symbol = &self.config.token_symbol;

        self.set_phase(Phase::CheckingAllowance);
        let decimals = self.chain.decimals().await?;
        let amount = request.amount.to_smallest_unit(decimals)?;

        let allowance = self.chain.allowance(request.from, self.chain.escrow()).await?;
        if allowance < amount {
            warn!(
                "allowance of {} is {}, transfer needs {}",
                shorten_address(&request.from.to_string()),
                allowance,
                amount
            );
            return Err(PanelError::InsufficientAllowance {
                allowance: format_units(allowance, decimals),
                symbol: symbol.clone(),
            });
        }

        self.set_phase(Phase::Submitting);
        let tx_hash = self
            .chain
            .submit_pull(request.from, request.recipient, amount)
            .await?;
        self.notifier.info(format!("transfer submitted: {tx_hash}"));

        self.set_phase(Phase::AwaitingConfirmation);
        let confirmation = self.chain.confirm(tx_hash).await?;

        let recipient = request.recipient.to_string();
        let tx_hash = confirmation.tx_hash.to_string();
        let record = TransferRecord {
            from: request.from.to_string(),
            to: recipient.clone(),
            amount: request.amount.to_string(),
            amount_raw: amount.to_string(),
            symbol: symbol.clone(),
            tx_url: self.config.tx_url(&tx_hash),
            tx_hash,
            block_number: confirmation.block_number,
            at: unix_now(),
        };

        self.notifier
            .success(format!("{} {} sent to {}", request.amount, symbol, recipient));
        self.history.prepend(record.clone());

        info!(
            "pulled {} {} from {} to {} in block {:?}",
            record.amount,
            symbol,
            shorten_address(&record.from),
            shorten_address(&record.to),
            record.block_number
        );

        Ok(record)
    }

    fn begin_transfer(&self) -> Result<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PanelError::TransferInProgress)?;
        Ok(InFlight { panel: self })
    }

    fn set_phase(&self, phase: Phase) {
        *self.phase.lock() = phase;
    }

    /// compare the escrow's `companyWallet()` with the configured wallet and
    /// the signing key. mismatches are logged, not fatal.
    pub async fn verify_company_wallet(&self) -> Result<bool> {
        let on_chain = self.chain.company_wallet().await?;
        let signer = self.chain.signer();
        let mut consistent = true;

        if on_chain != self.company_wallet {
            warn!(
                "escrow companyWallet is {}, configured company wallet is {}",
                on_chain, self.company_wallet
            );
            consistent = false;
        }
        if on_chain != signer {
            warn!(
                "signing key belongs to {}, not the escrow's company wallet {}; pullFunds will revert",
                signer, on_chain
            );
            consistent = false;
        }

        if consistent {
            info!("escrow companyWallet matches signer {}", signer);
        }
        Ok(consistent)
    }
}
