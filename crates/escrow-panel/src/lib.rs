//! escrow-panel - pull approved usdt through the bsc escrow
//!
//! an operator enters a user wallet, a recipient and an amount; the panel
//! checks the user's allowance towards the escrow and, if it covers the
//! amount, calls `pullFunds` signed by the company wallet and waits for the
//! receipt.
//!
//! approval is never requested here. users approve the escrow themselves,
//! the panel only reads the allowance.
//!
//! ## layout
//!
//! - [`config`]: toml file + flags/env
//! - [`panel`]: [`TransferPanel`], the controller
//! - [`notify`]: operator notifications and their broadcast
//! - [`history`]: in-memory list of confirmed transfers
//! - [`server`]: axum routes and the static page

pub mod config;
pub mod error;
pub mod history;
pub mod notify;
pub mod panel;
pub mod server;

pub use config::{Args, PanelConfig};
pub use error::{PanelError, Result};
pub use history::TransferRecord;
pub use notify::{Notification, NotificationKind};
pub use panel::{Phase, TransferForm, TransferPanel};
pub use server::router;
