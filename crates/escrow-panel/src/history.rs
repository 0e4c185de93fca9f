//! confirmed transfers for this process lifetime
//!
//! most recent first, unbounded, no dedup. nothing is written to disk.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

/// a confirmed `pullFunds`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub from: String,
    pub to: String,
    /// amount as entered, normalized
    pub amount: String,
    /// amount in the token's smallest unit
    pub amount_raw: String,
    pub symbol: String,
    pub tx_hash: String,
    pub tx_url: String,
    pub block_number: Option<u64>,
    /// unix seconds at confirmation
    pub at: u64,
}

#[derive(Default)]
pub struct TransferHistory {
    records: Mutex<VecDeque<TransferRecord>>,
}

impl TransferHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// place a record ahead of all existing ones
    pub fn prepend(&self, record: TransferRecord) {
        self.records.lock().push_front(record);
    }

    pub fn snapshot(&self) -> Vec<TransferRecord> {
        self.records.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
