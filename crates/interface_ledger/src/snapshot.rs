//! JSON snapshot and report formats used by `ledger-report`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

use core_kernel::{Currency, GroupId, Money, ParticipantId};
use domain_ledger::{LedgerAnomaly, SuggestedTransfer, Transaction};

/// One group's transaction history as exported from storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub group_id: GroupId,
    pub currency: Currency,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl LedgerSnapshot {
    pub fn from_reader(reader: impl Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}

/// Balances and settle-up plan for one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub group_id: GroupId,
    pub currency: Currency,
    /// Net balance per participant; positive means owed money
    pub balances: BTreeMap<ParticipantId, Money>,
    pub settle_up: Vec<SuggestedTransfer>,
    /// Records left out of the balances
    pub anomalies: Vec<LedgerAnomaly>,
}
