//! In-memory transaction store
//!
//! Keeps each group's history in a `Vec` behind a `tokio::sync::RwLock`.
//! Used by the report binary (loaded from a JSON snapshot) and by tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use core_kernel::{DomainPort, GroupId, PortError, TransactionId};

use crate::ports::TransactionStore;
use crate::transaction::Transaction;

/// Transaction store backed by process memory
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransactionStore {
    groups: Arc<RwLock<HashMap<GroupId, Vec<Transaction>>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one group's history
    ///
    /// Records are kept as given, without validation, so corrupted
    /// histories can be loaded and inspected.
    pub fn with_transactions(group: GroupId, transactions: Vec<Transaction>) -> Self {
        let mut groups = HashMap::new();
        groups.insert(group, transactions);
        Self {
            groups: Arc::new(RwLock::new(groups)),
        }
    }

    /// Number of transactions stored for `group`
    pub async fn len(&self, group: GroupId) -> usize {
        self.groups.read().await.get(&group).map_or(0, Vec::len)
    }
}

impl DomainPort for InMemoryTransactionStore {}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn save(&self, group: GroupId, transaction: Transaction) -> Result<(), PortError> {
        let mut groups = self.groups.write().await;
        let history = groups.entry(group).or_default();

        if history.iter().any(|tx| tx.id == transaction.id) {
            return Err(PortError::conflict(format!(
                "Transaction {} already recorded in group {}",
                transaction.id, group
            )));
        }

        history.push(transaction);
        Ok(())
    }

    async fn list(&self, group: GroupId) -> Result<Vec<Transaction>, PortError> {
        Ok(self.groups.read().await.get(&group).cloned().unwrap_or_default())
    }

    async fn delete(&self, group: GroupId, id: TransactionId) -> Result<Transaction, PortError> {
        let mut groups = self.groups.write().await;
        let history = groups
            .get_mut(&group)
            .ok_or_else(|| PortError::not_found("Transaction", id))?;

        let position = history
            .iter()
            .position(|tx| tx.id == id)
            .ok_or_else(|| PortError::not_found("Transaction", id))?;

        Ok(history.remove(position))
    }
}
