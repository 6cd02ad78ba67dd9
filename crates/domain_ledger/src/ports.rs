//! Ledger Domain Ports
//!
//! The balance calculator works on a plain slice of transactions and does no
//! I/O. Loading that slice, and persisting newly recorded transactions, goes
//! through the `TransactionStore` port so the storage backend can be swapped
//! without touching the engine.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_ledger::ports::TransactionStore;
//! use std::sync::Arc;
//!
//! pub struct Reporter {
//!     store: Arc<dyn TransactionStore>,
//! }
//!
//! impl Reporter {
//!     pub async fn balance(&self, group: GroupId, user: ParticipantId) -> Result<Money, ServiceError> {
//!         let history = self.store.list(group).await?;
//!         Ok(BalanceCalculator::new(Currency::USD).net_balance(user, &history)?)
//!     }
//! }
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, GroupId, PortError, TransactionId};

use crate::transaction::Transaction;

/// Persistent transaction history, partitioned by group
#[async_trait]
pub trait TransactionStore: DomainPort {
    /// Appends a transaction to a group's history
    ///
    /// # Returns
    ///
    /// `PortError::Conflict` if a transaction with the same id is already
    /// stored in the group.
    async fn save(&self, group: GroupId, transaction: Transaction) -> Result<(), PortError>;

    /// All transactions of a group, in the order they were saved
    ///
    /// An unknown group has an empty history.
    async fn list(&self, group: GroupId) -> Result<Vec<Transaction>, PortError>;

    /// Removes a transaction and returns it
    ///
    /// # Returns
    ///
    /// `PortError::NotFound` if the group holds no such transaction.
    async fn delete(&self, group: GroupId, id: TransactionId) -> Result<Transaction, PortError>;
}

/// Convenience methods built on top of `TransactionStore`
#[async_trait]
pub trait TransactionStoreExt: TransactionStore {
    /// Fetches one transaction or returns `PortError::NotFound`
    async fn get(&self, group: GroupId, id: TransactionId) -> Result<Transaction, PortError> {
        self.list(group)
            .await?
            .into_iter()
            .find(|tx| tx.id == id)
            .ok_or_else(|| PortError::not_found("Transaction", id))
    }
}

impl<T: TransactionStore + ?Sized> TransactionStoreExt for T {}
