//! Ledger application service
//!
//! Wires the pure split and balance engine to a `TransactionStore`. This is
//! the only layer that logs: anomalies the engine skips are reported with
//! `warn!`, structural violations with `error!`.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use core_kernel::{GroupId, Money, ParticipantId, TransactionId};
use domain_ledger::{
    settle_up, BalanceCalculator, BalanceError, CustomSplit, PairwiseBalances, PercentageShare, SplitError,
    SplitPolicy, SuggestedTransfer, Transaction, TransactionStore,
};

use crate::config::LedgerConfig;
use crate::error::ServiceError;
use crate::snapshot::GroupReport;

/// Records transactions and answers balance queries for groups
pub struct LedgerService<S: TransactionStore> {
    store: Arc<S>,
    config: LedgerConfig,
    calculator: BalanceCalculator,
}

impl<S: TransactionStore> Clone for LedgerService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            calculator: self.calculator,
        }
    }
}

impl<S: TransactionStore> LedgerService<S> {
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self::with_shared_store(Arc::new(store), config)
    }

    pub fn with_shared_store(store: Arc<S>, config: LedgerConfig) -> Self {
        let calculator = BalanceCalculator::new(config.currency);
        Self {
            store,
            config,
            calculator,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Builds a custom split policy with the configured tolerance
    pub fn custom_policy(&self, shares: Vec<PercentageShare>) -> Result<SplitPolicy, SplitError> {
        Ok(SplitPolicy::Custom(CustomSplit::with_tolerance(
            shares,
            self.config.percentage_tolerance,
        )?))
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Splits and records an expense
    #[instrument(skip(self, policy, description), fields(group = %group, payer = %payer, amount = %amount))]
    pub async fn record_expense(
        &self,
        group: GroupId,
        amount: Money,
        payer: ParticipantId,
        policy: &SplitPolicy,
        description: Option<String>,
    ) -> Result<Transaction, ServiceError> {
        self.ensure_currency(&amount)?;
        let tx = Transaction::expense(amount, payer, policy)?;
        let tx = match description {
            Some(description) => tx.with_description(description),
            None => tx,
        };

        self.store.save(group, tx.clone()).await?;
        info!(transaction_id = %tx.id, lines = tx.splits().len(), "Expense recorded");
        Ok(tx)
    }

    /// Records a loan from `lender` to `borrower`
    #[instrument(skip(self), fields(group = %group, lender = %lender, borrower = %borrower, amount = %amount))]
    pub async fn record_loan(
        &self,
        group: GroupId,
        amount: Money,
        lender: ParticipantId,
        borrower: ParticipantId,
    ) -> Result<Transaction, ServiceError> {
        self.ensure_currency(&amount)?;
        let tx = Transaction::loan(amount, lender, borrower)?;

        self.store.save(group, tx.clone()).await?;
        info!(transaction_id = %tx.id, "Loan recorded");
        Ok(tx)
    }

    /// Records a direct payment from `payer` to `recipient`
    #[instrument(skip(self), fields(group = %group, payer = %payer, recipient = %recipient, amount = %amount))]
    pub async fn record_settlement(
        &self,
        group: GroupId,
        amount: Money,
        payer: ParticipantId,
        recipient: ParticipantId,
    ) -> Result<Transaction, ServiceError> {
        self.ensure_currency(&amount)?;
        let tx = Transaction::settlement(amount, payer, recipient)?;

        self.store.save(group, tx.clone()).await?;
        info!(transaction_id = %tx.id, "Settlement recorded");
        Ok(tx)
    }

    /// Removes a transaction; editing is void followed by a new record
    #[instrument(skip(self), fields(group = %group, transaction_id = %id))]
    pub async fn void_transaction(&self, group: GroupId, id: TransactionId) -> Result<Transaction, ServiceError> {
        let tx = self.store.delete(group, id).await?;
        info!("Transaction voided");
        Ok(tx)
    }

    /// Raw history of a group, in recording order
    pub async fn history(&self, group: GroupId) -> Result<Vec<Transaction>, ServiceError> {
        Ok(self.store.list(group).await?)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[instrument(skip(self), fields(group = %group, user = %user))]
    pub async fn net_balance(&self, group: GroupId, user: ParticipantId) -> Result<Money, ServiceError> {
        let history = self.load_history(group).await?;
        self.report_failure(self.calculator.net_balance(user, &history))
    }

    #[instrument(skip(self), fields(group = %group, user = %user))]
    pub async fn pairwise_balances(
        &self,
        group: GroupId,
        user: ParticipantId,
    ) -> Result<PairwiseBalances, ServiceError> {
        let history = self.load_history(group).await?;
        self.report_failure(self.calculator.pairwise_balances(user, &history))
    }

    #[instrument(skip(self), fields(group = %group))]
    pub async fn group_balances(&self, group: GroupId) -> Result<BTreeMap<ParticipantId, Money>, ServiceError> {
        let history = self.load_history(group).await?;
        self.report_failure(self.calculator.group_balances(&history))
    }

    #[instrument(skip(self), fields(group = %group))]
    pub async fn settle_up(&self, group: GroupId) -> Result<Vec<SuggestedTransfer>, ServiceError> {
        let balances = self.group_balances(group).await?;
        let plan = self.report_failure(settle_up(&balances))?;
        debug!(transfers = plan.len(), "Settle-up planned");
        Ok(plan)
    }

    /// Balances, settle-up plan and anomalies in one pass over the history
    #[instrument(skip(self), fields(group = %group))]
    pub async fn report(&self, group: GroupId) -> Result<GroupReport, ServiceError> {
        let history = self.load_history(group).await?;
        let balances = self.report_failure(self.calculator.group_balances(&history))?;
        let plan = self.report_failure(settle_up(&balances))?;

        Ok(GroupReport {
            group_id: group,
            currency: self.calculator.currency(),
            balances,
            settle_up: plan,
            anomalies: self.calculator.anomalies(&history),
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn ensure_currency(&self, amount: &Money) -> Result<(), ServiceError> {
        if amount.currency() != self.config.currency {
            return Err(ServiceError::CurrencyMismatch {
                expected: self.config.currency,
                found: amount.currency(),
            });
        }
        Ok(())
    }

    /// Loads a group's history, logging skipped records and applying the
    /// corrupt-record policy
    async fn load_history(&self, group: GroupId) -> Result<Vec<Transaction>, ServiceError> {
        let history = self.store.list(group).await?;
        debug!(transactions = history.len(), "History loaded");

        for anomaly in self.calculator.anomalies(&history) {
            warn!(
                transaction_id = %anomaly.transaction_id,
                kind = ?anomaly.kind,
                "Skipping anomalous transaction"
            );
        }

        if !self.config.skip_corrupt_transactions {
            return Ok(history);
        }

        Ok(history
            .into_iter()
            .filter(|tx| match self.calculator.validate(tx) {
                Ok(()) => true,
                Err(err) => {
                    error!(transaction_id = %tx.id, error = %err, "Excluding corrupt transaction from balances");
                    false
                }
            })
            .collect())
    }

    fn report_failure<T>(&self, result: Result<T, BalanceError>) -> Result<T, ServiceError> {
        result.map_err(|err| {
            match err.transaction_id() {
                Some(transaction_id) => error!(%transaction_id, error = %err, "Balance computation failed"),
                None => error!(error = %err, "Balance computation failed"),
            }
            ServiceError::from(err)
        })
    }
}
