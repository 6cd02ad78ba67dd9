//! Ledger domain errors
//!
//! The engine never logs and never retries: every failure is returned as one
//! of these typed errors and the caller decides how to present it.

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{Currency, MoneyError, ParticipantId, TransactionId};

/// Errors raised while building a split policy or dividing an amount
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    /// A split was requested with zero participants
    #[error("Split requires at least one participant")]
    EmptyParticipantSet,

    /// Custom percentages are malformed or do not sum to 100
    #[error("Invalid split policy: {0}")]
    InvalidSplitPolicy(String),

    /// The amount to split is zero or negative
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// The same participant appears twice in one policy
    #[error("Participant listed more than once: {0}")]
    DuplicateParticipant(ParticipantId),

    /// Minor-unit arithmetic failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

/// Errors raised while constructing a transaction record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// The transaction amount is zero or negative
    #[error("Transaction amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// A settlement names the same participant as payer and recipient
    #[error("Settlement payer and recipient are the same participant: {0}")]
    SelfSettlement(ParticipantId),

    /// The expense could not be split
    #[error("Split error: {0}")]
    Split(#[from] SplitError),
}

/// Fatal structural problems found while folding transactions into a balance
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BalanceError {
    /// Persisted split lines of an expense do not sum to its amount
    #[error("Split integrity violation in {transaction_id}: splits sum to {actual}, expected {expected}")]
    SplitIntegrityViolation {
        transaction_id: TransactionId,
        expected: Decimal,
        actual: Decimal,
    },

    /// A settlement carries a zero or negative amount
    #[error("Settlement {transaction_id} has non-positive amount {amount}")]
    NonPositiveSettlement {
        transaction_id: TransactionId,
        amount: Decimal,
    },

    /// A transaction (or one of its lines) is not in the calculator's currency
    #[error("Transaction {transaction_id} is in {found}, expected {expected}")]
    CurrencyMismatch {
        transaction_id: TransactionId,
        expected: Currency,
        found: Currency,
    },

    /// Balances handed to the settle-up planner do not net to zero
    #[error("Group balances do not net to zero (residual {residual})")]
    UnbalancedGroup { residual: Decimal },

    /// Accumulation overflowed or otherwise failed
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl BalanceError {
    /// The transaction that caused the error, when there is one
    pub fn transaction_id(&self) -> Option<TransactionId> {
        match self {
            BalanceError::SplitIntegrityViolation { transaction_id, .. }
            | BalanceError::NonPositiveSettlement { transaction_id, .. }
            | BalanceError::CurrencyMismatch { transaction_id, .. } => Some(*transaction_id),
            BalanceError::UnbalancedGroup { .. } | BalanceError::Money(_) => None,
        }
    }
}
