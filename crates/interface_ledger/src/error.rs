//! Service error handling

use thiserror::Error;

use core_kernel::{CoreError, Currency, PortError};
use domain_ledger::{BalanceError, SplitError, TransactionError};

/// Errors surfaced by the ledger service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Split error: {0}")]
    Split(#[from] SplitError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Balance error: {0}")]
    Balance(#[from] BalanceError),

    #[error("Store error: {0}")]
    Store(#[from] PortError),

    #[error("Amount is in {found}, ledger is configured for {expected}")]
    CurrencyMismatch { expected: Currency, found: Currency },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ServiceError {
    /// True when persisted data failed a structural check
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            ServiceError::Balance(
                BalanceError::SplitIntegrityViolation { .. }
                    | BalanceError::NonPositiveSettlement { .. }
                    | BalanceError::CurrencyMismatch { .. }
            )
        )
    }

    /// True when the caller supplied invalid input
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ServiceError::Split(_) | ServiceError::Transaction(_) | ServiceError::CurrencyMismatch { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Store(err) if err.is_not_found())
    }
}
