//! Ledger configuration
//!
//! Loaded from `LEDGER_*` environment variables on top of built-in defaults:
//!
//! * `LEDGER_CURRENCY` - currency balances are computed in (default: USD)
//! * `LEDGER_PERCENTAGE_TOLERANCE` - accepted distance of custom split
//!   percentages from 100, at most 0.01 (default: 0.01)
//! * `LEDGER_SKIP_CORRUPT_TRANSACTIONS` - exclude records that fail
//!   validation instead of failing the balance query (default: false)
//! * `LEDGER_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `LEDGER_LOG_JSON` - emit logs as JSON lines (default: false)
//! * `LEDGER_SNAPSHOT_PATH` - snapshot file read by `ledger-report`

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

use core_kernel::{CoreError, Currency};
use domain_ledger::PERCENTAGE_TOLERANCE;

use crate::error::ServiceError;

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerConfig {
    /// Currency of every balance
    pub currency: Currency,
    /// Tolerance for custom split percentages
    pub percentage_tolerance: Decimal,
    /// Degraded view: drop corrupt records rather than refuse the balance
    pub skip_corrupt_transactions: bool,
    /// Log level
    pub log_level: String,
    /// JSON log output
    pub log_json: bool,
    /// Snapshot file for the report binary
    pub snapshot_path: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency: Currency::USD,
            percentage_tolerance: PERCENTAGE_TOLERANCE,
            skip_corrupt_transactions: false,
            log_level: "info".to_string(),
            log_json: false,
            snapshot_path: None,
        }
    }
}

impl LedgerConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::with_prefix("LEDGER"))
    }

    /// Loads and validates configuration from the process environment
    pub fn load() -> Result<Self, ServiceError> {
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("currency", defaults.currency.code())?
            .set_default("percentage_tolerance", defaults.percentage_tolerance.to_string())?
            .set_default("skip_corrupt_transactions", defaults.skip_corrupt_transactions)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_json", defaults.log_json)?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Checks values the type system cannot
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.percentage_tolerance.is_sign_negative() || self.percentage_tolerance > PERCENTAGE_TOLERANCE {
            return Err(CoreError::configuration(format!(
                "percentage_tolerance must be within [0, {}], got {}",
                PERCENTAGE_TOLERANCE, self.percentage_tolerance
            )));
        }
        if self.log_level.trim().is_empty() {
            return Err(CoreError::configuration("log_level must not be empty"));
        }
        Ok(())
    }
}
