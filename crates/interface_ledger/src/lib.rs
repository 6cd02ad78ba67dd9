//! Ledger Boundary Layer
//!
//! This crate connects the split and balance engine to storage, configuration
//! and logging.
//!
//! # Architecture
//!
//! - **Config**: `LEDGER_*` environment configuration with defaults
//! - **Service**: `LedgerService`, recording transactions and answering
//!   balance queries through a `TransactionStore`
//! - **Snapshot**: JSON import and report formats for `ledger-report`
//! - **Error Handling**: `ServiceError` wrapping engine, store and config errors
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_ledger::{LedgerConfig, LedgerService};
//! use domain_ledger::InMemoryTransactionStore;
//!
//! let service = LedgerService::new(InMemoryTransactionStore::new(), LedgerConfig::load()?);
//! let plan = service.settle_up(group).await?;
//! ```

pub mod config;
pub mod error;
pub mod service;
pub mod snapshot;

pub use config::LedgerConfig;
pub use error::ServiceError;
pub use service::LedgerService;
pub use snapshot::{GroupReport, LedgerSnapshot};
