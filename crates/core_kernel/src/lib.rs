//! Core Kernel - Foundational types for the shared-expense ledger
//!
//! This crate provides the building blocks used by the ledger engine and its
//! boundary layer:
//! - Money held as exact integer minor units, with currency precision
//! - Exact distribution of minor units (even and percentage-driven)
//! - Strongly-typed identifiers for participants, groups and transactions
//! - Port error types shared by storage adapters

pub mod money;
pub mod distribution;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{ParticipantId, GroupId, TransactionId};
pub use ports::{PortError, DomainPort};
pub use error::CoreError;
