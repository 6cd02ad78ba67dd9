//! Ports and Adapters Infrastructure
//!
//! Foundational types for the ports and adapters layout used by the ledger.
//! The split-and-balance engine itself performs no I/O; the only port is the
//! transaction store that feeds it, defined in `domain_ledger`.
//!
//! ```text
//!   LedgerService ──► TransactionStore (port) ◄── InMemoryTransactionStore
//!        │                                          (or a database adapter)
//!        ▼
//!   Splitter / BalanceCalculator (pure)
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// Every store adapter maps its failures onto these variants so callers
/// handle internal and external storage the same way.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}
