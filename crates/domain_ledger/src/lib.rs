//! Ledger Domain - Split and Balance Engine
//!
//! This crate divides shared expenses among participants and derives who owes
//! whom from the resulting transaction history.
//!
//! # Components
//!
//! - **Splitter**: turns a total and a [`SplitPolicy`] into split lines whose
//!   minor units sum exactly to the total
//! - **Transactions**: expenses (carrying their split lines) and settlements
//! - **BalanceCalculator**: net, pairwise and group balances, always
//!   recomputed from history
//! - **Settle-up**: a greedy plan of transfers that clears a group's balances
//! - **TransactionStore**: the port the history is loaded through
//!
//! # Example
//!
//! ```rust
//! use core_kernel::{Currency, Money, ParticipantId};
//! use domain_ledger::{BalanceCalculator, SplitPolicy, Transaction};
//!
//! let (alice, bob) = (ParticipantId::new(), ParticipantId::new());
//! let usd = |minor| Money::from_minor(minor, Currency::USD);
//!
//! let history = vec![
//!     Transaction::expense(usd(6000), alice, &SplitPolicy::equal(vec![alice, bob]).unwrap()).unwrap(),
//!     Transaction::settlement(usd(3000), bob, alice).unwrap(),
//! ];
//!
//! let calculator = BalanceCalculator::new(Currency::USD);
//! assert!(calculator.net_balance(alice, &history).unwrap().is_zero());
//! ```

pub mod split;
pub mod transaction;
pub mod balance;
pub mod settle_up;
pub mod ports;
pub mod adapters;
pub mod error;

pub use split::{
    split, split_custom, split_equal, CustomSplit, EqualSplit, PercentageShare, SplitLine, SplitPolicy,
    PERCENTAGE_TOLERANCE,
};
pub use transaction::{Transaction, TransactionKind};
pub use balance::{AnomalyKind, BalanceCalculator, LedgerAnomaly, PairwiseBalances};
pub use settle_up::{settle_up, SuggestedTransfer};
pub use ports::{TransactionStore, TransactionStoreExt};
pub use adapters::InMemoryTransactionStore;
pub use error::{BalanceError, SplitError, TransactionError};
