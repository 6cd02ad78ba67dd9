//! Transaction store adapters

pub mod memory;

pub use memory::InMemoryTransactionStore;
