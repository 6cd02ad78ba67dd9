//! Test Data Builders
//!
//! Provides builder patterns for constructing transactions with sensible
//! defaults. Tests specify only the fields they care about.

use core_kernel::{Money, ParticipantId, TransactionId};
use domain_ledger::{PercentageShare, SplitLine, SplitPolicy, Transaction};
use rust_decimal::Decimal;

use crate::fixtures::{MoneyFixtures, ParticipantFixtures};

/// Builder for expense transactions
///
/// Defaults to Alice paying $100.00 split evenly between Alice and Bob.
pub struct TestExpenseBuilder {
    id: Option<TransactionId>,
    amount: Money,
    payer: ParticipantId,
    participants: Vec<ParticipantId>,
    percentages: Option<Vec<PercentageShare>>,
    raw_splits: Option<Vec<SplitLine>>,
    description: Option<String>,
}

impl Default for TestExpenseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestExpenseBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            amount: MoneyFixtures::usd_100(),
            payer: ParticipantFixtures::alice(),
            participants: vec![ParticipantFixtures::alice(), ParticipantFixtures::bob()],
            percentages: None,
            raw_splits: None,
            description: None,
        }
    }

    pub fn with_id(mut self, id: TransactionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn paid_by(mut self, payer: ParticipantId) -> Self {
        self.payer = payer;
        self
    }

    /// Splits evenly among `participants`
    pub fn split_evenly(mut self, participants: Vec<ParticipantId>) -> Self {
        self.participants = participants;
        self.percentages = None;
        self
    }

    /// Splits by percentage
    pub fn split_by(mut self, shares: Vec<(ParticipantId, Decimal)>) -> Self {
        self.percentages = Some(
            shares
                .into_iter()
                .map(|(participant, percentage)| PercentageShare::new(participant, percentage))
                .collect(),
        );
        self
    }

    /// Uses the given lines verbatim, bypassing the splitter
    ///
    /// Useful for building corrupted records.
    pub fn with_raw_splits(mut self, splits: Vec<SplitLine>) -> Self {
        self.raw_splits = Some(splits);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builds the transaction
    ///
    /// # Panics
    ///
    /// Panics if the configured policy cannot split the amount.
    pub fn build(self) -> Transaction {
        let id = self.id.unwrap_or_else(TransactionId::new_v7);

        let tx = match self.raw_splits {
            Some(splits) => Transaction::from_splits(id, self.amount, self.payer, splits),
            None => {
                let policy = match self.percentages {
                    Some(shares) => SplitPolicy::custom(shares),
                    None => SplitPolicy::equal(self.participants),
                }
                .expect("test split policy must be valid");

                Transaction::expense(self.amount, self.payer, &policy)
                    .expect("test expense must split")
                    .with_id(id)
            }
        };

        match self.description {
            Some(description) => tx.with_description(description),
            None => tx,
        }
    }
}

/// Builder for settlement transactions
///
/// Defaults to Bob paying Alice $30.00.
pub struct TestSettlementBuilder {
    amount: Money,
    payer: ParticipantId,
    recipient: ParticipantId,
}

impl Default for TestSettlementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSettlementBuilder {
    pub fn new() -> Self {
        Self {
            amount: MoneyFixtures::usd(3000),
            payer: ParticipantFixtures::bob(),
            recipient: ParticipantFixtures::alice(),
        }
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn from(mut self, payer: ParticipantId) -> Self {
        self.payer = payer;
        self
    }

    pub fn to(mut self, recipient: ParticipantId) -> Self {
        self.recipient = recipient;
        self
    }

    /// Builds the transaction
    ///
    /// # Panics
    ///
    /// Panics on a non-positive amount or a self-settlement.
    pub fn build(self) -> Transaction {
        Transaction::settlement(self.amount, self.payer, self.recipient).expect("test settlement must be valid")
    }
}
