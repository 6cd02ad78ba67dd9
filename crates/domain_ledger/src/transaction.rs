//! Transaction records consumed by the balance calculator
//!
//! A transaction is either an expense (with the split lines produced when it
//! was recorded) or a settlement between exactly two participants. Records
//! are never mutated: editing an expense means deleting it and recording a
//! new one.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, ParticipantId, TransactionId};
use crate::error::TransactionError;
use crate::split::{self, CustomSplit, PercentageShare, SplitLine, SplitPolicy};

/// What a transaction records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    /// Shared spending; `splits` says who owes what
    Expense { splits: Vec<SplitLine> },
    /// Direct payment from the payer to `recipient`
    Settlement { recipient: ParticipantId },
}

/// A ledger entry as loaded from storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: TransactionId,
    /// Full amount of the expense or settlement
    pub amount: Money,
    /// Who paid
    pub payer: ParticipantId,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: TransactionKind,
}

impl Transaction {
    /// Records an expense, splitting `amount` according to `policy`
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Split` if the policy cannot split the amount
    /// (including a non-positive amount).
    pub fn expense(amount: Money, payer: ParticipantId, policy: &SplitPolicy) -> Result<Self, TransactionError> {
        let splits = split::split(amount, policy, payer)?;
        Ok(Self::from_splits(TransactionId::new_v7(), amount, payer, splits))
    }

    /// Rebuilds an expense from persisted split lines
    ///
    /// No validation happens here; the balance calculator checks the lines
    /// when it folds the record.
    pub fn from_splits(id: TransactionId, amount: Money, payer: ParticipantId, splits: Vec<SplitLine>) -> Self {
        Self {
            id,
            amount,
            payer,
            description: None,
            kind: TransactionKind::Expense { splits },
        }
    }

    /// Records a loan: the lender pays and the borrower owes all of it
    ///
    /// Stored as an expense split 100% to the borrower, with a 0% line for
    /// the lender.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Split` for a non-positive amount or when
    /// lender and borrower are the same participant.
    pub fn loan(amount: Money, lender: ParticipantId, borrower: ParticipantId) -> Result<Self, TransactionError> {
        let policy = SplitPolicy::Custom(CustomSplit::new(vec![
            PercentageShare::new(borrower, dec!(100)),
            PercentageShare::new(lender, dec!(0)),
        ])?);
        Self::expense(amount, lender, &policy)
    }

    /// Records a settlement from `payer` to `recipient`
    ///
    /// # Errors
    ///
    /// - `NonPositiveAmount` if `amount` is zero or negative
    /// - `SelfSettlement` if `payer` and `recipient` are the same
    pub fn settlement(amount: Money, payer: ParticipantId, recipient: ParticipantId) -> Result<Self, TransactionError> {
        if !amount.is_positive() {
            return Err(TransactionError::NonPositiveAmount(amount.amount()));
        }
        if payer == recipient {
            return Err(TransactionError::SelfSettlement(payer));
        }

        Ok(Self {
            id: TransactionId::new_v7(),
            amount,
            payer,
            description: None,
            kind: TransactionKind::Settlement { recipient },
        })
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the generated identifier
    pub fn with_id(mut self, id: TransactionId) -> Self {
        self.id = id;
        self
    }

    pub fn is_expense(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense { .. })
    }

    pub fn is_settlement(&self) -> bool {
        matches!(self.kind, TransactionKind::Settlement { .. })
    }

    /// Split lines of an expense; empty for settlements
    pub fn splits(&self) -> &[SplitLine] {
        match &self.kind {
            TransactionKind::Expense { splits } => splits,
            TransactionKind::Settlement { .. } => &[],
        }
    }

    /// Recipient of a settlement
    pub fn recipient(&self) -> Option<ParticipantId> {
        match self.kind {
            TransactionKind::Settlement { recipient } => Some(recipient),
            TransactionKind::Expense { .. } => None,
        }
    }

    /// Returns true if `participant` paid, received, or holds a split line
    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.payer == participant
            || self.recipient() == Some(participant)
            || self.splits().iter().any(|line| line.participant == participant)
    }
}
