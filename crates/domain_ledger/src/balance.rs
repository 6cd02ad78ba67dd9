//! Balance calculator: folds transactions into signed balances
//!
//! Balances are derived state. They are recomputed from the full transaction
//! list on every call and never cached, so a balance can never drift from the
//! records it came from.
//!
//! # Sign convention
//!
//! Positive means the participant is owed money, negative means they owe.
//!
//! | Transaction | Subject is payer                 | Subject is other party     |
//! |-------------|----------------------------------|----------------------------|
//! | Expense     | `+(amount - own share)`          | `-own share`               |
//! | Settlement  | `+amount`                        | `-amount` (recipient)      |
//!
//! Settlements are the exact inverse of the expense rule, which is what
//! brings both sides of a fully repaid debt back to zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Currency, Money, MoneyError, ParticipantId, TransactionId};
use crate::error::BalanceError;
use crate::split::{self, SplitLine};
use crate::transaction::{Transaction, TransactionKind};

/// A record the calculator skips instead of failing on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// An expense with no split lines
    ExpenseWithoutSplits,
    /// A settlement whose payer is also its recipient
    SelfSettlement,
}

/// A skipped transaction, reported so the caller can log it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAnomaly {
    pub transaction_id: TransactionId,
    pub kind: AnomalyKind,
}

/// Net balance decomposed per counterparty
///
/// Entries are ordered by participant. A counterparty whose debts cancelled
/// out keeps a zero entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseBalances {
    currency: Currency,
    balances: BTreeMap<ParticipantId, Money>,
}

impl PairwiseBalances {
    fn new(currency: Currency) -> Self {
        Self {
            currency,
            balances: BTreeMap::new(),
        }
    }

    fn apply(&mut self, counterparty: ParticipantId, delta: Money) -> Result<(), MoneyError> {
        let entry = self
            .balances
            .entry(counterparty)
            .or_insert_with(|| Money::zero(delta.currency()));
        *entry = entry.checked_add(&delta)?;
        Ok(())
    }

    /// Balance with `counterparty`; zero when there is no shared history
    pub fn get(&self, counterparty: &ParticipantId) -> Money {
        self.balances
            .get(counterparty)
            .copied()
            .unwrap_or_else(|| Money::zero(self.currency))
    }

    /// All entries, ordered by participant
    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &Money)> {
        self.balances.iter()
    }

    /// Entries with a non-zero balance
    pub fn outstanding(&self) -> impl Iterator<Item = (&ParticipantId, &Money)> {
        self.balances.iter().filter(|(_, money)| !money.is_zero())
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum over all counterparties; equals the subject's net balance
    pub fn total(&self) -> Result<Money, MoneyError> {
        self.balances
            .values()
            .try_fold(Money::zero(self.currency), |acc, money| acc.checked_add(money))
    }

    pub fn into_inner(self) -> BTreeMap<ParticipantId, Money> {
        self.balances
    }
}

/// How one transaction touches the subject of a balance query
enum Involvement<'a> {
    Uninvolved,
    PaidExpense { own_share: Money, lines: &'a [SplitLine] },
    OwesExpense { payer: ParticipantId, own_share: Money },
    PaidSettlement { recipient: ParticipantId },
    ReceivedSettlement { payer: ParticipantId },
}

/// Derives balances from transaction history in one currency
///
/// The calculator holds no state beyond its currency and can be shared
/// freely across threads.
///
/// # Example
///
/// ```rust
/// use core_kernel::{Currency, Money, ParticipantId};
/// use domain_ledger::{BalanceCalculator, SplitPolicy, Transaction};
///
/// let (a, b) = (ParticipantId::new(), ParticipantId::new());
/// let dinner = Transaction::expense(
///     Money::from_minor(6000, Currency::USD),
///     a,
///     &SplitPolicy::equal(vec![a, b]).unwrap(),
/// ).unwrap();
///
/// let calculator = BalanceCalculator::new(Currency::USD);
/// let history = vec![dinner];
/// assert_eq!(calculator.net_balance(a, &history).unwrap().minor_units(), 3000);
/// assert_eq!(calculator.net_balance(b, &history).unwrap().minor_units(), -3000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceCalculator {
    currency: Currency,
}

impl BalanceCalculator {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Checks the structural rules whose violation makes a balance unreliable
    ///
    /// # Errors
    ///
    /// - `CurrencyMismatch` if the amount or a split line is in another currency
    /// - `NonPositiveSettlement` for a settlement of zero or less
    /// - `SplitIntegrityViolation` if an expense's lines do not sum to its amount
    pub fn validate(&self, transaction: &Transaction) -> Result<(), BalanceError> {
        self.ensure_currency(transaction.id, &transaction.amount)?;

        match &transaction.kind {
            TransactionKind::Settlement { .. } => {
                if !transaction.amount.is_positive() {
                    return Err(BalanceError::NonPositiveSettlement {
                        transaction_id: transaction.id,
                        amount: transaction.amount.amount(),
                    });
                }
            }
            TransactionKind::Expense { splits } => {
                if splits.is_empty() {
                    return Ok(());
                }
                for line in splits {
                    self.ensure_currency(transaction.id, &line.amount)?;
                }
                let total = split::total_of(splits, self.currency)?;
                if total != transaction.amount {
                    return Err(BalanceError::SplitIntegrityViolation {
                        transaction_id: transaction.id,
                        expected: transaction.amount.amount(),
                        actual: total.amount(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Lists the transactions every balance computation will skip
    pub fn anomalies(&self, transactions: &[Transaction]) -> Vec<LedgerAnomaly> {
        transactions
            .iter()
            .filter_map(|tx| {
                anomaly_kind(tx).map(|kind| LedgerAnomaly {
                    transaction_id: tx.id,
                    kind,
                })
            })
            .collect()
    }

    /// Net balance of `user` over `transactions`
    ///
    /// A user with no relevant history has a zero balance. Every transaction
    /// is validated, including ones that do not involve `user`.
    ///
    /// # Errors
    ///
    /// Any error from [`BalanceCalculator::validate`], or `Money(Overflow)`.
    pub fn net_balance(&self, user: ParticipantId, transactions: &[Transaction]) -> Result<Money, BalanceError> {
        let mut balance = Money::zero(self.currency);

        for tx in transactions {
            self.validate(tx)?;
            balance = match involvement(user, tx)? {
                Involvement::Uninvolved => balance,
                Involvement::PaidExpense { own_share, .. } => {
                    balance.checked_add(&tx.amount.checked_sub(&own_share)?)?
                }
                Involvement::OwesExpense { own_share, .. } => balance.checked_sub(&own_share)?,
                Involvement::PaidSettlement { .. } => balance.checked_add(&tx.amount)?,
                Involvement::ReceivedSettlement { .. } => balance.checked_sub(&tx.amount)?,
            };
        }

        Ok(balance)
    }

    /// Balance of `user` against each counterparty
    ///
    /// The entries always sum to [`BalanceCalculator::net_balance`].
    ///
    /// # Errors
    ///
    /// Same as [`BalanceCalculator::net_balance`].
    pub fn pairwise_balances(
        &self,
        user: ParticipantId,
        transactions: &[Transaction],
    ) -> Result<PairwiseBalances, BalanceError> {
        let mut pairwise = PairwiseBalances::new(self.currency);

        for tx in transactions {
            self.validate(tx)?;
            match involvement(user, tx)? {
                Involvement::Uninvolved => {}
                Involvement::PaidExpense { lines, .. } => {
                    for line in lines.iter().filter(|line| line.participant != user) {
                        pairwise.apply(line.participant, line.amount)?;
                    }
                }
                Involvement::OwesExpense { payer, own_share } => pairwise.apply(payer, -own_share)?,
                Involvement::PaidSettlement { recipient } => pairwise.apply(recipient, tx.amount)?,
                Involvement::ReceivedSettlement { payer } => pairwise.apply(payer, -tx.amount)?,
            }
        }

        Ok(pairwise)
    }

    /// Net balance of every participant that appears in `transactions`
    ///
    /// Equivalent to calling [`BalanceCalculator::net_balance`] per
    /// participant, in a single pass. The values always sum to zero.
    ///
    /// # Errors
    ///
    /// Same as [`BalanceCalculator::net_balance`].
    pub fn group_balances(&self, transactions: &[Transaction]) -> Result<BTreeMap<ParticipantId, Money>, BalanceError> {
        let mut balances: BTreeMap<ParticipantId, Money> = BTreeMap::new();
        let zero = Money::zero(self.currency);

        let mut apply = |who: ParticipantId, delta: Money| -> Result<(), MoneyError> {
            let entry = balances.entry(who).or_insert(zero);
            *entry = entry.checked_add(&delta)?;
            Ok(())
        };

        for tx in transactions {
            self.validate(tx)?;
            if anomaly_kind(tx).is_some() {
                continue;
            }
            match &tx.kind {
                TransactionKind::Expense { splits } => {
                    apply(tx.payer, tx.amount)?;
                    for line in splits {
                        apply(line.participant, -line.amount)?;
                    }
                }
                TransactionKind::Settlement { recipient } => {
                    apply(tx.payer, tx.amount)?;
                    apply(*recipient, -tx.amount)?;
                }
            }
        }

        Ok(balances)
    }

    fn ensure_currency(&self, transaction_id: TransactionId, money: &Money) -> Result<(), BalanceError> {
        if money.currency() != self.currency {
            return Err(BalanceError::CurrencyMismatch {
                transaction_id,
                expected: self.currency,
                found: money.currency(),
            });
        }
        Ok(())
    }
}

fn anomaly_kind(tx: &Transaction) -> Option<AnomalyKind> {
    match &tx.kind {
        TransactionKind::Expense { splits } if splits.is_empty() => Some(AnomalyKind::ExpenseWithoutSplits),
        TransactionKind::Settlement { recipient } if *recipient == tx.payer => Some(AnomalyKind::SelfSettlement),
        _ => None,
    }
}

fn involvement(user: ParticipantId, tx: &Transaction) -> Result<Involvement<'_>, MoneyError> {
    if anomaly_kind(tx).is_some() {
        return Ok(Involvement::Uninvolved);
    }

    match &tx.kind {
        TransactionKind::Settlement { recipient } => Ok(if tx.payer == user {
            Involvement::PaidSettlement { recipient: *recipient }
        } else if *recipient == user {
            Involvement::ReceivedSettlement { payer: tx.payer }
        } else {
            Involvement::Uninvolved
        }),
        TransactionKind::Expense { splits } => {
            let mut own_lines = splits.iter().filter(|line| line.participant == user).peekable();
            let holds_line = own_lines.peek().is_some();
            let own_share = own_lines.try_fold(Money::zero(tx.amount.currency()), |acc, line| {
                acc.checked_add(&line.amount)
            })?;

            Ok(if tx.payer == user {
                // A payer without a line of their own owes none of the expense
                Involvement::PaidExpense { own_share, lines: splits }
            } else if holds_line {
                Involvement::OwesExpense { payer: tx.payer, own_share }
            } else {
                Involvement::Uninvolved
            })
        }
    }
}
