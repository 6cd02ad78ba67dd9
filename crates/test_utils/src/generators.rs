//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains ledger invariants.

use core_kernel::{Currency, Money, ParticipantId};
use domain_ledger::{PercentageShare, SplitPolicy, Transaction};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::JPY),
        Just(Currency::CHF),
    ]
}

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating positive Money values in any currency
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating positive USD amounts
pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::USD))
}

/// Strategy for generating `n` distinct participants for `n` in `range`
///
/// Ids are derived from their index so they are distinct and shrink well.
pub fn participants_strategy(range: std::ops::Range<usize>) -> impl Strategy<Value = Vec<ParticipantId>> {
    range.prop_map(|n| {
        (0..n)
            .map(|i| ParticipantId::from_uuid(Uuid::from_u128(i as u128 + 1)))
            .collect()
    })
}

/// Strategy for percentage vectors of length `len` that sum to exactly 100
///
/// Percentages carry two decimal places and may be zero.
pub fn percentages_strategy(len: usize) -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(0u32..10_000u32, len.saturating_sub(1)).prop_map(move |mut cuts| {
        // Sorted cut points over 0..=10000 hundredths partition 100%
        cuts.sort_unstable();
        let mut bounds = Vec::with_capacity(cuts.len() + 2);
        bounds.push(0u32);
        bounds.extend(cuts);
        bounds.push(10_000);
        bounds
            .windows(2)
            .map(|w| Decimal::new(i64::from(w[1] - w[0]), 2))
            .collect()
    })
}

/// Strategy for a valid custom split over participants drawn from `range`
pub fn custom_split_strategy(range: std::ops::Range<usize>) -> impl Strategy<Value = Vec<PercentageShare>> {
    participants_strategy(range).prop_flat_map(|participants| {
        let len = participants.len();
        percentages_strategy(len).prop_map(move |percentages| {
            participants
                .iter()
                .zip(percentages)
                .map(|(participant, percentage)| PercentageShare::new(*participant, percentage))
                .collect()
        })
    })
}

fn transaction_amount_strategy() -> impl Strategy<Value = Money> {
    (1i64..10_000_000i64).prop_map(|minor| Money::from_minor(minor, Currency::USD))
}

/// Strategy for a USD expense split evenly over a non-empty prefix of
/// `participants`
pub fn equal_expense_strategy(participants: Vec<ParticipantId>) -> BoxedStrategy<Transaction> {
    let n = participants.len().max(1);
    (0..n, 1..=n, transaction_amount_strategy())
        .prop_filter_map("needs participants", move |(payer, prefix, amount)| {
            let payer = *participants.get(payer)?;
            let policy = SplitPolicy::equal(participants.get(..prefix)?.to_vec()).ok()?;
            Transaction::expense(amount, payer, &policy).ok()
        })
        .boxed()
}

/// Strategy for a USD expense split by percentage over a suffix of
/// `participants`
///
/// The payer is drawn from all participants, so it may hold no line of its
/// own, and percentages may be zero.
pub fn custom_expense_strategy(participants: Vec<ParticipantId>) -> BoxedStrategy<Transaction> {
    let n = participants.len().max(1);
    (0..n, 0..n, transaction_amount_strategy())
        .prop_flat_map(move |(payer, skip, amount)| {
            (Just(payer), Just(skip), Just(amount), percentages_strategy(n - skip))
        })
        .prop_filter_map("needs participants", move |(payer, skip, amount, percentages)| {
            let payer = *participants.get(payer)?;
            let shares = participants
                .get(skip..)?
                .iter()
                .zip(percentages)
                .map(|(participant, percentage)| PercentageShare::new(*participant, percentage))
                .collect();
            let policy = SplitPolicy::custom(shares).ok()?;
            Transaction::expense(amount, payer, &policy).ok()
        })
        .boxed()
}

/// Strategy for a USD loan between two distinct participants
pub fn loan_strategy(participants: Vec<ParticipantId>) -> BoxedStrategy<Transaction> {
    let n = participants.len().max(1);
    (0..n, 0..n, transaction_amount_strategy())
        .prop_filter_map("loan needs two distinct participants", move |(lender, borrower, amount)| {
            Transaction::loan(amount, *participants.get(lender)?, *participants.get(borrower)?).ok()
        })
        .boxed()
}

/// Strategy for a USD settlement between two distinct participants
pub fn settlement_strategy(participants: Vec<ParticipantId>) -> BoxedStrategy<Transaction> {
    let n = participants.len().max(1);
    (0..n, 0..n, transaction_amount_strategy())
        .prop_filter_map("settlement needs two distinct participants", move |(payer, recipient, amount)| {
            Transaction::settlement(amount, *participants.get(payer)?, *participants.get(recipient)?).ok()
        })
        .boxed()
}

/// Strategy for any valid USD transaction among `participants`: equal or
/// custom expenses, loans and settlements
pub fn transaction_strategy(participants: Vec<ParticipantId>) -> impl Strategy<Value = Transaction> {
    prop_oneof![
        equal_expense_strategy(participants.clone()),
        custom_expense_strategy(participants.clone()),
        loan_strategy(participants.clone()),
        settlement_strategy(participants),
    ]
}

/// Strategy for a history of up to `max_len` transactions among `participants`
pub fn history_strategy(participants: Vec<ParticipantId>, max_len: usize) -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(transaction_strategy(participants), 0..max_len)
}
