//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for ledger types that give
//! more meaningful error messages than standard assertions.

use std::collections::BTreeMap;

use core_kernel::{Money, ParticipantId};
use domain_ledger::SplitLine;

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {}",
        money
    );
}

/// Asserts that money values sum to a total
///
/// # Panics
///
/// Panics if the currencies differ or the sum doesn't equal the total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = parts.iter().fold(Money::zero(total.currency()), |acc, m| {
        acc.checked_add(m).expect("Currency mismatch in sum")
    });

    assert_eq!(
        sum.minor_units(),
        total.minor_units(),
        "Sum of parts ({}) doesn't equal total ({})",
        sum,
        total
    );
}

/// Asserts that split lines cover `total` exactly and none is negative
pub fn assert_splits_cover(lines: &[SplitLine], total: &Money) {
    for line in lines {
        assert!(
            !line.amount.is_negative(),
            "Split line for {} is negative: {}",
            line.participant,
            line.amount
        );
    }
    let amounts: Vec<Money> = lines.iter().map(|line| line.amount).collect();
    assert_money_sum_equals(&amounts, total);
}

/// Asserts that exactly one line is flagged as the payer's, and that it belongs to `payer`
pub fn assert_single_payer_line(lines: &[SplitLine], payer: ParticipantId) {
    let flagged: Vec<&SplitLine> = lines.iter().filter(|line| line.is_payer).collect();
    assert_eq!(flagged.len(), 1, "Expected one payer line, found {}", flagged.len());
    assert_eq!(flagged[0].participant, payer, "Payer flag on the wrong participant");
}

/// Asserts that a set of group balances nets to zero
pub fn assert_balances_net_to_zero(balances: &BTreeMap<ParticipantId, Money>) {
    let net: i64 = balances.values().map(Money::minor_units).sum();
    assert_eq!(net, 0, "Group balances net to {} minor units: {:?}", net, balances);
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => panic!("{}: got Ok({:?})", $msg, value),
            Err(e) => e,
        }
    };
}

/// Asserts that an error matches a specific variant
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!("Expected Err matching {}, got Ok({:?})", stringify!($pattern), value),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "Error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}
