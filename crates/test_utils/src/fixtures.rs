//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the ledger.
//! Participant ids are fixed so that their ordering, and therefore the order
//! of any per-participant map, is the same on every run.

use core_kernel::{Currency, Money, ParticipantId};
use domain_ledger::{SplitPolicy, Transaction};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for participant identifiers
///
/// `alice() < bob() < carol() < dave()` under the identifier ordering.
pub struct ParticipantFixtures;

impl ParticipantFixtures {
    pub fn alice() -> ParticipantId {
        ParticipantId::from_uuid(Uuid::from_u128(0xA11CE))
    }

    pub fn bob() -> ParticipantId {
        ParticipantId::from_uuid(Uuid::from_u128(0xB0B00))
    }

    pub fn carol() -> ParticipantId {
        ParticipantId::from_uuid(Uuid::from_u128(0xCA201))
    }

    pub fn dave() -> ParticipantId {
        ParticipantId::from_uuid(Uuid::from_u128(0xDA7E0))
    }

    /// Alice, Bob and Carol, in id order
    pub fn trio() -> Vec<ParticipantId> {
        vec![Self::alice(), Self::bob(), Self::carol()]
    }
}

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Builds a USD amount from cents
    pub fn usd(cents: i64) -> Money {
        Money::from_minor(cents, Currency::USD)
    }

    /// $100.00
    pub fn usd_100() -> Money {
        Self::usd(10000)
    }

    /// $60.00, the shared dinner
    pub fn usd_dinner() -> Money {
        Self::usd(6000)
    }

    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// Creates a EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR).expect("valid EUR amount")
    }

    /// Creates a JPY amount (zero decimal places)
    pub fn jpy_1000() -> Money {
        Money::from_minor(1000, Currency::JPY)
    }
}

/// Canned transaction histories
pub struct HistoryFixtures;

impl HistoryFixtures {
    /// Alice pays $60 dinner split evenly with Bob
    pub fn dinner() -> Vec<Transaction> {
        let (alice, bob) = (ParticipantFixtures::alice(), ParticipantFixtures::bob());
        let policy = SplitPolicy::equal(vec![alice, bob]).expect("two distinct participants");
        vec![Transaction::expense(MoneyFixtures::usd_dinner(), alice, &policy)
            .expect("valid dinner expense")
            .with_description("Dinner")]
    }

    /// Dinner followed by Bob paying Alice back in full
    pub fn dinner_settled() -> Vec<Transaction> {
        let mut history = Self::dinner();
        history.push(
            Transaction::settlement(MoneyFixtures::usd(3000), ParticipantFixtures::bob(), ParticipantFixtures::alice())
                .expect("valid settlement")
                .with_description("Dinner payback"),
        );
        history
    }

    /// A weekend trip among Alice, Bob and Carol
    ///
    /// - Alice pays $300 lodging, split evenly
    /// - Bob pays $90 groceries, 50/25/25 between Bob, Alice and Carol
    /// - Carol lends Bob $20
    /// - Bob pays Alice $50
    pub fn weekend_trip() -> Vec<Transaction> {
        let [alice, bob, carol] = [
            ParticipantFixtures::alice(),
            ParticipantFixtures::bob(),
            ParticipantFixtures::carol(),
        ];

        let lodging = SplitPolicy::equal(ParticipantFixtures::trio()).expect("distinct trio");
        let groceries = SplitPolicy::custom(vec![
            domain_ledger::PercentageShare::new(bob, dec!(50)),
            domain_ledger::PercentageShare::new(alice, dec!(25)),
            domain_ledger::PercentageShare::new(carol, dec!(25)),
        ])
        .expect("percentages sum to 100");

        vec![
            Transaction::expense(MoneyFixtures::usd(30000), alice, &lodging).expect("lodging"),
            Transaction::expense(MoneyFixtures::usd(9000), bob, &groceries).expect("groceries"),
            Transaction::loan(MoneyFixtures::usd(2000), carol, bob).expect("loan"),
            Transaction::settlement(MoneyFixtures::usd(5000), bob, alice).expect("settlement"),
        ]
    }
}
