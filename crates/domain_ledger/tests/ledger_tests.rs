//! Tests for domain_ledger
//!
//! Worked scenarios first, then property tests for the splitting and
//! balance invariants.

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, ParticipantId, TransactionId};
use domain_ledger::{
    settle_up, split_custom, split_equal, AnomalyKind, BalanceCalculator, BalanceError, PercentageShare,
    SplitError, SplitLine, SplitPolicy, Transaction,
};
use test_utils::{
    assert_balances_net_to_zero, assert_err, assert_err_variant, assert_money_zero, assert_ok, assert_single_payer_line,
    assert_splits_cover, currency_strategy, custom_split_strategy, history_strategy, participants_strategy,
    positive_money_strategy, usd_money_strategy,
    HistoryFixtures, MoneyFixtures, ParticipantFixtures, TestExpenseBuilder, TestSettlementBuilder,
};

fn usd_calculator() -> BalanceCalculator {
    BalanceCalculator::new(Currency::USD)
}

// ============================================================================
// Worked scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn test_equal_split_of_100_among_three() {
        let [a, b, c] = [ParticipantFixtures::alice(), ParticipantFixtures::bob(), ParticipantFixtures::carol()];
        let total = MoneyFixtures::usd_100();

        let lines = assert_ok!(split_equal(total, &[a, b, c], a));

        let amounts: Vec<Decimal> = lines.iter().map(|l| l.amount.amount()).collect();
        assert_eq!(amounts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
        assert_eq!(lines[0].participant, a);
        assert_splits_cover(&lines, &total);
        assert_single_payer_line(&lines, a);
    }

    #[test]
    fn test_custom_split_thirds_sums_exactly() {
        let [a, b, c] = [ParticipantFixtures::alice(), ParticipantFixtures::bob(), ParticipantFixtures::carol()];
        let total = MoneyFixtures::usd_100();
        let shares = vec![
            PercentageShare::new(a, dec!(33.33)),
            PercentageShare::new(b, dec!(33.33)),
            PercentageShare::new(c, dec!(33.34)),
        ];

        let lines = assert_ok!(split_custom(total, &shares, a));

        assert_splits_cover(&lines, &total);
        assert_eq!(lines[2].percentage, Some(dec!(33.34)));
    }

    #[test]
    fn test_dinner_leaves_payer_owed_half() {
        let history = HistoryFixtures::dinner();
        let calculator = usd_calculator();

        let alice = assert_ok!(calculator.net_balance(ParticipantFixtures::alice(), &history));
        let bob = assert_ok!(calculator.net_balance(ParticipantFixtures::bob(), &history));

        assert_eq!(alice.amount(), dec!(30.00));
        assert_eq!(bob.amount(), dec!(-30.00));
    }

    #[test]
    fn test_settlement_clears_dinner() {
        let history = HistoryFixtures::dinner_settled();
        let calculator = usd_calculator();

        assert_money_zero(&assert_ok!(calculator.net_balance(ParticipantFixtures::alice(), &history)));
        assert_money_zero(&assert_ok!(calculator.net_balance(ParticipantFixtures::bob(), &history)));
    }

    #[test]
    fn test_corrupted_splits_surface_integrity_violation() {
        let (a, b) = (ParticipantFixtures::alice(), ParticipantFixtures::bob());
        let corrupted = TestExpenseBuilder::new()
            .with_amount(MoneyFixtures::usd_100())
            .with_raw_splits(vec![
                SplitLine::new(a, MoneyFixtures::usd(5000), true),
                SplitLine::new(b, MoneyFixtures::usd(4999), false),
            ])
            .build();

        let result = usd_calculator().net_balance(a, &[corrupted]);
        assert_err_variant!(result, BalanceError::SplitIntegrityViolation { .. });
    }
}

// ============================================================================
// Splitter edge cases
// ============================================================================

mod splitting {
    use super::*;

    #[test]
    fn test_payer_outside_participants_joins_equal_split() {
        let [a, b, c] = [ParticipantFixtures::alice(), ParticipantFixtures::bob(), ParticipantFixtures::carol()];

        let lines = assert_ok!(split_equal(MoneyFixtures::usd(9000), &[b, c], a));

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].participant, a);
        assert!(lines.iter().all(|l| l.amount == MoneyFixtures::usd(3000)));
    }

    #[test]
    fn test_custom_split_without_payer_line() {
        let [a, b, c] = [ParticipantFixtures::alice(), ParticipantFixtures::bob(), ParticipantFixtures::carol()];
        let shares = vec![PercentageShare::new(b, dec!(60)), PercentageShare::new(c, dec!(40))];

        let lines = assert_ok!(split_custom(MoneyFixtures::usd(1000), &shares, a));

        assert!(lines.iter().all(|l| !l.is_payer));
        assert_eq!(lines[0].amount, MoneyFixtures::usd(600));
    }

    #[test]
    fn test_percentages_off_by_more_than_tolerance_rejected() {
        let (a, b) = (ParticipantFixtures::alice(), ParticipantFixtures::bob());
        let result = SplitPolicy::custom(vec![PercentageShare::new(a, dec!(50)), PercentageShare::new(b, dec!(49.98))]);
        assert_err_variant!(result, SplitError::InvalidSplitPolicy(_));
    }

    #[test]
    fn test_empty_equal_split_rejected() {
        let result = split_equal(MoneyFixtures::usd(100), &[], ParticipantFixtures::alice());
        assert_err_variant!(result, SplitError::EmptyParticipantSet);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let a = ParticipantFixtures::alice();
        let result = split_equal(MoneyFixtures::usd_zero(), &[a], a);
        assert_err_variant!(result, SplitError::NonPositiveAmount(_));
    }

    #[test]
    fn test_jpy_splits_in_whole_yen() {
        let [a, b, c] = [ParticipantFixtures::alice(), ParticipantFixtures::bob(), ParticipantFixtures::carol()];
        let lines = assert_ok!(split_equal(MoneyFixtures::jpy_1000(), &[a, b, c], a));

        let yen: Vec<i64> = lines.iter().map(|l| l.amount.minor_units()).collect();
        assert_eq!(yen, vec![334, 333, 333]);
    }
}

// ============================================================================
// Balances over a multi-party history
// ============================================================================

mod balances {
    use super::*;

    #[test]
    fn test_weekend_trip_group_balances() {
        let history = HistoryFixtures::weekend_trip();
        let [a, b, c] = [ParticipantFixtures::alice(), ParticipantFixtures::bob(), ParticipantFixtures::carol()];

        let group = assert_ok!(usd_calculator().group_balances(&history));

        assert_eq!(group[&a], MoneyFixtures::usd(12750));
        assert_eq!(group[&b], MoneyFixtures::usd(-2500));
        assert_eq!(group[&c], MoneyFixtures::usd(-10250));
        assert_balances_net_to_zero(&group);
    }

    #[test]
    fn test_weekend_trip_pairwise_for_alice() {
        let history = HistoryFixtures::weekend_trip();
        let alice = ParticipantFixtures::alice();
        let calculator = usd_calculator();

        let pairwise = assert_ok!(calculator.pairwise_balances(alice, &history));

        assert_eq!(pairwise.get(&ParticipantFixtures::bob()), MoneyFixtures::usd(2750));
        assert_eq!(pairwise.get(&ParticipantFixtures::carol()), MoneyFixtures::usd(10000));
        assert_eq!(assert_ok!(pairwise.total()), assert_ok!(calculator.net_balance(alice, &history)));
    }

    #[test]
    fn test_weekend_trip_settle_up_plan() {
        let history = HistoryFixtures::weekend_trip();
        let group = assert_ok!(usd_calculator().group_balances(&history));

        let plan = assert_ok!(settle_up(&group));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].from, ParticipantFixtures::carol());
        assert_eq!(plan[0].to, ParticipantFixtures::alice());
        assert_eq!(plan[0].amount, MoneyFixtures::usd(10250));
        assert_eq!(plan[1].from, ParticipantFixtures::bob());
        assert_eq!(plan[1].amount, MoneyFixtures::usd(2500));
    }

    #[test]
    fn test_loan_borrower_owes_full_amount() {
        let (lender, borrower) = (ParticipantFixtures::carol(), ParticipantFixtures::bob());
        let history = vec![assert_ok!(Transaction::loan(MoneyFixtures::usd(2000), lender, borrower))];
        let calculator = usd_calculator();

        assert_eq!(assert_ok!(calculator.net_balance(lender, &history)), MoneyFixtures::usd(2000));
        assert_eq!(assert_ok!(calculator.net_balance(borrower, &history)), MoneyFixtures::usd(-2000));
    }

    #[test]
    fn test_anomalies_are_skipped_not_fatal() {
        let (a, b) = (ParticipantFixtures::alice(), ParticipantFixtures::bob());
        let mut history = HistoryFixtures::dinner();
        let empty = TestExpenseBuilder::new().with_raw_splits(vec![]).build();
        history.push(empty.clone());

        let calculator = usd_calculator();
        assert_eq!(assert_ok!(calculator.net_balance(a, &history)), MoneyFixtures::usd(3000));
        assert_eq!(assert_ok!(calculator.net_balance(b, &history)), MoneyFixtures::usd(-3000));

        let anomalies = calculator.anomalies(&history);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].transaction_id, empty.id);
        assert_eq!(anomalies[0].kind, AnomalyKind::ExpenseWithoutSplits);
    }

    #[test]
    fn test_fatal_error_anywhere_in_history_fails_the_query() {
        let corrupted = TestExpenseBuilder::new()
            .paid_by(ParticipantFixtures::carol())
            .with_raw_splits(vec![SplitLine::new(ParticipantFixtures::dave(), MoneyFixtures::usd(1), false)])
            .build();
        let mut history = HistoryFixtures::dinner();
        history.push(corrupted.clone());

        let err = assert_err!(usd_calculator().net_balance(ParticipantFixtures::alice(), &history));
        assert_eq!(err.transaction_id(), Some(corrupted.id));
    }

    #[test]
    fn test_currency_mismatch_in_line() {
        let a = ParticipantFixtures::alice();
        let tx = Transaction::from_splits(
            TransactionId::new(),
            MoneyFixtures::usd(100),
            a,
            vec![SplitLine::new(a, Money::from_minor(100, Currency::EUR), true)],
        );

        let result = usd_calculator().net_balance(a, &[tx]);
        assert_err_variant!(result, BalanceError::CurrencyMismatch { found: Currency::EUR, .. });
    }

    #[test]
    fn test_settlement_builder_mirrors_balance() {
        let settlement = TestSettlementBuilder::new()
            .from(ParticipantFixtures::carol())
            .to(ParticipantFixtures::dave())
            .with_amount(MoneyFixtures::usd(1234))
            .build();
        let calculator = usd_calculator();

        let history = [settlement];
        assert_eq!(assert_ok!(calculator.net_balance(ParticipantFixtures::carol(), &history)), MoneyFixtures::usd(1234));
        assert_eq!(assert_ok!(calculator.net_balance(ParticipantFixtures::dave(), &history)), MoneyFixtures::usd(-1234));
    }
}

// ============================================================================
// Property tests
// ============================================================================

mod properties {
    use super::*;

    fn apply_transfers(
        mut balances: BTreeMap<ParticipantId, Money>,
        plan: &[domain_ledger::SuggestedTransfer],
    ) -> BTreeMap<ParticipantId, Money> {
        for transfer in plan {
            let from = balances[&transfer.from].checked_add(&transfer.amount).unwrap();
            let to = balances[&transfer.to].checked_sub(&transfer.amount).unwrap();
            balances.insert(transfer.from, from);
            balances.insert(transfer.to, to);
        }
        balances
    }

    proptest! {
        #[test]
        fn equal_split_sums_exactly(total in usd_money_strategy(), participants in participants_strategy(1..40)) {
            let lines = split_equal(total, &participants, participants[0]).unwrap();
            let sum: i64 = lines.iter().map(|l| l.amount.minor_units()).sum();
            prop_assert_eq!(sum, total.minor_units());
            prop_assert!(lines.iter().all(|l| !l.amount.is_negative()));
        }

        #[test]
        fn equal_split_shares_differ_by_at_most_one_unit(
            total in usd_money_strategy(),
            participants in participants_strategy(1..40),
        ) {
            let lines = split_equal(total, &participants, participants[0]).unwrap();
            let max = lines.iter().map(|l| l.amount.minor_units()).max().unwrap();
            let min = lines.iter().map(|l| l.amount.minor_units()).min().unwrap();
            prop_assert!(max - min <= 1);
        }

        #[test]
        fn custom_split_sums_exactly(total in usd_money_strategy(), shares in custom_split_strategy(1..12)) {
            let lines = split_custom(total, &shares, shares[0].participant).unwrap();
            let sum: i64 = lines.iter().map(|l| l.amount.minor_units()).sum();
            prop_assert_eq!(sum, total.minor_units());
            prop_assert!(lines.iter().all(|l| !l.amount.is_negative()));
        }

        #[test]
        fn equal_split_covers_total_in_any_currency(
            total in positive_money_strategy(),
            participants in participants_strategy(1..12),
        ) {
            let lines = split_equal(total, &participants, participants[0]).unwrap();
            assert_splits_cover(&lines, &total);
            prop_assert!(lines.iter().all(|l| l.amount.currency() == total.currency()));
        }

        #[test]
        fn foreign_currency_history_is_rejected(
            currency in currency_strategy().prop_filter("needs a non-USD currency", |c| *c != Currency::USD),
        ) {
            let (a, b) = (ParticipantFixtures::alice(), ParticipantFixtures::bob());
            let tx = TestSettlementBuilder::new().from(a).to(b).with_amount(Money::from_minor(100, currency)).build();
            let is_mismatch = matches!(
                usd_calculator().net_balance(a, &[tx]),
                Err(BalanceError::CurrencyMismatch { .. })
            );
            prop_assert!(is_mismatch);
        }

        #[test]
        fn payer_without_line_is_owed_full_amount(total in usd_money_strategy(), shares in custom_split_strategy(1..6)) {
            let payer = ParticipantFixtures::dave();
            let history = vec![assert_ok!(Transaction::expense(
                total,
                payer,
                &assert_ok!(SplitPolicy::custom(shares.clone())),
            ))];
            let calculator = usd_calculator();

            prop_assert_eq!(calculator.net_balance(payer, &history).unwrap(), total);
            let pairwise = calculator.pairwise_balances(payer, &history).unwrap();
            prop_assert_eq!(pairwise.total().unwrap(), total);
            let group = calculator.group_balances(&history).unwrap();
            prop_assert_eq!(group[&payer], total);
            let sum: i64 = group.values().map(Money::minor_units).sum();
            prop_assert_eq!(sum, 0);
        }

        #[test]
        fn splitting_is_deterministic(total in usd_money_strategy(), shares in custom_split_strategy(1..12)) {
            let payer = shares[0].participant;
            let participants: Vec<ParticipantId> = shares.iter().map(|s| s.participant).collect();
            prop_assert_eq!(
                split_custom(total, &shares, payer).unwrap(),
                split_custom(total, &shares, payer).unwrap()
            );
            prop_assert_eq!(
                split_equal(total, &participants, payer).unwrap(),
                split_equal(total, &participants, payer).unwrap()
            );
        }

        #[test]
        fn half_settlement_clears_even_two_way_expense(half in 1i64..1_000_000_000i64) {
            let (a, b) = (ParticipantFixtures::alice(), ParticipantFixtures::bob());
            let history = vec![
                TestExpenseBuilder::new()
                    .with_amount(MoneyFixtures::usd(half * 2))
                    .paid_by(a)
                    .split_evenly(vec![a, b])
                    .build(),
                TestSettlementBuilder::new().from(b).to(a).with_amount(MoneyFixtures::usd(half)).build(),
            ];
            let calculator = usd_calculator();
            prop_assert!(calculator.net_balance(a, &history).unwrap().is_zero());
            prop_assert!(calculator.net_balance(b, &history).unwrap().is_zero());
        }

        #[test]
        fn two_party_balances_mirror(
            history in history_strategy(vec![ParticipantFixtures::alice(), ParticipantFixtures::bob()], 20),
        ) {
            let calculator = usd_calculator();
            let a = calculator.net_balance(ParticipantFixtures::alice(), &history).unwrap();
            let b = calculator.net_balance(ParticipantFixtures::bob(), &history).unwrap();
            prop_assert_eq!(a, -b);
        }

        #[test]
        fn recomputation_is_idempotent(history in history_strategy(ParticipantFixtures::trio(), 20)) {
            let calculator = usd_calculator();
            for participant in ParticipantFixtures::trio() {
                prop_assert_eq!(
                    calculator.net_balance(participant, &history).unwrap(),
                    calculator.net_balance(participant, &history).unwrap()
                );
            }
        }

        #[test]
        fn pairwise_sums_to_net_and_group_matches(history in history_strategy(ParticipantFixtures::trio(), 20)) {
            let calculator = usd_calculator();
            let group = calculator.group_balances(&history).unwrap();
            for participant in ParticipantFixtures::trio() {
                let net = calculator.net_balance(participant, &history).unwrap();
                let pairwise = calculator.pairwise_balances(participant, &history).unwrap();
                prop_assert_eq!(pairwise.total().unwrap(), net);
                prop_assert_eq!(group.get(&participant).copied().unwrap_or(Money::zero(Currency::USD)), net);
            }
            let sum: i64 = group.values().map(Money::minor_units).sum();
            prop_assert_eq!(sum, 0);
        }

        #[test]
        fn settle_up_zeroes_every_balance(history in history_strategy(ParticipantFixtures::trio(), 20)) {
            let group = usd_calculator().group_balances(&history).unwrap();
            let nonzero = group.values().filter(|m| !m.is_zero()).count();

            let plan = settle_up(&group).unwrap();
            prop_assert!(plan.len() <= nonzero.saturating_sub(1));
            prop_assert!(plan.iter().all(|t| t.amount.is_positive()));

            let settled = apply_transfers(group, &plan);
            prop_assert!(settled.values().all(Money::is_zero));
        }
    }
}
