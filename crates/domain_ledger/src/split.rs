//! Splitter: divides a transaction amount among participants
//!
//! Every function here is pure. The lines returned for one amount always sum
//! to that amount exactly (the zero-remainder invariant): amounts are divided
//! in integer minor units and leftover units go to participants in the order
//! they were supplied.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use core_kernel::{Currency, Money, MoneyError, ParticipantId};
use crate::error::SplitError;

/// Largest accepted distance between a custom split's percentage total and 100
pub const PERCENTAGE_TOLERANCE: Decimal = dec!(0.01);

/// One participant's resolved share of a specific expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitLine {
    /// Who owes this share
    pub participant: ParticipantId,
    /// The share, never negative
    pub amount: Money,
    /// True only on the line belonging to whoever paid the expense
    pub is_payer: bool,
    /// Requested percentage for custom splits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
}

impl SplitLine {
    /// Creates a line without a percentage
    pub fn new(participant: ParticipantId, amount: Money, is_payer: bool) -> Self {
        Self {
            participant,
            amount,
            is_payer,
            percentage: None,
        }
    }

    /// Attaches the percentage this line was derived from
    pub fn with_percentage(mut self, percentage: Decimal) -> Self {
        self.percentage = Some(percentage);
        self
    }
}

/// Sums split lines in the given currency
///
/// # Errors
///
/// Returns `CurrencyMismatch` if a line is in another currency, or
/// `Overflow` if the sum does not fit.
pub fn total_of(lines: &[SplitLine], currency: Currency) -> Result<Money, MoneyError> {
    lines
        .iter()
        .try_fold(Money::zero(currency), |acc, line| acc.checked_add(&line.amount))
}

/// A participant and the percentage (0-100) of the amount they owe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageShare {
    pub participant: ParticipantId,
    pub percentage: Decimal,
}

impl PercentageShare {
    pub fn new(participant: ParticipantId, percentage: Decimal) -> Self {
        Self {
            participant,
            percentage,
        }
    }
}

/// Ordered, non-empty set of participants sharing an amount equally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ParticipantId>", into = "Vec<ParticipantId>")]
pub struct EqualSplit {
    participants: Vec<ParticipantId>,
}

impl EqualSplit {
    /// Creates an equal split over the given participants, keeping their order
    ///
    /// # Errors
    ///
    /// - `EmptyParticipantSet` if `participants` is empty
    /// - `DuplicateParticipant` if a participant appears twice
    pub fn new(participants: Vec<ParticipantId>) -> Result<Self, SplitError> {
        if participants.is_empty() {
            return Err(SplitError::EmptyParticipantSet);
        }
        ensure_unique(participants.iter().copied())?;
        Ok(Self { participants })
    }

    /// Participants in the order remainder units are handed out
    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    /// Returns this split with the payer appended if it was not listed
    pub fn including(mut self, payer: ParticipantId) -> Self {
        if !self.participants.contains(&payer) {
            self.participants.push(payer);
        }
        self
    }
}

impl TryFrom<Vec<ParticipantId>> for EqualSplit {
    type Error = SplitError;

    fn try_from(participants: Vec<ParticipantId>) -> Result<Self, Self::Error> {
        Self::new(participants)
    }
}

impl From<EqualSplit> for Vec<ParticipantId> {
    fn from(split: EqualSplit) -> Self {
        split.participants
    }
}

/// Percentage shares that sum to 100 within tolerance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PercentageShare>", into = "Vec<PercentageShare>")]
pub struct CustomSplit {
    shares: Vec<PercentageShare>,
}

impl CustomSplit {
    /// Creates a custom split using [`PERCENTAGE_TOLERANCE`]
    ///
    /// # Errors
    ///
    /// - `EmptyParticipantSet` if `shares` is empty
    /// - `DuplicateParticipant` if a participant appears twice
    /// - `InvalidSplitPolicy` for a negative percentage or a total outside
    ///   100 ± tolerance
    pub fn new(shares: Vec<PercentageShare>) -> Result<Self, SplitError> {
        Self::with_tolerance(shares, PERCENTAGE_TOLERANCE)
    }

    /// Creates a custom split with an explicit tolerance
    ///
    /// Tolerances above [`PERCENTAGE_TOLERANCE`] are clamped to it.
    pub fn with_tolerance(shares: Vec<PercentageShare>, tolerance: Decimal) -> Result<Self, SplitError> {
        if shares.is_empty() {
            return Err(SplitError::EmptyParticipantSet);
        }
        ensure_unique(shares.iter().map(|s| s.participant))?;

        if let Some(share) = shares.iter().find(|s| s.percentage < Decimal::ZERO) {
            return Err(SplitError::InvalidSplitPolicy(format!(
                "Negative percentage {} for {}",
                share.percentage, share.participant
            )));
        }

        let tolerance = tolerance.abs().min(PERCENTAGE_TOLERANCE);
        let total = shares
            .iter()
            .try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.percentage))
            .ok_or_else(|| SplitError::InvalidSplitPolicy("Percentages overflow".to_string()))?;
        if (total - dec!(100)).abs() > tolerance {
            return Err(SplitError::InvalidSplitPolicy(format!(
                "Percentages must sum to 100, got {}",
                total
            )));
        }

        Ok(Self { shares })
    }

    /// Shares in input order
    pub fn shares(&self) -> &[PercentageShare] {
        &self.shares
    }
}

impl TryFrom<Vec<PercentageShare>> for CustomSplit {
    type Error = SplitError;

    fn try_from(shares: Vec<PercentageShare>) -> Result<Self, Self::Error> {
        Self::new(shares)
    }
}

impl From<CustomSplit> for Vec<PercentageShare> {
    fn from(split: CustomSplit) -> Self {
        split.shares
    }
}

/// How an expense is divided
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "shares", rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Everyone pays the same, leftover units to the first participants
    Equal(EqualSplit),
    /// Everyone pays their percentage of the amount
    Custom(CustomSplit),
}

impl SplitPolicy {
    /// Builds an equal policy
    pub fn equal(participants: Vec<ParticipantId>) -> Result<Self, SplitError> {
        EqualSplit::new(participants).map(SplitPolicy::Equal)
    }

    /// Builds a custom-percentage policy
    pub fn custom(shares: Vec<PercentageShare>) -> Result<Self, SplitError> {
        CustomSplit::new(shares).map(SplitPolicy::Custom)
    }

    /// Participants named by the policy, in order
    pub fn participants(&self) -> Vec<ParticipantId> {
        match self {
            SplitPolicy::Equal(split) => split.participants().to_vec(),
            SplitPolicy::Custom(split) => split.shares().iter().map(|s| s.participant).collect(),
        }
    }
}

/// Splits `total` according to `policy`
///
/// # Errors
///
/// `NonPositiveAmount` if `total` is not positive; see [`split_equal`] and
/// [`split_custom`] for the rest.
pub fn split(total: Money, policy: &SplitPolicy, payer: ParticipantId) -> Result<Vec<SplitLine>, SplitError> {
    match policy {
        SplitPolicy::Equal(equal) => split_equal_with(total, equal.clone().including(payer), payer),
        SplitPolicy::Custom(custom) => split_custom_with(total, custom, payer),
    }
}

/// Splits `total` equally among `participants`
///
/// The payer always takes part in an equal split; if it is missing from
/// `participants` it is appended after them. Returns one line per
/// participant in order; the first `total mod n` lines carry one extra
/// minor unit.
///
/// # Example
///
/// ```rust
/// use core_kernel::{Currency, Money, ParticipantId};
/// use domain_ledger::split::split_equal;
///
/// let (a, b, c) = (ParticipantId::new(), ParticipantId::new(), ParticipantId::new());
/// let lines = split_equal(Money::from_minor(10_000, Currency::USD), &[a, b, c], a).unwrap();
///
/// let cents: Vec<i64> = lines.iter().map(|l| l.amount.minor_units()).collect();
/// assert_eq!(cents, vec![3334, 3333, 3333]);
/// assert!(lines[0].is_payer);
/// ```
///
/// # Errors
///
/// - `NonPositiveAmount` if `total` is zero or negative
/// - `EmptyParticipantSet` if `participants` is empty
/// - `DuplicateParticipant` if a participant is listed twice
pub fn split_equal(
    total: Money,
    participants: &[ParticipantId],
    payer: ParticipantId,
) -> Result<Vec<SplitLine>, SplitError> {
    let equal = EqualSplit::new(participants.to_vec())?.including(payer);
    split_equal_with(total, equal, payer)
}

/// Splits `total` by percentage
///
/// Each line is the percentage of `total` truncated to the minor unit; the
/// truncation difference is then added (or, for totals slightly above 100%,
/// removed) one unit at a time in input order. The payer does not have to
/// hold a share.
///
/// # Errors
///
/// - `NonPositiveAmount` if `total` is zero or negative
/// - `EmptyParticipantSet`, `DuplicateParticipant` or `InvalidSplitPolicy`
///   if `entries` is not a valid custom split
pub fn split_custom(
    total: Money,
    entries: &[PercentageShare],
    payer: ParticipantId,
) -> Result<Vec<SplitLine>, SplitError> {
    let custom = CustomSplit::new(entries.to_vec())?;
    split_custom_with(total, &custom, payer)
}

fn split_equal_with(total: Money, equal: EqualSplit, payer: ParticipantId) -> Result<Vec<SplitLine>, SplitError> {
    ensure_positive(total)?;

    let shares = total.allocate(equal.participants().len())?;
    Ok(equal
        .participants()
        .iter()
        .zip(shares)
        .map(|(participant, amount)| SplitLine::new(*participant, amount, *participant == payer))
        .collect())
}

fn split_custom_with(total: Money, custom: &CustomSplit, payer: ParticipantId) -> Result<Vec<SplitLine>, SplitError> {
    ensure_positive(total)?;

    let percentages: Vec<Decimal> = custom.shares().iter().map(|s| s.percentage).collect();
    let amounts = total.allocate_by_percentages(&percentages)?;

    Ok(custom
        .shares()
        .iter()
        .zip(amounts)
        .map(|(share, amount)| {
            SplitLine::new(share.participant, amount, share.participant == payer)
                .with_percentage(share.percentage)
        })
        .collect())
}

fn ensure_positive(total: Money) -> Result<(), SplitError> {
    if !total.is_positive() {
        return Err(SplitError::NonPositiveAmount(total.amount()));
    }
    Ok(())
}

fn ensure_unique(participants: impl Iterator<Item = ParticipantId>) -> Result<(), SplitError> {
    let mut seen = HashSet::new();
    for participant in participants {
        if !seen.insert(participant) {
            return Err(SplitError::DuplicateParticipant(participant));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD).unwrap()
    }

    fn amounts(lines: &[SplitLine]) -> Vec<Decimal> {
        lines.iter().map(|l| l.amount.amount()).collect()
    }

    #[test]
    fn test_equal_split_of_hundred_among_three() {
        let (a, b, c) = (ParticipantId::new(), ParticipantId::new(), ParticipantId::new());
        let lines = split_equal(usd(dec!(100.00)), &[a, b, c], a).unwrap();

        assert_eq!(amounts(&lines), vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
        assert_eq!(total_of(&lines, Currency::USD).unwrap(), usd(dec!(100.00)));
    }

    #[test]
    fn test_extra_cent_follows_input_order_not_payer() {
        let (a, b, c) = (ParticipantId::new(), ParticipantId::new(), ParticipantId::new());
        let lines = split_equal(usd(dec!(100.00)), &[b, c, a], a).unwrap();

        assert_eq!(lines[0].participant, b);
        assert_eq!(lines[0].amount, usd(dec!(33.34)));
        assert!(lines[2].is_payer);
        assert!(!lines[0].is_payer);
    }

    #[test]
    fn test_equal_split_appends_missing_payer() {
        let (payer, b) = (ParticipantId::new(), ParticipantId::new());
        let lines = split_equal(usd(dec!(10.00)), &[b], payer).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].participant, payer);
        assert!(lines[1].is_payer);
        assert_eq!(amounts(&lines), vec![dec!(5.00), dec!(5.00)]);
    }

    #[test]
    fn test_equal_split_rejects_empty() {
        let payer = ParticipantId::new();
        assert_eq!(
            split_equal(usd(dec!(1)), &[], payer),
            Err(SplitError::EmptyParticipantSet)
        );
    }

    #[test]
    fn test_equal_split_rejects_duplicates() {
        let a = ParticipantId::new();
        assert_eq!(
            split_equal(usd(dec!(1)), &[a, a], a),
            Err(SplitError::DuplicateParticipant(a))
        );
    }

    #[test]
    fn test_split_rejects_non_positive_amount() {
        let a = ParticipantId::new();
        assert_eq!(
            split_equal(usd(dec!(0)), &[a], a),
            Err(SplitError::NonPositiveAmount(dec!(0)))
        );
        assert!(matches!(
            split_equal(usd(dec!(-5)), &[a], a),
            Err(SplitError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_custom_split_thirds_sum_exactly() {
        let (a, b, c) = (ParticipantId::new(), ParticipantId::new(), ParticipantId::new());
        let entries = vec![
            PercentageShare::new(a, dec!(33.33)),
            PercentageShare::new(b, dec!(33.33)),
            PercentageShare::new(c, dec!(33.34)),
        ];
        let lines = split_custom(usd(dec!(100.00)), &entries, a).unwrap();

        assert_eq!(amounts(&lines), vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
        assert_eq!(lines[2].percentage, Some(dec!(33.34)));
        assert!(lines[0].is_payer);
    }

    #[test]
    fn test_custom_split_payer_without_share() {
        let (payer, b) = (ParticipantId::new(), ParticipantId::new());
        let lines = split_custom(usd(dec!(42.00)), &[PercentageShare::new(b, dec!(100))], payer).unwrap();

        assert_eq!(lines.len(), 1);
        assert!(!lines[0].is_payer);
        assert_eq!(lines[0].amount, usd(dec!(42.00)));
    }

    #[test]
    fn test_custom_split_rejects_bad_total() {
        let (a, b) = (ParticipantId::new(), ParticipantId::new());
        let entries = vec![PercentageShare::new(a, dec!(50)), PercentageShare::new(b, dec!(49.98))];
        assert!(matches!(
            split_custom(usd(dec!(10)), &entries, a),
            Err(SplitError::InvalidSplitPolicy(_))
        ));
    }

    #[test]
    fn test_custom_split_accepts_total_within_tolerance() {
        let (a, b) = (ParticipantId::new(), ParticipantId::new());
        let entries = vec![PercentageShare::new(a, dec!(50)), PercentageShare::new(b, dec!(49.99))];
        let lines = split_custom(usd(dec!(10.00)), &entries, a).unwrap();
        assert_eq!(total_of(&lines, Currency::USD).unwrap(), usd(dec!(10.00)));
    }

    #[test]
    fn test_custom_split_rejects_negative_percentage() {
        let (a, b) = (ParticipantId::new(), ParticipantId::new());
        let entries = vec![PercentageShare::new(a, dec!(110)), PercentageShare::new(b, dec!(-10))];
        assert!(matches!(
            CustomSplit::new(entries),
            Err(SplitError::InvalidSplitPolicy(_))
        ));
    }

    #[test]
    fn test_with_tolerance_is_clamped() {
        let a = ParticipantId::new();
        let result = CustomSplit::with_tolerance(vec![PercentageShare::new(a, dec!(99))], dec!(5));
        assert!(result.is_err());
    }

    #[test]
    fn test_policy_serde_validates() {
        let a = ParticipantId::new();
        let json = serde_json::json!({ "type": "equal", "shares": [a, a] });
        assert!(serde_json::from_value::<SplitPolicy>(json).is_err());

        let json = serde_json::json!({
            "type": "custom",
            "shares": [{ "participant": a, "percentage": "100" }]
        });
        let policy: SplitPolicy = serde_json::from_value(json).unwrap();
        assert_eq!(policy.participants(), vec![a]);
    }

    #[test]
    fn test_overflowing_percentages_are_rejected() {
        let (a, b) = (ParticipantId::new(), ParticipantId::new());
        let shares = vec![PercentageShare::new(a, Decimal::MAX), PercentageShare::new(b, Decimal::MAX)];
        assert!(matches!(
            CustomSplit::new(shares),
            Err(SplitError::InvalidSplitPolicy(_))
        ));

        let json = serde_json::json!({
            "type": "custom",
            "shares": [
                { "participant": a, "percentage": Decimal::MAX.to_string() },
                { "participant": b, "percentage": Decimal::MAX.to_string() }
            ]
        });
        let err = serde_json::from_value::<SplitPolicy>(json).unwrap_err();
        assert!(err.to_string().contains("overflow"), "{err}");
    }
}
