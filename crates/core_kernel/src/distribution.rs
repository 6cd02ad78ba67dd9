//! Exact distribution of integer minor units
//!
//! Both functions return one share per input slot and guarantee that the
//! shares sum to `total` exactly. Leftover units are assigned in input
//! order, so identical inputs always produce identical outputs.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::money::MoneyError;

/// Splits `total` minor units into `parts` equal shares
///
/// Each share is `total / parts` truncated; the first `total % parts`
/// shares receive one extra unit.
///
/// # Errors
///
/// Returns `InvalidAmount` if `total` is negative or `parts` is zero.
pub fn distribute_evenly(total: i64, parts: usize) -> Result<Vec<i64>, MoneyError> {
    if parts == 0 {
        return Err(MoneyError::InvalidAmount("Cannot allocate to zero parts".to_string()));
    }
    if total < 0 {
        return Err(MoneyError::InvalidAmount(format!(
            "Cannot distribute a negative total: {}",
            total
        )));
    }

    let n = i64::try_from(parts).map_err(|_| MoneyError::Overflow)?;
    let base = total / n;
    let remainder = total % n;

    Ok((0..n)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

/// Splits `total` minor units according to percentages in the range 0-100
///
/// Every share starts as `floor(total * percentage / 100)`. The difference
/// between `total` and the truncated sum is then settled one unit per share
/// in input order, cycling when the difference exceeds the number of
/// shares. A negative difference (percentages summing slightly above 100)
/// is taken back the same way without pushing a share below zero. Shares
/// with a zero percentage never absorb a difference.
///
/// The caller is responsible for checking that the percentages sum to 100
/// within its tolerance.
///
/// # Errors
///
/// - `InvalidAmount` for a negative total, an empty slice, or a negative
///   percentage.
/// - `Overflow` if an intermediate product does not fit.
pub fn distribute_by_percentages(total: i64, percentages: &[Decimal]) -> Result<Vec<i64>, MoneyError> {
    if percentages.is_empty() {
        return Err(MoneyError::InvalidAmount("Empty percentages".to_string()));
    }
    if total < 0 {
        return Err(MoneyError::InvalidAmount(format!(
            "Cannot distribute a negative total: {}",
            total
        )));
    }
    if let Some(negative) = percentages.iter().find(|p| p.is_sign_negative() && !p.is_zero()) {
        return Err(MoneyError::InvalidAmount(format!(
            "Negative percentage: {}",
            negative
        )));
    }

    let total_dec = Decimal::from(total);
    let mut shares = Vec::with_capacity(percentages.len());
    for percentage in percentages {
        let raw = total_dec
            .checked_mul(*percentage)
            .and_then(|product| product.checked_div(dec!(100)))
            .ok_or(MoneyError::Overflow)?
            .floor();
        shares.push(raw.to_i64().ok_or(MoneyError::Overflow)?);
    }

    let allocated = shares
        .iter()
        .try_fold(0i64, |acc, share| acc.checked_add(*share))
        .ok_or(MoneyError::Overflow)?;
    let difference = total - allocated;

    let eligible: Vec<usize> = percentages
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_zero())
        .map(|(i, _)| i)
        .collect();

    if difference > 0 {
        give_in_order(&mut shares, &eligible, difference)?;
    } else if difference < 0 {
        take_in_order(&mut shares, &eligible, -difference)?;
    }

    Ok(shares)
}

/// Adds `units` across `eligible` shares, one per share per round
fn give_in_order(shares: &mut [i64], eligible: &[usize], units: i64) -> Result<(), MoneyError> {
    if eligible.is_empty() {
        return Err(MoneyError::InvalidAmount(
            "No share can absorb the rounding difference".to_string(),
        ));
    }

    let count = i64::try_from(eligible.len()).map_err(|_| MoneyError::Overflow)?;
    let full_rounds = units / count;
    let leftover = units % count;

    for (position, &index) in eligible.iter().enumerate() {
        let extra = if (position as i64) < leftover { 1 } else { 0 };
        shares[index] += full_rounds + extra;
    }

    Ok(())
}

/// Removes `units` across `eligible` shares in rounds, skipping empty shares
fn take_in_order(shares: &mut [i64], eligible: &[usize], mut units: i64) -> Result<(), MoneyError> {
    while units > 0 {
        let holders: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|&index| shares[index] > 0)
            .collect();

        if holders.is_empty() {
            return Err(MoneyError::InvalidAmount(
                "Percentages allocate more than the total".to_string(),
            ));
        }

        let per_share = (units / holders.len() as i64).max(1);
        for index in holders {
            if units == 0 {
                break;
            }
            let cut = per_share.min(shares[index]).min(units);
            shares[index] -= cut;
            units -= cut;
        }
    }

    Ok(())
}
