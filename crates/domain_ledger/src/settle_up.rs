//! Settle-up planner
//!
//! Turns a set of group balances into a short list of direct payments that
//! brings every balance to zero. The planner is greedy: it repeatedly matches
//! the largest debtor with the largest creditor, so it produces at most
//! `n - 1` transfers for `n` participants with a non-zero balance.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Money, MoneyError, ParticipantId};
use crate::error::BalanceError;

/// A payment that would settle part of the group's debts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedTransfer {
    /// Participant who owes
    pub from: ParticipantId,
    /// Participant who is owed
    pub to: ParticipantId,
    pub amount: Money,
}

/// Plans the transfers that clear `balances`
///
/// Ties between equally large balances go to the lower participant id, so the
/// plan is deterministic for a given input.
///
/// # Errors
///
/// - `UnbalancedGroup` if the balances do not sum to zero
/// - `Money` if the balances mix currencies
pub fn settle_up(balances: &BTreeMap<ParticipantId, Money>) -> Result<Vec<SuggestedTransfer>, BalanceError> {
    let Some(currency) = balances.values().next().map(Money::currency) else {
        return Ok(Vec::new());
    };

    let residual = balances
        .values()
        .try_fold(Money::zero(currency), |acc, money| acc.checked_add(money))?;
    if !residual.is_zero() {
        return Err(BalanceError::UnbalancedGroup {
            residual: residual.amount(),
        });
    }

    // Minor units owed (debtors) and due (creditors), both positive
    let mut debtors: Vec<(ParticipantId, i64)> = Vec::new();
    let mut creditors: Vec<(ParticipantId, i64)> = Vec::new();
    for (participant, money) in balances {
        let minor = money.minor_units();
        if minor < 0 {
            debtors.push((*participant, minor.checked_neg().ok_or(MoneyError::Overflow)?));
        } else if minor > 0 {
            creditors.push((*participant, minor));
        }
    }

    let mut transfers = Vec::new();
    while let (Some(d), Some(c)) = (largest(&debtors), largest(&creditors)) {
        let amount = debtors[d].1.min(creditors[c].1);
        transfers.push(SuggestedTransfer {
            from: debtors[d].0,
            to: creditors[c].0,
            amount: Money::from_minor(amount, currency),
        });

        debtors[d].1 -= amount;
        creditors[c].1 -= amount;
        debtors.retain(|(_, owed)| *owed > 0);
        creditors.retain(|(_, due)| *due > 0);
    }

    Ok(transfers)
}

/// Index of the largest entry; the first one wins ties since input is id-ordered
fn largest(entries: &[(ParticipantId, i64)]) -> Option<usize> {
    entries
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, i64)>, (index, (_, value))| match best {
            Some((_, top)) if top >= *value => best,
            _ => Some((index, *value)),
        })
        .map(|(index, _)| index)
}
