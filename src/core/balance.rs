use indexmap::IndexSet;
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::core::errors::SettleError;
use crate::core::models::{Balances, NormalizedExpense, Payees};
use crate::core::money::{EPSILON, round_money};

/// What to do when an expense names someone outside the trip roster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownParticipantPolicy {
    /// Fail the run with `UnknownParticipant`.
    #[default]
    Reject,
    /// Drop the unknown id (or the whole expense, if nothing is left) and log it.
    Skip,
}

impl FromStr for UnknownParticipantPolicy {
    type Err = SettleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(UnknownParticipantPolicy::Reject),
            "skip" => Ok(UnknownParticipantPolicy::Skip),
            other => Err(SettleError::invalid_input(
                "unknown_participant_policy",
                "Invalid policy",
                format!("expected `reject` or `skip`, got `{}`", other),
            )),
        }
    }
}

/// Union of payer and payee ids, first-seen order (payer before payees).
pub fn derive_participants<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a Payees)>,
{
    let mut participants = IndexSet::new();
    for (payer_id, payees) in entries {
        participants.insert(payer_id.to_string());
        participants.extend(payees.explicit_ids().iter().cloned());
    }
    participants.into_iter().collect()
}

pub struct BalanceCalculator {
    trip_id: String,
    policy: UnknownParticipantPolicy,
}

impl BalanceCalculator {
    pub fn new(trip_id: &str, policy: UnknownParticipantPolicy) -> Self {
        BalanceCalculator {
            trip_id: trip_id.to_string(),
            policy,
        }
    }

    /// Net position of every participant, rounded to cents and summing to zero.
    ///
    /// Each expense credits its payer the full amount and debits every payee an
    /// equal share. A payer who is also a payee is debited their own share too.
    pub fn compute(&self, expenses: &[NormalizedExpense], participants: &[String]) -> Result<Balances, SettleError> {
        let mut balances: Balances = participants.iter().map(|p| (p.clone(), Decimal::ZERO)).collect();
        let everyone: Vec<String> = balances.keys().cloned().collect();

        for expense in expenses {
            if !balances.contains_key(&expense.payer_id) {
                self.unknown(&expense.payer_id)?;
                warn!(
                    "Skipping expense {} on trip {}: payer {} is not a participant",
                    expense.expense_id, self.trip_id, expense.payer_id
                );
                continue;
            }

            let payees = if expense.payees.splits_across_everyone() {
                everyone.clone()
            } else {
                self.known_payees(expense, &balances)?
            };
            if payees.is_empty() {
                warn!(
                    "Skipping expense {} on trip {}: no known payees",
                    expense.expense_id, self.trip_id
                );
                continue;
            }

            let share = expense.amount / Decimal::from(payees.len());
            if let Some(balance) = balances.get_mut(&expense.payer_id) {
                *balance += expense.amount;
            }
            for payee in &payees {
                if let Some(balance) = balances.get_mut(payee) {
                    *balance -= share;
                }
            }
        }

        debug!("Exact balances for trip {}: {:?}", self.trip_id, balances);
        Ok(round_zero_sum(&balances))
    }

    fn known_payees(&self, expense: &NormalizedExpense, balances: &Balances) -> Result<Vec<String>, SettleError> {
        let mut seen = HashSet::new();
        let mut known = Vec::new();
        for id in expense.payees.explicit_ids() {
            if !seen.insert(id.as_str()) {
                continue;
            }
            if balances.contains_key(id) {
                known.push(id.clone());
            } else {
                self.unknown(id)?;
                warn!(
                    "Ignoring payee {} on expense {}: not a participant of trip {}",
                    id, expense.expense_id, self.trip_id
                );
            }
        }
        Ok(known)
    }

    fn unknown(&self, participant_id: &str) -> Result<(), SettleError> {
        match self.policy {
            UnknownParticipantPolicy::Skip => Ok(()),
            UnknownParticipantPolicy::Reject => Err(SettleError::UnknownParticipant {
                trip_id: self.trip_id.clone(),
                participant_id: participant_id.to_string(),
            }),
        }
    }
}

/// Rounds every balance to cents, then hands any residual cents back to the
/// participants whose rounding moved furthest in the residual's direction.
/// Result sums to exactly zero with each entry within one cent of exact.
pub fn round_zero_sum(exact: &Balances) -> Balances {
    let mut rounded: Balances = exact.iter().map(|(id, v)| (id.clone(), round_money(*v))).collect();

    let residual: Decimal = rounded.values().sum();
    let steps = (residual.abs() / EPSILON).round().to_usize().unwrap_or(0);
    if steps == 0 {
        return rounded;
    }

    let direction = if residual.is_sign_positive() { -EPSILON } else { EPSILON };
    // Error in the residual's direction: how far each entry was pushed by rounding
    let mut candidates: Vec<(usize, Decimal)> = exact
        .values()
        .zip(rounded.values())
        .enumerate()
        .map(|(i, (e, r))| (i, if direction.is_sign_negative() { *r - *e } else { *e - *r }))
        .collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    for (index, _) in candidates.into_iter().take(steps) {
        if let Some((_, balance)) = rounded.get_index_mut(index) {
            *balance += direction;
        }
    }
    rounded
}
