use log::debug;
use rust_decimal::Decimal;

use crate::core::models::{Balances, Transfer, default_display_name};
use crate::core::money::{EPSILON, is_negligible, round_money};

/// Greedy minimum-transfer matcher.
///
/// Participants are sorted by balance (stable, so ties keep roster order); the
/// largest debtor pays the largest creditor until one of them is settled, then
/// the cursor on the settled side moves inward. Emits at most `n - 1`
/// transfers for `n` non-zero balances.
pub struct SettlementPlanner;

impl SettlementPlanner {
    pub fn plan(balances: &Balances, base_currency: &str) -> Vec<Transfer> {
        let mut ledger: Vec<(&String, Decimal)> = balances.iter().map(|(id, b)| (id, *b)).collect();
        ledger.sort_by(|a, b| a.1.cmp(&b.1));

        let mut transfers = Vec::new();
        if ledger.len() < 2 {
            return transfers;
        }

        let mut i = 0;
        let mut j = ledger.len() - 1;
        while i < j {
            if is_negligible(ledger[i].1) {
                i += 1;
                continue;
            }
            if ledger[j].1 < EPSILON {
                j -= 1;
                continue;
            }
            // Sorted ascending: a positive debtor means nobody is left owing
            if ledger[i].1.is_sign_positive() {
                break;
            }

            let amount = ledger[i].1.abs().min(ledger[j].1);
            transfers.push(Transfer {
                from_participant: ledger[i].0.clone(),
                from_name: default_display_name(ledger[i].0),
                to_participant: ledger[j].0.clone(),
                to_name: default_display_name(ledger[j].0),
                amount: round_money(amount),
                currency: base_currency.to_string(),
            });
            ledger[i].1 += amount;
            ledger[j].1 -= amount;

            if is_negligible(ledger[i].1) {
                i += 1;
            }
            if ledger[j].1 < EPSILON {
                j -= 1;
            }
        }

        debug!("Planned {} transfers in {}", transfers.len(), base_currency);
        transfers
    }
}
