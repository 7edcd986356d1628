use indexmap::IndexMap;
use log::{debug, info};
use rust_decimal::Decimal;

use crate::core::balance::{BalanceCalculator, UnknownParticipantPolicy, derive_participants};
use crate::core::currency::{CurrencyConverter, RateProvider};
use crate::core::errors::SettleError;
use crate::core::models::{Member, SettlementReport, default_display_name};
use crate::core::money::{normalize_currency, round_money};
use crate::core::normalizer::ExpenseNormalizer;
use crate::core::planner::SettlementPlanner;
use crate::infrastructure::storage::Storage;

/// Recomputes a trip's settlement from its recorded expenses.
///
/// Stateless between runs and read-only over storage. A missing exchange
/// rate fails the whole run; no partial report is produced.
pub struct SettlementEngine<'a, S: Storage, R: RateProvider> {
    storage: &'a S,
    converter: &'a CurrencyConverter<R>,
    policy: UnknownParticipantPolicy,
}

impl<'a, S: Storage, R: RateProvider> SettlementEngine<'a, S, R> {
    pub fn new(storage: &'a S, converter: &'a CurrencyConverter<R>, policy: UnknownParticipantPolicy) -> Self {
        SettlementEngine {
            storage,
            converter,
            policy,
        }
    }

    pub async fn settle(&self, trip_id: &str, base_currency: &str) -> Result<SettlementReport, SettleError> {
        let base = normalize_currency(base_currency)?;
        let expenses = self.storage.list_expenses(trip_id).await?;
        if expenses.is_empty() {
            info!("No expenses recorded for trip {}", trip_id);
            return Ok(SettlementReport::empty(trip_id, &base));
        }

        let mut normalizer = ExpenseNormalizer::new(self.converter, &base);
        let normalized = normalizer.normalize_all(&expenses).await?;

        let members = self.storage.list_members(trip_id).await?;
        // Readiness-only records name people but never define the roster
        let roster: Vec<String> = members
            .iter()
            .filter(|m| m.registered)
            .map(|m| m.user_id.clone())
            .collect();
        let participants = if roster.is_empty() {
            derive_participants(normalized.iter().map(|e| (e.payer_id.as_str(), &e.payees)))
        } else {
            roster
        };
        debug!("Trip {} participants: {:?}", trip_id, participants);

        let balances = BalanceCalculator::new(trip_id, self.policy).compute(&normalized, &participants)?;
        let user_names = display_names(&participants, &members);

        let mut settlements = SettlementPlanner::plan(&balances, &base);
        for transfer in &mut settlements {
            if let Some(name) = user_names.get(&transfer.from_participant) {
                transfer.from_name = name.clone();
            }
            if let Some(name) = user_names.get(&transfer.to_participant) {
                transfer.to_name = name.clone();
            }
        }

        let total: Decimal = normalized.iter().map(|e| e.amount).sum();
        info!(
            "Settled trip {}: {} expenses, {} participants, {} transfers in {}",
            trip_id,
            expenses.len(),
            participants.len(),
            settlements.len(),
            base
        );

        Ok(SettlementReport {
            trip_id: trip_id.to_string(),
            total_amount: round_money(total),
            currency: base,
            users: balances.len(),
            user_balances: balances,
            user_names,
            settlements,
        })
    }
}

fn display_names(participants: &[String], members: &[Member]) -> IndexMap<String, String> {
    participants
        .iter()
        .map(|id| {
            let name = members
                .iter()
                .find(|m| &m.user_id == id)
                .map(|m| m.name.clone())
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| default_display_name(id));
            (id.clone(), name)
        })
        .collect()
}
