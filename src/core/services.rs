use crate::core::balance::{UnknownParticipantPolicy, derive_participants};
use crate::core::constants::{
    EXPENSE_RECORDED, EXPENSES_QUERIED, MAX_EXPENSE_AMOUNT, MAX_ID_LENGTH, MAX_NAME_LENGTH, MAX_TEXT_LENGTH,
    MEMBER_READY, MEMBER_REGISTERED, SETTLEMENT_CALCULATED, SETTLEMENT_NOTIFIED,
};
use crate::core::currency::{ConversionResult, CurrencyConverter, RateProvider};
use crate::core::engine::SettlementEngine;
use crate::core::errors::SettleError;
use crate::core::models::{
    AppLog, DeliveryFailure, DeliveryReport, Expense, Member, NewExpense, Payees, ReadinessStatus, ReadinessUpdate,
    SettlementEmail, SettlementReport, UserStatement,
};
use crate::core::money::{MONEY_DP, normalize_currency};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::notify::Notifier;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use futures::future::join_all;
use log::{info, warn};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

/// Knobs that change settlement output, resolved once from configuration.
#[derive(Clone, Debug)]
pub struct SettlementSettings {
    pub default_currency: String,
    pub unknown_participant_policy: UnknownParticipantPolicy,
}

impl Default for SettlementSettings {
    fn default() -> Self {
        SettlementSettings {
            default_currency: crate::core::constants::DEFAULT_CURRENCY.to_string(),
            unknown_participant_policy: UnknownParticipantPolicy::default(),
        }
    }
}

pub struct FinanceService<L: LoggingService, S: Storage, R: RateProvider, N: Notifier> {
    storage: S,
    logging: L,
    converter: CurrencyConverter<R>,
    notifier: N,
    settings: SettlementSettings,
}

impl<L: LoggingService, S: Storage, R: RateProvider, N: Notifier> FinanceService<L, S, R, N> {
    pub fn new(storage: S, logging: L, rates: R, notifier: N, settings: SettlementSettings) -> Self {
        FinanceService {
            storage,
            logging,
            converter: CurrencyConverter::new(rates),
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &SettlementSettings {
        &self.settings
    }

    async fn log_and_audit(
        &self,
        trip_id: Option<&str>,
        action: &str,
        log_details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), SettleError> {
        self.logging.log_action(action, log_details, user_id, trip_id).await
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), SettleError> {
        if value.trim().is_empty() {
            return Err(SettleError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.len() > max_length {
            return Err(SettleError::invalid_input(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(SettleError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    fn validate_optional_input(&self, field: &str, value: Option<&str>, max_length: usize) -> Result<(), SettleError> {
        match value {
            Some(v) if !v.trim().is_empty() => self.validate_string_input(field, v, max_length),
            _ => Ok(()),
        }
    }

    fn validate_amount_input(&self, field: &str, amount: Decimal) -> Result<(), SettleError> {
        if amount <= Decimal::ZERO {
            return Err(SettleError::invalid_input(
                field,
                "Invalid Amount",
                "Amount must be greater than 0",
            ));
        }
        if amount > Decimal::from(MAX_EXPENSE_AMOUNT) {
            return Err(SettleError::invalid_input(
                field,
                "Amount Too Large",
                "Amount cannot exceed 1,000,000",
            ));
        }
        if amount.normalize().scale() > MONEY_DP {
            return Err(SettleError::invalid_input(
                field,
                "Invalid Amount",
                "Amount cannot have more than 2 decimal places",
            ));
        }
        Ok(())
    }

    fn validate_payees(&self, payees: &Payees) -> Result<(), SettleError> {
        if let Payees::Only(ids) = payees {
            if ids.is_empty() {
                return Err(SettleError::invalid_input(
                    "payees",
                    "Invalid payees",
                    "payees must be \"all\" or a non-empty list of participant ids",
                ));
            }
            for id in ids {
                self.validate_string_input("payees", id, MAX_ID_LENGTH)?;
            }
        }
        Ok(())
    }

    fn validate_email(&self, email: &str) -> Result<(), SettleError> {
        if !email.contains('@') || !email.contains('.') || email.len() < 5 {
            return Err(SettleError::invalid_input(
                "email",
                "Invalid email",
                format!("{} is not a valid email address", email),
            ));
        }
        Ok(())
    }

    fn base_currency<'c>(&'c self, requested: Option<&'c str>) -> &'c str {
        requested
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(self.settings.default_currency.as_str())
    }

    pub async fn record_expense(&self, trip_id: &str, new_expense: NewExpense) -> Result<Expense, SettleError> {
        self.validate_string_input("trip_id", trip_id, MAX_ID_LENGTH)?;
        self.validate_string_input("payer_id", &new_expense.payer_id, MAX_ID_LENGTH)?;
        self.validate_amount_input("amount", new_expense.amount)?;
        let currency = normalize_currency(&new_expense.currency)?;
        self.validate_payees(&new_expense.payees)?;
        self.validate_optional_input("description", new_expense.description.as_deref(), MAX_TEXT_LENGTH)?;
        self.validate_optional_input("category", new_expense.category.as_deref(), MAX_TEXT_LENGTH)?;
        self.validate_optional_input("location", new_expense.location.as_deref(), MAX_TEXT_LENGTH)?;

        let payees = match new_expense.payees {
            Payees::All => Payees::All,
            Payees::Only(ids) => Payees::only(ids.iter().map(|id| id.trim())),
        };
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            trip_id: trip_id.to_string(),
            payer_id: new_expense.payer_id.trim().to_string(),
            amount: new_expense.amount,
            currency,
            payees,
            description: new_expense.description,
            date: new_expense.date.unwrap_or_else(|| Utc::now().date_naive()),
            category: new_expense.category,
            location: new_expense.location,
            is_paid: new_expense.is_paid,
        };
        self.storage.save_expense(expense.clone()).await?;

        self.log_and_audit(
            Some(trip_id),
            EXPENSE_RECORDED,
            json!({
                "expense_id": expense.id,
                "amount": expense.amount.to_string(),
                "currency": expense.currency,
                "payees": expense.payees,
            }),
            Some(&expense.payer_id),
        )
        .await?;
        info!("Recorded expense {} on trip {}", expense.id, trip_id);
        Ok(expense)
    }

    pub async fn list_expenses(&self, trip_id: &str) -> Result<Vec<Expense>, SettleError> {
        let expenses = self.storage.list_expenses(trip_id).await?;
        self.log_and_audit(
            Some(trip_id),
            EXPENSES_QUERIED,
            json!({ "count": expenses.len() }),
            None,
        )
        .await?;
        Ok(expenses)
    }

    /// Recomputes the trip's settlement in `base_currency`, or the configured
    /// default when none is given.
    pub async fn calculate_settlement(
        &self,
        trip_id: &str,
        base_currency: Option<&str>,
    ) -> Result<SettlementReport, SettleError> {
        let base = self.base_currency(base_currency);
        let engine = SettlementEngine::new(&self.storage, &self.converter, self.settings.unknown_participant_policy);
        let report = engine.settle(trip_id, base).await?;

        self.log_and_audit(
            Some(trip_id),
            SETTLEMENT_CALCULATED,
            json!({
                "currency": report.currency,
                "total_amount": report.total_amount.to_string(),
                "users": report.users,
                "transfers": report.settlements.len(),
            }),
            None,
        )
        .await?;
        Ok(report)
    }

    pub async fn statement(
        &self,
        trip_id: &str,
        user_id: &str,
        base_currency: Option<&str>,
    ) -> Result<UserStatement, SettleError> {
        let report = self.calculate_settlement(trip_id, base_currency).await?;
        if !report.has_participant(user_id) {
            return Err(SettleError::ParticipantNotFound {
                trip_id: trip_id.to_string(),
                participant_id: user_id.to_string(),
            });
        }
        Ok(report.statement_for(user_id))
    }

    /// Adds someone to the trip roster, or updates their name and email.
    /// Readiness of an existing member is left as it was. Once a trip has a
    /// registered roster, settlement splits across that roster only.
    pub async fn register_member(
        &self,
        trip_id: &str,
        user_id: &str,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Member, SettleError> {
        self.validate_string_input("trip_id", trip_id, MAX_ID_LENGTH)?;
        self.validate_string_input("user_id", user_id, MAX_ID_LENGTH)?;
        self.validate_optional_input("name", name.as_deref(), MAX_NAME_LENGTH)?;
        if let Some(email) = email.as_deref() {
            self.validate_email(email)?;
        }

        let member = self.upsert_member(trip_id, user_id, name, email, None, true).await?;
        self.log_and_audit(
            Some(trip_id),
            MEMBER_REGISTERED,
            json!({ "name": member.name, "email": member.email }),
            Some(user_id),
        )
        .await?;
        Ok(member)
    }

    async fn upsert_member(
        &self,
        trip_id: &str,
        user_id: &str,
        name: Option<String>,
        email: Option<String>,
        ready: Option<bool>,
        register: bool,
    ) -> Result<Member, SettleError> {
        let existing = self.storage.get_member(trip_id, user_id).await?;
        let mut member = existing.unwrap_or_else(|| Member::pending(trip_id, user_id));
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            member.name = name.trim().to_string();
        }
        if email.is_some() {
            member.email = email;
        }
        if let Some(ready) = ready {
            member.ready = ready;
        }
        if register {
            member.registered = true;
        }
        self.storage.save_member(member.clone()).await?;
        Ok(member)
    }

    /// Everyone whose readiness gates settlement. Without a registered
    /// roster, expense participants who never reported in are listed as not
    /// ready, so one early reply cannot settle the whole trip.
    pub async fn readiness(&self, trip_id: &str) -> Result<ReadinessStatus, SettleError> {
        let mut members = self.storage.list_members(trip_id).await?;
        if !members.iter().any(|m| m.registered) {
            let expenses = self.storage.list_expenses(trip_id).await?;
            let pending: Vec<Member> = derive_participants(expenses.iter().map(|e| (e.payer_id.as_str(), &e.payees)))
                .into_iter()
                .filter(|id| !members.iter().any(|m| &m.user_id == id))
                .map(|id| Member::pending(trip_id, &id))
                .collect();
            members.extend(pending);
        }
        Ok(ReadinessStatus::new(trip_id, members))
    }

    /// Sets a member's readiness. When this makes the whole roster ready, the
    /// trip is settled and every member is emailed their statement. A failed
    /// settlement is reported in the update rather than failing the call.
    pub async fn mark_ready(
        &self,
        trip_id: &str,
        user_id: &str,
        ready: bool,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<ReadinessUpdate, SettleError> {
        self.validate_string_input("trip_id", trip_id, MAX_ID_LENGTH)?;
        self.validate_string_input("user_id", user_id, MAX_ID_LENGTH)?;
        self.validate_optional_input("name", name.as_deref(), MAX_NAME_LENGTH)?;
        if let Some(email) = email.as_deref() {
            self.validate_email(email)?;
        }

        self.upsert_member(trip_id, user_id, name, email, Some(ready), false).await?;
        self.log_and_audit(Some(trip_id), MEMBER_READY, json!({ "ready": ready }), Some(user_id))
            .await?;

        let status = self.readiness(trip_id).await?;
        let mut update = ReadinessUpdate {
            trip_id: trip_id.to_string(),
            user_id: user_id.to_string(),
            ready,
            all_ready: status.all_ready,
            email_sent: None,
            settlement_error: None,
        };
        if !status.all_ready {
            return Ok(update);
        }

        info!("All members of trip {} are ready, settling", trip_id);
        match self.calculate_settlement(trip_id, None).await {
            Ok(report) => {
                let delivery = self.notify_members(&report, &status.users).await?;
                update.email_sent = Some(delivery.any_sent());
            }
            Err(e) => {
                warn!("Settlement for trip {} failed after readiness: {}", trip_id, e);
                update.settlement_error = Some(e.to_string());
            }
        }
        Ok(update)
    }

    /// Sends each member their statement concurrently. Members without an
    /// email address are reported as failed, not skipped.
    pub async fn notify_members(
        &self,
        report: &SettlementReport,
        members: &[Member],
    ) -> Result<DeliveryReport, SettleError> {
        let subject = format!("Trip Settlement Details for {}", report.trip_id);
        let sends = members.iter().map(|member| {
            let subject = subject.clone();
            async move {
                let Some(to_email) = member.email.clone().filter(|e| !e.trim().is_empty()) else {
                    return Err(DeliveryFailure {
                        user_id: member.user_id.clone(),
                        reason: "No email address".to_string(),
                    });
                };
                let mut body = report.statement_for(&member.user_id);
                body.user_name = member.name.clone();
                let email = SettlementEmail { to_email, subject, body };
                self.notifier
                    .send(&email)
                    .await
                    .map(|_| member.user_id.clone())
                    .map_err(|e| DeliveryFailure {
                        user_id: member.user_id.clone(),
                        reason: e.to_string(),
                    })
            }
        });

        let mut delivery = DeliveryReport::default();
        for outcome in join_all(sends).await {
            match outcome {
                Ok(user_id) => delivery.success.push(user_id),
                Err(failure) => {
                    warn!("Could not email {}: {}", failure.user_id, failure.reason);
                    delivery.failed.push(failure);
                }
            }
        }

        self.log_and_audit(
            Some(&report.trip_id),
            SETTLEMENT_NOTIFIED,
            json!({ "success": delivery.success, "failed": delivery.failed }),
            None,
        )
        .await?;
        Ok(delivery)
    }

    pub async fn rates(&self, base_currency: Option<&str>) -> Result<HashMap<String, Decimal>, SettleError> {
        let base = normalize_currency(self.base_currency(base_currency))?;
        self.converter.latest_rates(&base).await
    }

    /// Quotes a single conversion. Provider failures come back as an explicit
    /// 1:1 fallback so callers can show something and flag it.
    pub async fn convert(&self, from: &str, to: &str, amount: Decimal) -> Result<ConversionResult, SettleError> {
        self.validate_amount_input("amount", amount)?;
        let from = normalize_currency(from)?;
        let to = normalize_currency(to)?;
        Ok(self.converter.convert_or_fallback(amount, &from, &to).await)
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, SettleError> {
        self.logging.get_logs().await
    }
}
