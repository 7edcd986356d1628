use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::core::currency::{CurrencyConverter, RateProvider};
use crate::core::errors::SettleError;
use crate::core::models::{Expense, NormalizedExpense};

/// Expresses expenses in one base currency.
///
/// Holds one rate per source currency for its lifetime, so a single settlement
/// run asks the provider at most once per currency and prices every expense in
/// that currency identically.
pub struct ExpenseNormalizer<'a, R: RateProvider> {
    converter: &'a CurrencyConverter<R>,
    base_currency: String,
    rates: HashMap<String, Decimal>,
}

impl<'a, R: RateProvider> ExpenseNormalizer<'a, R> {
    pub fn new(converter: &'a CurrencyConverter<R>, base_currency: &str) -> Self {
        ExpenseNormalizer {
            converter,
            base_currency: base_currency.to_string(),
            rates: HashMap::new(),
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub async fn normalize(&mut self, expense: &Expense) -> Result<NormalizedExpense, SettleError> {
        let amount = if expense.currency == self.base_currency {
            expense.amount
        } else {
            let rate = self.rate_for(&expense.currency).await?;
            expense.amount * rate
        };

        Ok(NormalizedExpense {
            expense_id: expense.id.clone(),
            payer_id: expense.payer_id.clone(),
            payees: expense.payees.clone(),
            amount,
        })
    }

    /// Normalizes every expense or fails on the first missing rate.
    pub async fn normalize_all(&mut self, expenses: &[Expense]) -> Result<Vec<NormalizedExpense>, SettleError> {
        let mut normalized = Vec::with_capacity(expenses.len());
        for expense in expenses {
            normalized.push(self.normalize(expense).await?);
        }
        Ok(normalized)
    }

    async fn rate_for(&mut self, currency: &str) -> Result<Decimal, SettleError> {
        if let Some(rate) = self.rates.get(currency) {
            return Ok(*rate);
        }
        let rate = self.converter.rate(currency, &self.base_currency).await?;
        debug!("Using {}->{} rate {} for this run", currency, self.base_currency, rate);
        self.rates.insert(currency.to_string(), rate);
        Ok(rate)
    }
}
