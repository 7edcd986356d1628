use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::core::currency::RateProvider;
use crate::core::errors::SettleError;

/// Fixed rate table. Each pair registered also answers its inverse.
#[derive(Clone, Debug, Default)]
pub struct StaticRateProvider {
    rates: HashMap<String, HashMap<String, Decimal>>,
}

impl StaticRateProvider {
    pub fn new() -> Self {
        StaticRateProvider::default()
    }

    /// `1 from = rate to`.
    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.insert(from, to, rate);
        self
    }

    pub fn insert(&mut self, from: &str, to: &str, rate: Decimal) {
        if from == to || rate <= Decimal::ZERO {
            return;
        }
        self.rates
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), rate);
        self.rates
            .entry(to.to_string())
            .or_default()
            .entry(from.to_string())
            .or_insert(Decimal::ONE / rate);
    }

    /// Parses `EUR:SGD=1.45,USD:SGD=1.34`.
    pub fn parse(table: &str) -> Result<Self, SettleError> {
        let mut provider = StaticRateProvider::new();
        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = || {
                SettleError::invalid_input(
                    "static_rates",
                    "Invalid rate entry",
                    format!("expected FROM:TO=RATE, got `{}`", entry),
                )
            };
            let (pair, rate) = entry.split_once('=').ok_or_else(invalid)?;
            let (from, to) = pair.split_once(':').ok_or_else(invalid)?;
            let rate: Decimal = rate.trim().parse().map_err(|_| invalid())?;
            provider.insert(&from.trim().to_ascii_uppercase(), &to.trim().to_ascii_uppercase(), rate);
        }
        Ok(provider)
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, Decimal>, SettleError> {
        self.rates
            .get(base)
            .cloned()
            .ok_or_else(|| SettleError::rate_unavailable(base, "*", "no rates configured for base currency"))
    }
}
