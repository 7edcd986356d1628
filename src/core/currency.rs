use async_trait::async_trait;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::core::errors::SettleError;

/// Source of live exchange rates.
///
/// `latest_rates` quotes one base currency against every currency the provider
/// knows; `1 base = rate quote`.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, Decimal>, SettleError>;

    async fn latest_rate(&self, base: &str, quote: &str) -> Result<Decimal, SettleError> {
        let rates = self.latest_rates(base).await.map_err(|e| match e {
            SettleError::RateUnavailable { reason, .. } => SettleError::rate_unavailable(base, quote, reason),
            other => other,
        })?;
        match rates.get(quote) {
            Some(rate) if rate.is_sign_positive() && !rate.is_zero() => Ok(*rate),
            Some(rate) => Err(SettleError::rate_unavailable(
                base,
                quote,
                format!("provider quoted non-positive rate {}", rate),
            )),
            None => Err(SettleError::rate_unavailable(base, quote, "pair not quoted by provider")),
        }
    }
}

#[async_trait]
impl<P: RateProvider + ?Sized> RateProvider for Arc<P> {
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, Decimal>, SettleError> {
        (**self).latest_rates(base).await
    }

    async fn latest_rate(&self, base: &str, quote: &str) -> Result<Decimal, SettleError> {
        (**self).latest_rate(base, quote).await
    }
}

/// Outcome of a conversion that is allowed to degrade.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionResult {
    Converted {
        #[schema(value_type = f64)]
        rate: Decimal,
        #[schema(value_type = f64)]
        amount: Decimal,
    },
    /// The provider failed and the amount was passed through at 1:1.
    Fallback {
        #[schema(value_type = f64)]
        used_rate: Decimal,
        #[schema(value_type = f64)]
        amount: Decimal,
        reason: String,
    },
}

impl ConversionResult {
    pub fn amount(&self) -> Decimal {
        match self {
            ConversionResult::Converted { amount, .. } | ConversionResult::Fallback { amount, .. } => *amount,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ConversionResult::Fallback { .. })
    }
}

pub struct CurrencyConverter<R: RateProvider> {
    provider: R,
}

impl<R: RateProvider> CurrencyConverter<R> {
    pub fn new(provider: R) -> Self {
        CurrencyConverter { provider }
    }

    pub fn provider(&self) -> &R {
        &self.provider
    }

    pub async fn rate(&self, from_currency: &str, to_currency: &str) -> Result<Decimal, SettleError> {
        if from_currency == to_currency {
            return Ok(Decimal::ONE);
        }
        let rate = self.provider.latest_rate(from_currency, to_currency).await?;
        debug!("Rate {}->{} = {}", from_currency, to_currency, rate);
        Ok(rate)
    }

    pub async fn convert(&self, amount: Decimal, from_currency: &str, to_currency: &str) -> Result<Decimal, SettleError> {
        if from_currency == to_currency {
            return Ok(amount);
        }
        let rate = self.rate(from_currency, to_currency).await?;
        Ok(amount * rate)
    }

    /// Like `convert`, but a provider failure yields an explicit `Fallback`
    /// at rate 1 instead of an error. Not for settlement math.
    pub async fn convert_or_fallback(&self, amount: Decimal, from_currency: &str, to_currency: &str) -> ConversionResult {
        match self.rate(from_currency, to_currency).await {
            Ok(rate) => ConversionResult::Converted {
                rate,
                amount: amount * rate,
            },
            Err(e) => {
                warn!(
                    "Falling back to 1:1 for {} {}->{}: {}",
                    amount, from_currency, to_currency, e
                );
                ConversionResult::Fallback {
                    used_rate: Decimal::ONE,
                    amount,
                    reason: e.to_string(),
                }
            }
        }
    }

    pub async fn latest_rates(&self, base: &str) -> Result<HashMap<String, Decimal>, SettleError> {
        self.provider.latest_rates(base).await
    }
}
