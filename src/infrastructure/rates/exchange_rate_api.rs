//! Client for ExchangeRate-API style endpoints:
//! `GET {base_url}/{api_key}/latest/{BASE}`.

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::currency::RateProvider;
use crate::core::errors::SettleError;

const SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(default)]
    conversion_rates: HashMap<String, Decimal>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

pub struct ExchangeRateApiProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, SettleError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            SettleError::InternalServerError(format!("Could not build rate provider client: {}", e))
        })?;

        Ok(ExchangeRateApiProvider {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, Decimal>, SettleError> {
        let url = format!("{}/{}/latest/{}", self.base_url, self.api_key, base);
        debug!("Fetching latest rates for {}", base);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Rate provider unreachable for {}: {}", base, e);
            SettleError::rate_unavailable(base, "*", e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SettleError::rate_unavailable(base, "*", format!("HTTP error: {}", status)));
        }

        let body: LatestRatesResponse = response
            .json()
            .await
            .map_err(|e| SettleError::rate_unavailable(base, "*", format!("Malformed response: {}", e)))?;

        if body.result != SUCCESS {
            return Err(SettleError::rate_unavailable(
                base,
                "*",
                body.error_type.unwrap_or_else(|| body.result.clone()),
            ));
        }
        Ok(body.conversion_rates)
    }
}
