use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use std::time::Duration;

use super::Notifier;
use crate::core::errors::SettleError;
use crate::core::models::SettlementEmail;

/// Posts `{to, subject, body}` as JSON to an email API.
pub struct HttpEmailNotifier {
    client: Client,
    endpoint: String,
}

impl HttpEmailNotifier {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, SettleError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SettleError::NotificationError(format!("Could not build email client: {}", e)))?;
        Ok(HttpEmailNotifier { client, endpoint })
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    async fn send(&self, email: &SettlementEmail) -> Result<(), SettleError> {
        debug!("Sending settlement email to {}", email.to_email);
        let response = self
            .client
            .post(&self.endpoint)
            .json(email)
            .send()
            .await
            .map_err(|e| {
                error!("Email API unreachable: {}", e);
                SettleError::NotificationError(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SettleError::NotificationError(format!(
                "Email API returned {} for {}",
                status, email.to_email
            )));
        }
        Ok(())
    }
}
