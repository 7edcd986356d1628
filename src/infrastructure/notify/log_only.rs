use async_trait::async_trait;
use log::info;

use super::Notifier;
use crate::core::errors::SettleError;
use crate::core::models::SettlementEmail;

/// Writes emails to the log instead of delivering them. Used when no email
/// API is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: &SettlementEmail) -> Result<(), SettleError> {
        let body = serde_json::to_string(&email.body)
            .map_err(|e| SettleError::NotificationError(format!("Failed to serialize email body: {}", e)))?;
        info!("Settlement email (not delivered) to {}: {} {}", email.to_email, email.subject, body);
        Ok(())
    }
}
