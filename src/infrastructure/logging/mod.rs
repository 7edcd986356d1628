pub mod in_memory;

use crate::core::errors::SettleError;
use crate::core::models::AppLog;
use async_trait::async_trait;

/// Audit trail of state-changing and settlement actions.
#[async_trait]
pub trait LoggingService: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
        trip_id: Option<&str>,
    ) -> Result<(), SettleError>;
    async fn get_logs(&self) -> Result<Vec<AppLog>, SettleError>;
}
