pub mod http_email;
pub mod log_only;

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::errors::SettleError;
use crate::core::models::SettlementEmail;

pub use http_email::HttpEmailNotifier;
pub use log_only::LogNotifier;

/// Delivers settlement statements to participants.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &SettlementEmail) -> Result<(), SettleError>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    async fn send(&self, email: &SettlementEmail) -> Result<(), SettleError> {
        (**self).send(email).await
    }
}
