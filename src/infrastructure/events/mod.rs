use async_trait::async_trait;
use chrono::Duration;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use utoipa::ToSchema;

use crate::core::currency::RateProvider;
use crate::core::errors::SettleError;
use crate::core::models::ReadinessUpdate;
use crate::core::services::FinanceService;
use crate::infrastructure::cache::cache_keys::readiness_event_key;
use crate::infrastructure::cache::{Clock, RecentKeys};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::notify::Notifier;
use crate::infrastructure::storage::Storage;

/// A participant announcing they are ready to settle, as delivered by a
/// message queue. Delivery is at-least-once.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ReadinessEvent {
    pub trip_id: String,
    pub user_id: String,
}

/// Whatever acts on a readiness event.
#[async_trait]
pub trait ReadinessHandler: Send + Sync {
    async fn on_ready(&self, trip_id: &str, user_id: &str) -> Result<ReadinessUpdate, SettleError>;
}

#[async_trait]
impl<L, S, R, N> ReadinessHandler for FinanceService<L, S, R, N>
where
    L: LoggingService,
    S: Storage,
    R: RateProvider,
    N: Notifier,
{
    async fn on_ready(&self, trip_id: &str, user_id: &str) -> Result<ReadinessUpdate, SettleError> {
        self.mark_ready(trip_id, user_id, true, None, None).await
    }
}

#[async_trait]
impl<H: ReadinessHandler + ?Sized> ReadinessHandler for std::sync::Arc<H> {
    async fn on_ready(&self, trip_id: &str, user_id: &str) -> Result<ReadinessUpdate, SettleError> {
        (**self).on_ready(trip_id, user_id).await
    }
}

/// Consumes readiness events, dropping redeliveries of the same
/// (trip, user) pair seen within the dedup window.
pub struct ReadinessConsumer<H: ReadinessHandler, C: Clock> {
    handler: H,
    recent: RecentKeys<C>,
}

impl<H: ReadinessHandler, C: Clock> ReadinessConsumer<H, C> {
    pub fn new(handler: H, clock: C, window: Duration) -> Self {
        ReadinessConsumer {
            handler,
            recent: RecentKeys::new(clock, window),
        }
    }

    /// Returns `None` when the event was a duplicate and nothing was done.
    /// A failed event is forgotten, so its redelivery is handled again.
    pub async fn handle(&mut self, event: &ReadinessEvent) -> Result<Option<ReadinessUpdate>, SettleError> {
        let key = readiness_event_key(&event.trip_id, &event.user_id);
        if !self.recent.observe(&key) {
            info!(
                "Dropping duplicate readiness event for {} on trip {}",
                event.user_id, event.trip_id
            );
            return Ok(None);
        }
        match self.handler.on_ready(&event.trip_id, &event.user_id).await {
            Ok(update) => Ok(Some(update)),
            Err(e) => {
                self.recent.forget(&key);
                Err(e)
            }
        }
    }

    /// Drains `events` until every sender is dropped. Handler failures are
    /// logged and do not stop the loop.
    pub async fn run(mut self, mut events: mpsc::Receiver<ReadinessEvent>) {
        info!("Readiness consumer started");
        while let Some(event) = events.recv().await {
            let purged = self.recent.purge_expired();
            if purged > 0 {
                debug!("Purged {} expired readiness keys", purged);
            }
            if let Err(e) = self.handle(&event).await {
                error!(
                    "Readiness event for {} on trip {} failed: {}",
                    event.user_id, event.trip_id, e
                );
            }
        }
        info!("Readiness consumer stopped");
    }

    pub fn tracked_keys(&self) -> usize {
        self.recent.len()
    }
}
