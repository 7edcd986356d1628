pub mod handlers;
pub mod models;
pub mod openapi;

use axum::Router;
use std::sync::Arc;
use tokio::sync::mpsc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::core::currency::RateProvider;
use crate::core::services::FinanceService;
use crate::infrastructure::events::ReadinessEvent;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::notify::Notifier;
use crate::infrastructure::storage::in_memory::InMemoryStorage;

/// The service as the server runs it; providers are chosen at startup.
pub type AppService = FinanceService<InMemoryLogging, InMemoryStorage, Arc<dyn RateProvider>, Arc<dyn Notifier>>;

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<AppService>,
    pub events: mpsc::Sender<ReadinessEvent>,
}

impl ApiState {
    pub fn new(service: Arc<AppService>, events: mpsc::Sender<ReadinessEvent>) -> Self {
        ApiState { service, events }
    }
}

/// All routes plus Swagger UI, without middleware layers.
pub fn app_router(state: ApiState) -> Router {
    handlers::api_routes(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}
