use chrono::Duration as WindowDuration;
use http::header;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tripsettle::api::{ApiState, AppService, app_router};
use tripsettle::config::CONFIG;
use tripsettle::core::currency::RateProvider;
use tripsettle::core::errors::SettleError;
use tripsettle::infrastructure::cache::SystemClock;
use tripsettle::infrastructure::events::ReadinessConsumer;
use tripsettle::infrastructure::logging::in_memory::InMemoryLogging;
use tripsettle::infrastructure::notify::{HttpEmailNotifier, LogNotifier, Notifier};
use tripsettle::infrastructure::rates::{ExchangeRateApiProvider, StaticRateProvider};
use tripsettle::infrastructure::storage::in_memory::InMemoryStorage;

const READINESS_QUEUE_DEPTH: usize = 256;

fn rate_provider(timeout: Duration) -> Result<Arc<dyn RateProvider>, SettleError> {
    if let Some(api_key) = CONFIG.exchange_rate_api_key.clone() {
        info!("Using live exchange rates from {}", CONFIG.exchange_rate_base_url);
        let provider = ExchangeRateApiProvider::new(CONFIG.exchange_rate_base_url.clone(), api_key, timeout)?;
        return Ok(Arc::new(provider));
    }
    let table = CONFIG.static_rates.as_deref().unwrap_or_default();
    match StaticRateProvider::parse(table) {
        Ok(provider) => {
            warn!("No exchange rate API key configured; using a fixed rate table");
            Ok(Arc::new(provider))
        }
        Err(e) => {
            warn!("Ignoring STATIC_RATES: {}", e);
            Ok(Arc::new(StaticRateProvider::new()))
        }
    }
}

fn notifier(timeout: Duration) -> Result<Arc<dyn Notifier>, SettleError> {
    match CONFIG.email_api_url.clone() {
        Some(endpoint) => Ok(Arc::new(HttpEmailNotifier::new(endpoint, timeout)?)),
        None => {
            warn!("No EMAIL_API_URL configured; settlement emails will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(CONFIG.log_level.as_str())
        .init();
    info!("Starting with {:?}", *CONFIG);

    let timeout = Duration::from_secs(CONFIG.request_timeout_secs);
    let service: Arc<AppService> = Arc::new(AppService::new(
        InMemoryStorage::new(),
        InMemoryLogging::new(),
        rate_provider(timeout)?,
        notifier(timeout)?,
        CONFIG.settlement_settings(),
    ));

    let (events_tx, events_rx) = mpsc::channel(READINESS_QUEUE_DEPTH);
    let consumer = ReadinessConsumer::new(
        service.clone(),
        SystemClock,
        WindowDuration::seconds(CONFIG.dedup_window_secs),
    );
    tokio::spawn(consumer.run(events_rx));

    let app = app_router(ApiState::new(service, events_tx))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
