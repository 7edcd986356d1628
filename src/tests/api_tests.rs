use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::ServiceExt;

use super::{FailingRateProvider, init_logging};
use crate::api::{ApiState, AppService, app_router};
use crate::core::currency::RateProvider;
use crate::core::services::SettlementSettings;
use crate::infrastructure::events::ReadinessEvent;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::notify::{LogNotifier, Notifier};
use crate::infrastructure::rates::StaticRateProvider;
use crate::infrastructure::storage::in_memory::InMemoryStorage;

fn test_app(rates: Arc<dyn RateProvider>) -> (Router, mpsc::Receiver<ReadinessEvent>) {
    init_logging();
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let service = Arc::new(AppService::new(
        InMemoryStorage::new(),
        InMemoryLogging::new(),
        rates,
        notifier,
        SettlementSettings::default(),
    ));
    let (tx, rx) = mpsc::channel(8);
    (app_router(ApiState::new(service, tx)), rx)
}

fn static_rates() -> Arc<dyn RateProvider> {
    Arc::new(StaticRateProvider::new().with_rate("EUR", "SGD", dec!(1.5)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (app, _rx) = test_app(static_rates());
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_trip_is_ok_with_no_settlements() {
    let (app, _rx) = test_app(static_rates());
    let (status, body) = send(&app, Method::GET, "/api/finance/calculate/empty-trip", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trip_id"], "empty-trip");
    assert_eq!(body["total_amount"], 0.0);
    assert_eq!(body["currency"], "SGD");
    assert_eq!(body["users"], 0);
    assert_eq!(body["settlements"], json!([]));
}

#[tokio::test]
async fn test_record_then_calculate() {
    let (app, _rx) = test_app(static_rates());
    let (status, expense) = send(
        &app,
        Method::POST,
        "/api/finance/expenses/t1",
        Some(json!({ "payer_id": "A", "amount": 10.0, "currency": "EUR", "payees": "all" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["payees"], "all");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/finance/expenses/t1",
        Some(json!({ "payer_id": "B", "amount": 20, "currency": "SGD" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, listed) = send(&app, Method::GET, "/api/finance/expenses/t1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(2));

    let (status, report) = send(&app, Method::GET, "/api/finance/calculate/t1?base=SGD", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_amount"], 35.0);
    assert_eq!(report["user_balances"]["A"], -2.5);
    assert_eq!(report["settlements"][0]["from"], "A");
    assert_eq!(report["settlements"][0]["to"], "B");
    assert_eq!(report["settlements"][0]["amount"], 2.5);
}

#[tokio::test]
async fn test_rate_failure_is_bad_gateway_not_empty() {
    let (app, _rx) = test_app(Arc::new(FailingRateProvider));
    send(
        &app,
        Method::POST,
        "/api/finance/expenses/t2",
        Some(json!({ "payer_id": "A", "amount": 10, "currency": "EUR", "payees": ["B"] })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/finance/calculate/t2", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("EUR->SGD"));
}

#[tokio::test]
async fn test_validation_errors_are_bad_request() {
    let (app, _rx) = test_app(static_rates());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/finance/expenses/t3",
        Some(json!({ "payer_id": "A", "amount": -1, "currency": "SGD" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("greater than 0"));

    let (status, _) = send(&app, Method::GET, "/api/finance/calculate/t3?base=dollars", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_participant_is_unprocessable() {
    let (app, _rx) = test_app(static_rates());
    send(
        &app,
        Method::POST,
        "/api/finance/readiness/t4/members",
        Some(json!({ "user_id": "A", "name": "Alice" })),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/api/finance/expenses/t4",
        Some(json!({ "payer_id": "A", "amount": 30, "currency": "SGD", "payees": ["Zed"] })),
    )
    .await;

    let (status, _) = send(&app, Method::GET, "/api/finance/calculate/t4", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_statement_unknown_user_is_not_found() {
    let (app, _rx) = test_app(static_rates());
    send(
        &app,
        Method::POST,
        "/api/finance/expenses/t5",
        Some(json!({ "payer_id": "A", "amount": 30, "currency": "SGD", "payees": ["B"] })),
    )
    .await;

    let (status, statement) = send(&app, Method::GET, "/api/finance/statement/t5/B", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(statement["user_balance"], -30.0);

    let (status, _) = send(&app, Method::GET, "/api/finance/statement/t5/Q", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_readiness_flow_over_http() {
    let (app, _rx) = test_app(static_rates());
    let (status, member) = send(
        &app,
        Method::POST,
        "/api/finance/readiness/t6/members",
        Some(json!({ "user_id": "A", "email": "a@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["ready"], false);

    let (status, update) = send(&app, Method::PUT, "/api/finance/readiness/t6/A", Some(json!({ "ready": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(update["all_ready"], true);
    assert_eq!(update["email_sent"], true);

    let (status, readiness) = send(&app, Method::GET, "/api/finance/readiness/t6", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["users"][0]["ready"], true);
}

#[tokio::test]
async fn test_readiness_event_is_queued() {
    let (app, mut rx) = test_app(static_rates());
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/finance/events/readiness",
        Some(json!({ "trip_id": "t7", "user_id": "A" })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["queued"], true);
    let event = rx.recv().await.unwrap();
    assert_eq!(event.trip_id, "t7");
    assert_eq!(event.user_id, "A");
}

#[tokio::test]
async fn test_convert_route_reports_fallback() {
    let (app, _rx) = test_app(static_rates());
    let (status, body) = send(&app, Method::GET, "/api/finance/convert/EUR/SGD/10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "converted");
    assert_eq!(body["amount"], 15.0);

    let (status, body) = send(&app, Method::GET, "/api/finance/convert/GBP/SGD/10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "fallback");
    assert_eq!(body["used_rate"], 1.0);

    let (status, _) = send(&app, Method::GET, "/api/finance/convert/EUR/SGD/ten", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rates_route_and_logs() {
    let (app, _rx) = test_app(static_rates());
    let (status, body) = send(&app, Method::GET, "/api/finance/rates?base=eur", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"], "EUR");
    assert_eq!(body["rates"]["SGD"], 1.5);

    send(
        &app,
        Method::POST,
        "/api/finance/readiness/t8/members",
        Some(json!({ "user_id": "A" })),
    )
    .await;
    let (status, logs) = send(&app, Method::GET, "/api/logs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs[0]["action"], "MEMBER_REGISTERED");
}
