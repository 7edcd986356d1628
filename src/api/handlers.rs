use crate::{
    api::{ApiState, models::*},
    core::{
        currency::ConversionResult,
        errors::SettleError,
        models::{AppLog, Expense, Member, NewExpense, ReadinessStatus, ReadinessUpdate, SettlementReport, UserStatement},
    },
    infrastructure::events::ReadinessEvent,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use log::info;
use rust_decimal::Decimal;
use std::str::FromStr;

// Define API routes
pub fn api_routes(state: ApiState) -> Router {
    let finance_routes = Router::new()
        .route("/rates", get(get_rates))
        .route("/convert/{from}/{to}/{amount}", get(convert_amount))
        .route("/expenses/{trip_id}", get(list_expenses).post(record_expense))
        .route("/calculate/{trip_id}", get(calculate_settlement))
        .route("/statement/{trip_id}/{user_id}", get(get_statement))
        .route("/readiness/{trip_id}", get(get_readiness))
        .route("/readiness/{trip_id}/members", post(register_member))
        .route("/readiness/{trip_id}/{user_id}", put(mark_ready))
        .route("/events/readiness", post(publish_readiness_event));

    Router::new()
        .route("/", get(health))
        .nest("/api/finance", finance_routes)
        .route("/api/logs", get(get_app_logs))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[utoipa::path(
    get,
    path = "/api/finance/rates",
    params(BaseCurrencyQuery),
    responses(
        (status = 200, description = "Latest rates against the base currency", body = RatesResponse),
        (status = 400, description = "Invalid currency code", body = ErrorResponse),
        (status = 502, description = "Rate provider unavailable", body = ErrorResponse)
    )
)]
async fn get_rates(
    State(state): State<ApiState>,
    Query(query): Query<BaseCurrencyQuery>,
) -> Result<Json<RatesResponse>, ApiError> {
    let base = query
        .base
        .clone()
        .unwrap_or_else(|| state.service.settings().default_currency.clone())
        .to_ascii_uppercase();
    let rates = state.service.rates(Some(&base)).await?;
    Ok(Json(RatesResponse { base, rates }))
}

#[utoipa::path(
    get,
    path = "/api/finance/convert/{from}/{to}/{amount}",
    params(
        ("from" = String, Path, description = "Source currency code"),
        ("to" = String, Path, description = "Target currency code"),
        ("amount" = String, Path, description = "Amount in the source currency")
    ),
    responses(
        (status = 200, description = "Converted amount, or an explicit 1:1 fallback", body = ConversionResult),
        (status = 400, description = "Invalid amount or currency", body = ErrorResponse)
    )
)]
async fn convert_amount(
    State(state): State<ApiState>,
    Path((from, to, amount)): Path<(String, String, String)>,
) -> Result<Json<ConversionResult>, ApiError> {
    let amount = Decimal::from_str(amount.trim()).map_err(|e| {
        SettleError::invalid_input("amount", "Invalid Amount", format!("{} is not a number: {}", amount, e))
    })?;
    let result = state.service.convert(&from, &to, amount).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/finance/expenses/{trip_id}",
    params(
        ("trip_id" = String, Path, description = "ID of the trip")
    ),
    responses(
        (status = 200, description = "Expenses recorded on the trip", body = Vec<Expense>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn list_expenses(
    State(state): State<ApiState>,
    Path(trip_id): Path<String>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = state.service.list_expenses(&trip_id).await?;
    Ok(Json(expenses))
}

#[utoipa::path(
    post,
    path = "/api/finance/expenses/{trip_id}",
    params(
        ("trip_id" = String, Path, description = "ID of the trip")
    ),
    request_body = NewExpense,
    responses(
        (status = 201, description = "Expense recorded", body = Expense),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn record_expense(
    State(state): State<ApiState>,
    Path(trip_id): Path<String>,
    Json(req): Json<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let expense = state.service.record_expense(&trip_id, req).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/finance/calculate/{trip_id}",
    params(
        ("trip_id" = String, Path, description = "ID of the trip"),
        BaseCurrencyQuery
    ),
    responses(
        (status = 200, description = "Settlement plan for the trip", body = SettlementReport),
        (status = 400, description = "Invalid currency code", body = ErrorResponse),
        (status = 422, description = "Expense names someone outside the roster", body = ErrorResponse),
        (status = 502, description = "Exchange rate unavailable", body = ErrorResponse)
    )
)]
async fn calculate_settlement(
    State(state): State<ApiState>,
    Path(trip_id): Path<String>,
    Query(query): Query<BaseCurrencyQuery>,
) -> Result<Json<SettlementReport>, ApiError> {
    let report = state
        .service
        .calculate_settlement(&trip_id, query.base.as_deref())
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/finance/statement/{trip_id}/{user_id}",
    params(
        ("trip_id" = String, Path, description = "ID of the trip"),
        ("user_id" = String, Path, description = "ID of the participant"),
        BaseCurrencyQuery
    ),
    responses(
        (status = 200, description = "What the participant pays and receives", body = UserStatement),
        (status = 404, description = "Participant not part of the settlement", body = ErrorResponse),
        (status = 502, description = "Exchange rate unavailable", body = ErrorResponse)
    )
)]
async fn get_statement(
    State(state): State<ApiState>,
    Path((trip_id, user_id)): Path<(String, String)>,
    Query(query): Query<BaseCurrencyQuery>,
) -> Result<Json<UserStatement>, ApiError> {
    let statement = state
        .service
        .statement(&trip_id, &user_id, query.base.as_deref())
        .await?;
    Ok(Json(statement))
}

#[utoipa::path(
    get,
    path = "/api/finance/readiness/{trip_id}",
    params(
        ("trip_id" = String, Path, description = "ID of the trip")
    ),
    responses(
        (status = 200, description = "Roster with readiness flags", body = ReadinessStatus)
    )
)]
async fn get_readiness(
    State(state): State<ApiState>,
    Path(trip_id): Path<String>,
) -> Result<Json<ReadinessStatus>, ApiError> {
    let status = state.service.readiness(&trip_id).await?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/finance/readiness/{trip_id}/members",
    params(
        ("trip_id" = String, Path, description = "ID of the trip")
    ),
    request_body = RegisterMemberRequest,
    responses(
        (status = 201, description = "Member registered or updated", body = Member),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
async fn register_member(
    State(state): State<ApiState>,
    Path(trip_id): Path<String>,
    Json(req): Json<RegisterMemberRequest>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    let member = state
        .service
        .register_member(&trip_id, &req.user_id, req.name, req.email)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    put,
    path = "/api/finance/readiness/{trip_id}/{user_id}",
    params(
        ("trip_id" = String, Path, description = "ID of the trip"),
        ("user_id" = String, Path, description = "ID of the participant")
    ),
    request_body(content = ReadinessRequest, description = "Defaults to ready when omitted"),
    responses(
        (status = 200, description = "Readiness recorded; settles and emails when everyone is ready", body = ReadinessUpdate),
        (status = 400, description = "Bad request", body = ErrorResponse)
    )
)]
async fn mark_ready(
    State(state): State<ApiState>,
    Path((trip_id, user_id)): Path<(String, String)>,
    body: Option<Json<ReadinessRequest>>,
) -> Result<Json<ReadinessUpdate>, ApiError> {
    let (ready, name, email) = match body {
        Some(Json(req)) => (req.ready, req.name, req.email),
        None => (true, None, None),
    };
    let update = state
        .service
        .mark_ready(&trip_id, &user_id, ready, name, email)
        .await?;
    Ok(Json(update))
}

#[utoipa::path(
    post,
    path = "/api/finance/events/readiness",
    request_body = ReadinessEvent,
    responses(
        (status = 202, description = "Event queued for the readiness consumer", body = EventAccepted),
        (status = 500, description = "Consumer is not running", body = ErrorResponse)
    )
)]
async fn publish_readiness_event(
    State(state): State<ApiState>,
    Json(event): Json<ReadinessEvent>,
) -> Result<(StatusCode, Json<EventAccepted>), ApiError> {
    info!("Queueing readiness event for {} on trip {}", event.user_id, event.trip_id);
    state
        .events
        .send(event)
        .await
        .map_err(|e| SettleError::InternalServerError(format!("Readiness queue closed: {}", e)))?;
    Ok((StatusCode::ACCEPTED, Json(EventAccepted { queued: true })))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Application logs retrieved successfully", body = Vec<AppLog>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_app_logs(State(state): State<ApiState>) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = state.service.get_app_logs().await?;
    Ok(Json(logs))
}
