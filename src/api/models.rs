use axum::{Json, http::StatusCode, response::IntoResponse};
use log::error;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

use crate::core::errors::SettleError;

#[derive(Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BaseCurrencyQuery {
    /// Three-letter code; the configured default when omitted.
    pub base: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RegisterMemberRequest {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReadinessRequest {
    #[serde(default = "default_ready")]
    pub ready: bool,
    pub name: Option<String>,
    pub email: Option<String>,
}

fn default_ready() -> bool {
    true
}

#[derive(Serialize, ToSchema)]
pub struct RatesResponse {
    pub base: String,
    #[schema(value_type = Object)]
    pub rates: HashMap<String, Decimal>,
}

#[derive(Serialize, ToSchema)]
pub struct EventAccepted {
    pub queued: bool,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for SettleError to implement IntoResponse
pub struct ApiError(pub SettleError);

impl From<SettleError> for ApiError {
    fn from(err: SettleError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            SettleError::InvalidCurrency(_) | SettleError::InvalidInput(..) => StatusCode::BAD_REQUEST,
            SettleError::ParticipantNotFound { .. } => StatusCode::NOT_FOUND,
            SettleError::UnknownParticipant { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            SettleError::RateUnavailable { .. } => StatusCode::BAD_GATEWAY,
            SettleError::NotificationError(_) => StatusCode::BAD_GATEWAY,
            SettleError::StorageError(_) | SettleError::LoggingError(_) | SettleError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let error_message = match &self.0 {
            SettleError::InvalidInput(_, detail) => format!("{}: {}", detail.title, detail.description),
            other => other.to_string(),
        };
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, error_message);
        }
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}
