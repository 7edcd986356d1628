use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug, Serialize)]
pub enum SettleError {
    /// The rate provider could not quote `from` against `to`
    #[error("Exchange rate {from}->{to} unavailable: {reason}")]
    RateUnavailable { from: String, to: String, reason: String },

    /// An expense names someone outside the trip roster
    #[error("Participant {participant_id} is not registered on trip {trip_id}")]
    UnknownParticipant { trip_id: String, participant_id: String },

    #[error("Participant {participant_id} not found on trip {trip_id}")]
    ParticipantNotFound { trip_id: String, participant_id: String },

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl SettleError {
    pub fn rate_unavailable(from: &str, to: &str, reason: impl Into<String>) -> Self {
        SettleError::RateUnavailable {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_input(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        SettleError::InvalidInput(
            field.to_string(),
            FieldError {
                field: field.to_string(),
                title: title.into(),
                description: description.into(),
            },
        )
    }
}
