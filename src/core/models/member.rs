use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::default_display_name;

/// A trip participant and whether they are ready to settle.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Member {
    pub trip_id: String,
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub ready: bool,
    /// Added through the roster endpoint. Records created by a readiness
    /// update alone carry names and emails but never define who settles.
    #[serde(default)]
    pub registered: bool,
}

impl Member {
    /// Not ready, not registered, default display name.
    pub fn pending(trip_id: &str, user_id: &str) -> Self {
        Member {
            trip_id: trip_id.to_string(),
            user_id: user_id.to_string(),
            name: default_display_name(user_id),
            email: None,
            ready: false,
            registered: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessStatus {
    pub trip_id: String,
    pub users: Vec<Member>,
    pub all_ready: bool,
}

impl ReadinessStatus {
    pub fn new(trip_id: &str, users: Vec<Member>) -> Self {
        // An empty roster is never "all ready"
        let all_ready = !users.is_empty() && users.iter().all(|m| m.ready);
        ReadinessStatus {
            trip_id: trip_id.to_string(),
            users,
            all_ready,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ReadinessUpdate {
    pub trip_id: String,
    pub user_id: String,
    pub ready: bool,
    pub all_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_error: Option<String>,
}
