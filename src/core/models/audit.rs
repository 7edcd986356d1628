use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AppLog {
    pub id: String,
    pub action: String,
    pub user_id: Option<String>,
    pub trip_id: Option<String>,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
