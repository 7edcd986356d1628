use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::settlement::UserStatement;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SettlementEmail {
    #[serde(rename = "to")]
    pub to_email: String,
    pub subject: String,
    pub body: UserStatement,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub user_id: String,
    pub reason: String,
}

/// Outcome of sending one settlement email per member.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeliveryReport {
    pub success: Vec<String>,
    pub failed: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    pub fn any_sent(&self) -> bool {
        !self.success.is_empty()
    }
}
