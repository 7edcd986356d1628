use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Signed net position per participant, in participant order.
/// Positive: is owed money. Negative: owes money.
pub type Balances = IndexMap<String, Decimal>;

/// One proposed payment in a settlement plan.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Transfer {
    #[serde(rename = "from")]
    pub from_participant: String,
    pub from_name: String,
    #[serde(rename = "to")]
    pub to_participant: String,
    pub to_name: String,
    #[schema(value_type = f64, example = 30.0)]
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SettlementReport {
    pub trip_id: String,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
    pub currency: String,
    /// Number of participants
    pub users: usize,
    #[schema(value_type = Object)]
    pub user_balances: Balances,
    pub user_names: IndexMap<String, String>,
    pub settlements: Vec<Transfer>,
}

impl SettlementReport {
    /// The legitimate "nothing recorded yet" result.
    pub fn empty(trip_id: &str, currency: &str) -> Self {
        SettlementReport {
            trip_id: trip_id.to_string(),
            total_amount: Decimal::ZERO,
            currency: currency.to_string(),
            users: 0,
            user_balances: Balances::new(),
            user_names: IndexMap::new(),
            settlements: Vec::new(),
        }
    }

    pub fn display_name(&self, user_id: &str) -> String {
        self.user_names
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| default_display_name(user_id))
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.user_balances.contains_key(user_id)
    }

    /// What one participant pays and receives under this plan. Someone with
    /// no balance in the report gets an all-zero statement.
    pub fn statement_for(&self, user_id: &str) -> UserStatement {
        let user_balance = self.user_balances.get(user_id).copied().unwrap_or(Decimal::ZERO);

        let to_pay = self
            .settlements
            .iter()
            .filter(|t| t.from_participant == user_id)
            .map(|t| Payment {
                counterparty: t.to_participant.clone(),
                counterparty_name: t.to_name.clone(),
                amount: t.amount,
                currency: t.currency.clone(),
            })
            .collect();
        let to_receive = self
            .settlements
            .iter()
            .filter(|t| t.to_participant == user_id)
            .map(|t| Payment {
                counterparty: t.from_participant.clone(),
                counterparty_name: t.from_name.clone(),
                amount: t.amount,
                currency: t.currency.clone(),
            })
            .collect();

        UserStatement {
            trip_id: self.trip_id.clone(),
            user_id: user_id.to_string(),
            user_name: self.display_name(user_id),
            currency: self.currency.clone(),
            total_trip_amount: self.total_amount,
            user_balance,
            to_pay,
            to_receive,
        }
    }
}

pub fn default_display_name(user_id: &str) -> String {
    format!("User {}", user_id)
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Payment {
    pub counterparty: String,
    pub counterparty_name: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub currency: String,
}

/// A participant's view of a settlement report, used for emails.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserStatement {
    pub trip_id: String,
    pub user_id: String,
    pub user_name: String,
    pub currency: String,
    #[schema(value_type = f64)]
    pub total_trip_amount: Decimal,
    #[schema(value_type = f64)]
    pub user_balance: Decimal,
    pub to_pay: Vec<Payment>,
    pub to_receive: Vec<Payment>,
}
