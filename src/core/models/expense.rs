use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const ALL_PAYEES: &str = "all";

/// Who benefits from an expense.
///
/// On the wire this is either the string `"all"` or a list of participant ids.
/// A missing or `null` value is read as `All`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PayeesRepr", into = "PayeesRepr")]
pub enum Payees {
    #[default]
    All,
    Only(Vec<String>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PayeesRepr {
    Missing,
    Sentinel(String),
    List(Vec<String>),
}

impl From<PayeesRepr> for Payees {
    fn from(repr: PayeesRepr) -> Self {
        match repr {
            PayeesRepr::Missing => Payees::All,
            PayeesRepr::Sentinel(s) if s.eq_ignore_ascii_case(ALL_PAYEES) => Payees::All,
            // A single id is accepted for compatibility with one-payee clients
            PayeesRepr::Sentinel(s) => Payees::Only(vec![s]),
            PayeesRepr::List(ids) => Payees::Only(ids),
        }
    }
}

impl From<Payees> for PayeesRepr {
    fn from(payees: Payees) -> Self {
        match payees {
            Payees::All => PayeesRepr::Sentinel(ALL_PAYEES.to_string()),
            Payees::Only(ids) => PayeesRepr::List(ids),
        }
    }
}

impl Payees {
    pub fn only<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Payees::Only(ids.into_iter().map(Into::into).collect())
    }

    /// Ids named explicitly; empty for `All`.
    pub fn explicit_ids(&self) -> &[String] {
        match self {
            Payees::All => &[],
            Payees::Only(ids) => ids,
        }
    }

    /// `All`, or an explicit list that is empty, splits across the whole trip.
    pub fn splits_across_everyone(&self) -> bool {
        self.explicit_ids().is_empty()
    }
}

/// One recorded spend event on a trip. Settlement only ever reads these.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Expense {
    pub id: String,
    pub trip_id: String,
    pub payer_id: String,
    #[schema(value_type = f64, example = 90.0)]
    pub amount: Decimal,
    #[schema(example = "SGD")]
    pub currency: String,
    #[serde(default)]
    #[schema(value_type = Object, example = json!("all"))]
    pub payees: Payees,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
}

/// Fields supplied by a client when recording an expense.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NewExpense {
    pub payer_id: String,
    #[schema(value_type = f64, example = 90.0)]
    pub amount: Decimal,
    #[schema(example = "SGD")]
    pub currency: String,
    #[serde(default)]
    #[schema(value_type = Object, example = json!(["u2", "u3"]))]
    pub payees: Payees,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
}

/// An expense with its amount expressed in the run's base currency.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedExpense {
    pub expense_id: String,
    pub payer_id: String,
    pub payees: Payees,
    pub amount: Decimal,
}
