use crate::core::errors::SettleError;
use crate::core::models::{Expense, Member};
use async_trait::async_trait;

/// Expense records and the trip roster. Ordering of `list_expenses` carries no
/// meaning; `list_members` returns registration order.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_expense(&self, expense: Expense) -> Result<(), SettleError>;
    async fn list_expenses(&self, trip_id: &str) -> Result<Vec<Expense>, SettleError>;
    async fn save_member(&self, member: Member) -> Result<(), SettleError>;
    async fn get_member(&self, trip_id: &str, user_id: &str) -> Result<Option<Member>, SettleError>;
    async fn list_members(&self, trip_id: &str) -> Result<Vec<Member>, SettleError>;
}

pub mod in_memory;
