use crate::core::errors::SettleError;
use crate::core::models::{Expense, Member};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    expenses: Arc<RwLock<HashMap<String, Vec<Expense>>>>,
    members: Arc<RwLock<HashMap<String, Vec<Member>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_expense(&self, expense: Expense) -> Result<(), SettleError> {
        let mut expenses = self.expenses.write().await;
        let trip = expenses.entry(expense.trip_id.clone()).or_default();
        match trip.iter_mut().find(|e| e.id == expense.id) {
            Some(existing) => *existing = expense,
            None => trip.push(expense),
        }
        Ok(())
    }

    async fn list_expenses(&self, trip_id: &str) -> Result<Vec<Expense>, SettleError> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(trip_id).cloned().unwrap_or_default())
    }

    async fn save_member(&self, member: Member) -> Result<(), SettleError> {
        let mut members = self.members.write().await;
        let roster = members.entry(member.trip_id.clone()).or_default();
        match roster.iter_mut().find(|m| m.user_id == member.user_id) {
            Some(existing) => *existing = member,
            None => roster.push(member),
        }
        Ok(())
    }

    async fn get_member(&self, trip_id: &str, user_id: &str) -> Result<Option<Member>, SettleError> {
        let members = self.members.read().await;
        Ok(members
            .get(trip_id)
            .and_then(|roster| roster.iter().find(|m| m.user_id == user_id).cloned()))
    }

    async fn list_members(&self, trip_id: &str) -> Result<Vec<Member>, SettleError> {
        let members = self.members.read().await;
        Ok(members.get(trip_id).cloned().unwrap_or_default())
    }
}
