pub mod api;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::SettleError;
pub use crate::core::services::{FinanceService, SettlementSettings};
pub use crate::infrastructure::logging::in_memory::InMemoryLogging;
pub use crate::infrastructure::storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests;
