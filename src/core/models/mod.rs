pub mod audit;
pub mod expense;
pub mod member;
pub mod notification;
pub mod settlement;

pub use audit::AppLog;
pub use expense::{ALL_PAYEES, Expense, NewExpense, NormalizedExpense, Payees};
pub use member::{Member, ReadinessStatus, ReadinessUpdate};
pub use notification::{DeliveryFailure, DeliveryReport, SettlementEmail};
pub use settlement::{Balances, Payment, SettlementReport, Transfer, UserStatement, default_display_name};
