pub const EXPENSE_RECORDED: &str = "EXPENSE_RECORDED";
pub const EXPENSES_QUERIED: &str = "EXPENSES_QUERIED";
pub const MEMBER_REGISTERED: &str = "MEMBER_REGISTERED";
pub const MEMBER_READY: &str = "MEMBER_READY";
pub const SETTLEMENT_CALCULATED: &str = "SETTLEMENT_CALCULATED";
pub const SETTLEMENT_NOTIFIED: &str = "SETTLEMENT_NOTIFIED";

pub const DEFAULT_CURRENCY: &str = "SGD";
pub const MAX_EXPENSE_AMOUNT: i64 = 1_000_000;
pub const MAX_ID_LENGTH: usize = 64;
pub const MAX_TEXT_LENGTH: usize = 64;
pub const MAX_NAME_LENGTH: usize = 128;
