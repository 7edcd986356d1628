pub mod cache;
pub mod events;
pub mod logging;
pub mod notify;
pub mod rates;
pub mod storage;
