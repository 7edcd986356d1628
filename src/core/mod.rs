pub mod balance;
pub mod constants;
pub mod currency;
pub mod engine;
pub mod errors;
pub mod models;
pub mod money;
pub mod normalizer;
pub mod planner;
pub mod services;
