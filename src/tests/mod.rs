mod api_tests;
mod config_tests;
mod currency_tests;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::currency::RateProvider;
use crate::core::errors::SettleError;
use crate::core::models::{Expense, NewExpense, Payees, SettlementEmail};
use crate::core::services::{FinanceService, SettlementSettings};
use crate::infrastructure::cache::Clock;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::notify::Notifier;
use crate::infrastructure::rates::StaticRateProvider;
use crate::infrastructure::storage::in_memory::InMemoryStorage;

pub type TestService<R> = FinanceService<InMemoryLogging, InMemoryStorage, R, Arc<RecordingNotifier>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fixed table with EUR->SGD at 1.5, counting every lookup.
pub struct CountingRateProvider {
    inner: StaticRateProvider,
    calls: AtomicUsize,
}

impl CountingRateProvider {
    pub fn new() -> Self {
        CountingRateProvider {
            inner: StaticRateProvider::new()
                .with_rate("EUR", "SGD", dec!(1.5))
                .with_rate("USD", "SGD", dec!(1.35)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProvider for CountingRateProvider {
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, Decimal>, SettleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.latest_rates(base).await
    }
}

pub struct FailingRateProvider;

#[async_trait]
impl RateProvider for FailingRateProvider {
    async fn latest_rates(&self, base: &str) -> Result<HashMap<String, Decimal>, SettleError> {
        Err(SettleError::rate_unavailable(base, "*", "provider is down"))
    }
}

/// Keeps every email it is asked to send; fails for the listed addresses.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SettlementEmail>>,
    fail_for: HashSet<String>,
}

impl RecordingNotifier {
    pub fn failing_for(addresses: &[&str]) -> Self {
        RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            fail_for: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<SettlementEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &SettlementEmail) -> Result<(), SettleError> {
        if self.fail_for.contains(&email.to_email) {
            return Err(SettleError::NotificationError(format!("mailbox {} rejected", email.to_email)));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Arc::new(Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn service_with<R: RateProvider>(rates: R, notifier: Arc<RecordingNotifier>) -> TestService<R> {
    init_logging();
    FinanceService::new(
        InMemoryStorage::new(),
        InMemoryLogging::new(),
        rates,
        notifier,
        SettlementSettings::default(),
    )
}

pub fn create_test_service() -> (TestService<Arc<CountingRateProvider>>, Arc<CountingRateProvider>, Arc<RecordingNotifier>) {
    let rates = Arc::new(CountingRateProvider::new());
    let notifier = Arc::new(RecordingNotifier::default());
    (service_with(rates.clone(), notifier.clone()), rates, notifier)
}

pub fn new_expense(payer: &str, amount: Decimal, currency: &str, payees: Payees) -> NewExpense {
    NewExpense {
        payer_id: payer.to_string(),
        amount,
        currency: currency.to_string(),
        payees,
        description: Some("Dinner".to_string()),
        date: None,
        category: None,
        location: None,
        is_paid: false,
    }
}

pub fn expense(id: &str, trip_id: &str, payer: &str, amount: Decimal, currency: &str, payees: Payees) -> Expense {
    Expense {
        id: id.to_string(),
        trip_id: trip_id.to_string(),
        payer_id: payer.to_string(),
        amount,
        currency: currency.to_string(),
        payees,
        description: None,
        date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        category: None,
        location: None,
        is_paid: false,
    }
}
