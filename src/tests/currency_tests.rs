use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use super::{CountingRateProvider, FailingRateProvider, init_logging};
use crate::core::currency::{ConversionResult, CurrencyConverter, RateProvider};
use crate::core::errors::SettleError;
use crate::infrastructure::notify::HttpEmailNotifier;
use crate::infrastructure::rates::{ExchangeRateApiProvider, StaticRateProvider};

#[tokio::test]
async fn test_convert_uses_provider_rate() {
    let converter = CurrencyConverter::new(CountingRateProvider::new());
    let amount = converter.convert(dec!(10), "EUR", "SGD").await.unwrap();
    assert_eq!(amount, dec!(15.0));
}

#[tokio::test]
async fn test_same_currency_is_identity_without_lookup() {
    let provider = Arc::new(CountingRateProvider::new());
    let converter = CurrencyConverter::new(provider.clone());

    assert_eq!(converter.rate("SGD", "SGD").await.unwrap(), Decimal::ONE);
    assert_eq!(converter.convert(dec!(42.42), "SGD", "SGD").await.unwrap(), dec!(42.42));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_missing_pair_is_rate_unavailable() {
    let converter = CurrencyConverter::new(CountingRateProvider::new());
    let err = converter.convert(dec!(1), "EUR", "JPY").await.unwrap_err();
    assert!(matches!(
        err,
        SettleError::RateUnavailable { ref from, ref to, .. } if from == "EUR" && to == "JPY"
    ));
}

#[tokio::test]
async fn test_fallback_is_explicit_and_one_to_one() {
    init_logging();
    let converter = CurrencyConverter::new(FailingRateProvider);

    let result = converter.convert_or_fallback(dec!(80), "USD", "SGD").await;
    assert!(result.is_fallback());
    assert_eq!(result.amount(), dec!(80));
    match result {
        ConversionResult::Fallback { used_rate, reason, .. } => {
            assert_eq!(used_rate, Decimal::ONE);
            assert!(reason.contains("USD->SGD"));
        }
        other => panic!("expected fallback, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fallback_not_used_when_provider_answers() {
    let converter = CurrencyConverter::new(CountingRateProvider::new());
    let result = converter.convert_or_fallback(dec!(100), "USD", "SGD").await;
    assert_eq!(
        result,
        ConversionResult::Converted {
            rate: dec!(1.35),
            amount: dec!(135.00),
        }
    );
}

#[test]
fn test_conversion_result_serializes_with_status_tag() {
    let json = serde_json::to_value(ConversionResult::Fallback {
        used_rate: Decimal::ONE,
        amount: dec!(5),
        reason: "down".to_string(),
    })
    .unwrap();
    assert_eq!(json["status"], "fallback");
    assert_eq!(json["used_rate"], 1.0);
}

#[tokio::test]
async fn test_static_rates_parse_and_answer_inverse() {
    let provider = StaticRateProvider::parse("eur:sgd=1.5, USD:SGD=1.25").unwrap();

    assert_eq!(provider.latest_rate("EUR", "SGD").await.unwrap(), dec!(1.5));
    assert_eq!(provider.latest_rate("SGD", "USD").await.unwrap(), dec!(0.8));
    assert!(provider.latest_rate("GBP", "SGD").await.is_err());
}

#[test]
fn test_static_rates_reject_malformed_entries() {
    assert!(StaticRateProvider::parse("EUR-SGD=1.5").is_err());
    assert!(StaticRateProvider::parse("EUR:SGD=abc").is_err());
    assert!(StaticRateProvider::parse("").is_ok());
}

#[test]
fn test_http_clients_build_with_configured_timeout() {
    let timeout = std::time::Duration::from_secs(5);
    assert!(
        ExchangeRateApiProvider::new("https://rates.example.com/v6/".to_string(), "key".to_string(), timeout).is_ok()
    );
    assert!(HttpEmailNotifier::new("https://mail.example.com/send".to_string(), timeout).is_ok());
}
