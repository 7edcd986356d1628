use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::core::errors::SettleError;

/// Balances and transfers below this are treated as settled.
pub const EPSILON: Decimal = dec!(0.01);

pub const MONEY_DP: u32 = 2;

pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

pub fn is_negligible(amount: Decimal) -> bool {
    amount.abs() < EPSILON
}

/// Upper-cases and checks an ISO-style three-letter code.
pub fn normalize_currency(code: &str) -> Result<String, SettleError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SettleError::InvalidCurrency(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.35));
        assert_eq!(round_money(dec!(-2.345)), dec!(-2.35));
        assert_eq!(round_money(dec!(33.333333)), dec!(33.33));
    }

    #[test]
    fn currency_codes_are_upper_cased() {
        assert_eq!(normalize_currency(" sgd ").unwrap(), "SGD");
        assert!(matches!(normalize_currency("EURO"), Err(SettleError::InvalidCurrency(_))));
        assert!(matches!(normalize_currency("U$D"), Err(SettleError::InvalidCurrency(_))));
    }
}
