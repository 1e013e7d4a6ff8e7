use crate::error::PaymentError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency code of the platform's internal token.
pub const BTN: &str = "BTN";

const CARD_FEE_RATE: Decimal = dec!(0.029);
const CARD_FEE_FIXED: Decimal = dec!(0.30);

/// Represents a positive monetary amount for payments.
///
/// Ensures that requested amounts are always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts the amount into the processor's integer minor units
    /// (cents), rounding half away from zero.
    pub fn to_minor_units(&self) -> Result<i64, PaymentError> {
        let minor = self
            .0
            .checked_mul(dec!(100))
            .ok_or_else(|| PaymentError::ValidationError("Amount out of range".to_string()))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| PaymentError::ValidationError("Amount out of range".to_string()))?;
        if minor > 0 {
            Ok(minor)
        } else {
            Err(PaymentError::ValidationError(
                "Amount is below the smallest chargeable unit".to_string(),
            ))
        }
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Processing fee charged on a card payment: 2.9% plus 0.30, rounded to
/// two decimals. Independent of the fee the processor actually reports.
pub fn card_fee(amount: Amount) -> Decimal {
    (amount.0 * CARD_FEE_RATE + CARD_FEE_FIXED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Opaque identifier of a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Result<Self, PaymentError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(PaymentError::ValidationError(
                "User id must not be blank".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Three-letter ISO currency code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn parse(raw: &str) -> Result<Self, PaymentError> {
        let code = raw.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(PaymentError::ValidationError(format!(
                "Invalid currency code: {raw:?}"
            )))
        }
    }

    pub fn btn() -> Self {
        Self(BTN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The lower-case form card processors expect.
    pub fn to_processor_code(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(PaymentError::ValidationError(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(PaymentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_minor_units_rounding() {
        let amount = Amount::new(dec!(19.99)).unwrap();
        assert_eq!(amount.to_minor_units().unwrap(), 1999);

        let amount = Amount::new(dec!(10.005)).unwrap();
        assert_eq!(amount.to_minor_units().unwrap(), 1001);
    }

    #[test]
    fn test_minor_units_rejects_sub_cent() {
        let amount = Amount::new(dec!(0.004)).unwrap();
        assert!(matches!(
            amount.to_minor_units(),
            Err(PaymentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_minor_units_rejects_overflow() {
        let amount = Amount::new(Decimal::MAX).unwrap();
        assert!(matches!(
            amount.to_minor_units(),
            Err(PaymentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_card_fee_formula() {
        assert_eq!(card_fee(Amount::new(dec!(19.99)).unwrap()), dec!(0.88));
        assert_eq!(card_fee(Amount::new(dec!(100)).unwrap()), dec!(3.20));
        // 0.5 * 0.029 + 0.30 = 0.3145 -> 0.31
        assert_eq!(card_fee(Amount::new(dec!(0.5)).unwrap()), dec!(0.31));
        // 50 * 0.029 + 0.30 = 1.75 exactly, no rounding needed
        assert_eq!(card_fee(Amount::new(dec!(50)).unwrap()), dec!(1.75));
    }

    #[test]
    fn test_card_fee_rounds_half_away_from_zero() {
        // 5 * 0.029 + 0.30 = 0.445; banker's rounding would give 0.44
        assert_eq!(card_fee(Amount::new(dec!(5)).unwrap()), dec!(0.45));
    }

    #[test]
    fn test_user_id_rejects_blank() {
        assert!(UserId::new("user-1").is_ok());
        assert!(matches!(
            UserId::new("   "),
            Err(PaymentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_currency_parse() {
        let usd = Currency::parse("usd").unwrap();
        assert_eq!(usd.as_str(), "USD");
        assert_eq!(usd.to_processor_code(), "usd");
        assert!(Currency::parse("dollars").is_err());
        assert!(Currency::parse("U$D").is_err());
    }
}
