//! Minor-unit money representation.
//!
//! The Store API transmits every price as an integer string in the
//! currency's smallest unit (e.g. `"4500"` pesewas) together with a
//! currency block describing how to render it. [`Money`] keeps the amount
//! as that integer and only converts to decimal at display time, so no
//! float arithmetic ever touches a price.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors from parsing or combining [`Money`] values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The minor-unit string did not parse as an integer.
    #[error("invalid minor-unit amount: {0:?}")]
    Parse(String),
    /// Arithmetic attempted across two different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Currency code of the left operand.
        left: String,
        /// Currency code of the right operand.
        right: String,
    },
    /// The operation overflowed the underlying integer.
    #[error("amount overflow")]
    Overflow,
}

/// Render metadata for a currency, as sent in Store API price blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    code: String,
    symbol: String,
    minor_unit: u32,
}

impl Currency {
    /// Create a currency from its code, display symbol, and minor-unit count.
    #[must_use]
    pub fn new(code: String, symbol: String, minor_unit: u32) -> Self {
        Self {
            code,
            symbol,
            minor_unit,
        }
    }

    /// ISO 4217 code, e.g. `GHS`.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Display symbol, e.g. `₵`.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of minor-unit digits (2 for GHS, 0 for JPY).
    #[must_use]
    pub const fn minor_unit(&self) -> u32 {
        self.minor_unit
    }
}

impl Default for Currency {
    /// The store's own currency.
    fn default() -> Self {
        Self::new("GHS".to_owned(), "₵".to_owned(), 2)
    }
}

/// A monetary amount in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Zero in the given currency.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Create from an already-parsed minor-unit amount.
    #[must_use]
    pub fn from_minor(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Parse a minor-unit amount string from the API.
    ///
    /// The API sends `""` for unset prices (e.g. `sale_price` on a product
    /// that is not on sale); that parses as zero.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Parse`] if the string is non-empty and not an
    /// integer.
    pub fn from_minor_str(s: &str, currency: Currency) -> Result<Self, MoneyError> {
        if s.is_empty() {
            return Ok(Self::zero(currency));
        }
        let amount = s
            .parse::<i64>()
            .map_err(|_| MoneyError::Parse(s.to_owned()))?;
        Ok(Self { amount, currency })
    }

    /// The raw minor-unit amount.
    #[must_use]
    pub const fn amount_minor(&self) -> i64 {
        self.amount
    }

    /// The currency this amount is denominated in.
    #[must_use]
    pub const fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Convert to a decimal in the currency's major unit.
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount, self.currency.minor_unit)
    }

    /// Format for display, e.g. `₵45.00`.
    ///
    /// Always renders exactly `minor_unit` decimal places; a zero-minor-unit
    /// currency renders with no decimal point.
    #[must_use]
    pub fn format(&self) -> String {
        let places = self.currency.minor_unit as usize;
        format!(
            "{}{:.*}",
            self.currency.symbol,
            places,
            self.to_decimal()
        )
    }

    /// Add two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] for differing currencies and
    /// [`MoneyError::Overflow`] if the sum does not fit in `i64`.
    pub fn checked_add(&self, other: &Self) -> Result<Self, MoneyError> {
        if self.currency.code != other.currency.code {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.code.clone(),
                right: other.currency.code.clone(),
            });
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self {
            amount,
            currency: self.currency.clone(),
        })
    }

    /// Multiply by a quantity (for line totals).
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the product does not fit in `i64`.
    pub fn checked_mul(&self, quantity: i64) -> Result<Self, MoneyError> {
        let amount = self
            .amount
            .checked_mul(quantity)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self {
            amount,
            currency: self.currency.clone(),
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ghs() -> Currency {
        Currency::default()
    }

    #[test]
    fn test_parse_minor_units() {
        let price = Money::from_minor_str("4500", ghs()).unwrap();
        assert_eq!(price.amount_minor(), 4500);
    }

    #[test]
    fn test_parse_empty_is_zero() {
        let price = Money::from_minor_str("", ghs()).unwrap();
        assert!(price.is_zero());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(matches!(
            Money::from_minor_str("45.00", ghs()),
            Err(MoneyError::Parse(_))
        ));
    }

    #[test]
    fn test_format_two_minor_units() {
        let price = Money::from_minor(4500, ghs());
        assert_eq!(price.format(), "₵45.00");
    }

    #[test]
    fn test_format_trailing_zeroes() {
        let price = Money::from_minor(4050, ghs());
        assert_eq!(price.format(), "₵40.50");
    }

    #[test]
    fn test_format_zero_minor_unit_currency() {
        let yen = Currency::new("JPY".to_owned(), "¥".to_owned(), 0);
        let price = Money::from_minor(4500, yen);
        assert_eq!(price.format(), "¥4500");
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_minor(1000, ghs());
        let b = Money::from_minor(250, ghs());
        assert_eq!(a.checked_add(&b).unwrap().amount_minor(), 1250);
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let a = Money::from_minor(1000, ghs());
        let b = Money::from_minor(1000, Currency::new("USD".to_owned(), "$".to_owned(), 2));
        assert!(matches!(
            a.checked_add(&b),
            Err(MoneyError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_checked_add_overflow() {
        let a = Money::from_minor(i64::MAX, ghs());
        let b = Money::from_minor(1, ghs());
        assert_eq!(a.checked_add(&b), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_checked_mul_line_total() {
        let unit = Money::from_minor(4500, ghs());
        assert_eq!(unit.checked_mul(3).unwrap().format(), "₵135.00");
    }

    #[test]
    fn test_checked_mul_overflow() {
        let unit = Money::from_minor(i64::MAX / 2, ghs());
        assert_eq!(unit.checked_mul(3), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_display_matches_format() {
        let price = Money::from_minor(199, ghs());
        assert_eq!(format!("{price}"), "₵1.99");
    }
}
