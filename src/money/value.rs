//! `Money` and `Currency` types.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by monetary arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Two values with different currencies were combined or compared.
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// Decimal arithmetic overflowed.
    #[error("Arithmetic overflow adding {left} and {right}")]
    Overflow { left: String, right: String },

    /// A currency code was empty or contained non-alphanumeric characters.
    #[error("Invalid currency code '{0}'")]
    InvalidCurrency(String),

    /// An amount string could not be parsed as a decimal.
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),
}

/// An upper-case currency code, e.g. `GBP` or `BTC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a currency from a code, normalising to upper case.
    pub fn new(code: &str) -> Result<Self, MoneyError> {
        let code = code.trim();
        if code.is_empty() || code.len() > 10 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(MoneyError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// The currency code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// A decimal amount tagged with its currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    value: Decimal,
    currency: Currency,
}

impl Money {
    /// Create a value in the given currency.
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// Zero in the given currency.
    pub fn zero(currency: &Currency) -> Self {
        Self::new(Decimal::ZERO, currency.clone())
    }

    /// Whole units of the currency (e.g. pounds, not pence).
    pub fn from_major(units: i64, currency: &Currency) -> Self {
        Self::new(Decimal::from(units), currency.clone())
    }

    /// Parse a decimal string such as `"100.50"`.
    pub fn parse(amount: &str, currency: &Currency) -> Result<Self, MoneyError> {
        let value = Decimal::from_str(amount.trim())
            .map_err(|_| MoneyError::InvalidAmount(amount.to_string()))?;
        Ok(Self::new(value, currency.clone()))
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn currency_code(&self) -> &str {
        self.currency.code()
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_sign_negative() && !self.value.is_zero()
    }

    /// Compare two values of the same currency.
    pub fn try_cmp(&self, other: &Money) -> Result<Ordering, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.value.cmp(&other.value))
    }

    pub fn is_less_than(&self, other: &Money) -> Result<bool, MoneyError> {
        Ok(self.try_cmp(other)? == Ordering::Less)
    }

    pub fn is_greater_than(&self, other: &Money) -> Result<bool, MoneyError> {
        Ok(self.try_cmp(other)? == Ordering::Greater)
    }

    /// Sum of two values of the same currency.
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let value = self.value.checked_add(other.value).ok_or_else(|| MoneyError::Overflow {
            left: self.to_string(),
            right: other.to_string(),
        })?;
        Ok(Self::new(value, self.currency.clone()))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.to_string(),
                right: other.currency.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}
