//! Currency-tagged monetary values.
//!
//! # Design Decisions
//! - Values are `rust_decimal::Decimal`, never floats
//! - Every comparison or sum between two values checks the currency first
//!   and fails with `MoneyError::CurrencyMismatch` instead of guessing

pub mod value;

pub use value::{Currency, Money, MoneyError};
