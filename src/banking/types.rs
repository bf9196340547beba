//! Banking domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::{Currency, Money};

/// Funding currencies whose bank transfers need an open-banking redirect.
pub const OPEN_BANKING_CURRENCIES: &[&str] = &["EUR", "GBP"];

/// Whether transfers funded in `currency` must be authorised by the user's
/// bank before funds move.
pub fn is_open_banking_currency(currency: &Currency) -> bool {
    OPEN_BANKING_CURRENCIES.contains(&currency.code())
}

/// Banking partner that brokers a linked bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankPartner {
    /// Open-banking partner used for EUR/GBP payments.
    Yapily,
}

/// What the redirect is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankTransferAction {
    Pay,
}

impl fmt::Display for BankPartner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankPartner::Yapily => f.write_str("yapily"),
        }
    }
}

impl fmt::Display for BankTransferAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankTransferAction::Pay => f.write_str("pay"),
        }
    }
}

/// Callback descriptor sent with a transfer that needs redirection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransferCallback {
    pub partner: BankPartner,
    pub action: BankTransferAction,
    /// Where the bank sends the user after authorisation.
    pub redirect_url: String,
}

/// A bank as known to the custodian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedBank {
    pub id: String,
    pub name: String,
    pub account_number: String,
    pub account_type: String,
    pub currency: Currency,
    pub partner: BankPartner,
}

/// Everything the presentation layer needs to send the user to their bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankPaymentApproval {
    pub payment_id: String,
    pub authorisation_url: String,
    pub linked_bank: LinkedBank,
    pub amount: Money,
}
