//! Custodial wallet manager interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::banking::{BankTransferCallback, LinkedBank};
use crate::money::{Currency, Money};

/// Errors reported by the custodial backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The requested record does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// The backend could not be reached or answered with a server error.
    #[error("Custodial backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request.
    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Transfer limits for a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLimits {
    pub min: Money,
    /// `None` when the backend imposes no maximum.
    pub max: Option<Money>,
}

/// Charge record of a started bank transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransferCharge {
    /// Payment id returned by `start_bank_transfer`.
    pub payment_id: String,
    /// Linked bank the charge is drawn against.
    pub linked_bank_id: String,
    pub amount: Money,
    /// Present once the bank partner is ready for the user to authorise.
    pub authorisation_url: Option<String>,
}

/// Backend operations the engines depend on.
#[async_trait]
pub trait CustodialWalletManager: Send + Sync {
    /// Min/max transfer limits for a funding currency.
    async fn get_bank_transfer_limits(
        &self,
        currency: &Currency,
        only_open_banking: bool,
    ) -> Result<TransferLimits, ProviderError>;

    /// Start a bank transfer and return its payment id.
    async fn start_bank_transfer(
        &self,
        address: &str,
        amount: &Money,
        currency_code: &str,
        callback: Option<BankTransferCallback>,
    ) -> Result<String, ProviderError>;

    async fn get_bank_transfer_charge(&self, payment_id: &str) -> Result<BankTransferCharge, ProviderError>;

    async fn get_linked_bank(&self, id: &str) -> Result<LinkedBank, ProviderError>;

    /// Flat fee charged for withdrawing `currency` to a bank.
    async fn get_withdrawal_fee(&self, currency: &Currency) -> Result<Money, ProviderError>;

    /// Place a withdrawal order and return its order id.
    async fn create_withdraw_order(&self, bank_id: &str, amount: &Money) -> Result<String, ProviderError>;
}
