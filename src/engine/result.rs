//! Submission results and post-execute outcomes.

use serde::{Deserialize, Serialize};

use crate::banking::BankPaymentApproval;
use crate::money::Money;

/// Outcome of a submission the custodian accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TxResult {
    /// Transfer identified by an external transaction id.
    Hashed { tx_id: String, amount: Money },
    /// Custodial order with no on-ledger id.
    Unhashed { order_id: String, amount: Money },
}

impl TxResult {
    /// The external id or order id.
    pub fn id(&self) -> &str {
        match self {
            TxResult::Hashed { tx_id, .. } => tx_id,
            TxResult::Unhashed { order_id, .. } => order_id,
        }
    }

    pub fn amount(&self) -> &Money {
        match self {
            TxResult::Hashed { amount, .. } | TxResult::Unhashed { amount, .. } => amount,
        }
    }
}

/// What the caller must do after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostExecuteOutcome {
    /// Nothing further; the transaction is complete from the engine's side.
    Completed,
    /// The user must authorise the payment at their bank.
    NeedsApproval(BankPaymentApproval),
}
