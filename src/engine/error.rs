//! Engine error definitions.

use thiserror::Error;

use crate::accounts::{AccountError, AccountKind};
use crate::custodial::ProviderError;
use crate::engine::types::AssetAction;
use crate::money::MoneyError;
use crate::resilience::{PollError, TimeoutError};

/// Errors that can occur in an engine stage.
#[derive(Debug, Error)]
pub enum TxEngineError {
    /// Wrong account variant bound, illegal fee level, or a negative amount.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// No engine handles this source/target/action combination.
    #[error("No engine for {action} from {from} to {to}")]
    Unsupported {
        from: AccountKind,
        to: AccountKind,
        action: AssetAction,
    },

    /// The custodial backend failed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A custodial call exceeded its deadline.
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    /// The backend answered with something structurally wrong, or never
    /// returned an authorisation url while the approval poll ran.
    #[error("Invalid external response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Account(#[from] AccountError),

    /// The flow's cancel token fired.
    #[error("Cancelled")]
    Cancelled,
}

impl TxEngineError {
    /// Fail with `Precondition` unless `condition` holds.
    pub fn check(condition: bool, message: impl FnOnce() -> String) -> Result<(), TxEngineError> {
        if condition {
            Ok(())
        } else {
            Err(TxEngineError::Precondition(message()))
        }
    }

    /// Map the end of an approval poll session.
    pub fn from_approval_poll(payment_id: &str, err: PollError<TxEngineError>) -> TxEngineError {
        match err {
            PollError::TimedOut { attempts } => TxEngineError::InvalidResponse(format!(
                "no authorisation url returned for payment {} after {} attempts",
                payment_id, attempts
            )),
            PollError::Cancelled { .. } => TxEngineError::Cancelled,
            PollError::Producer { source, .. } => source,
            PollError::Aborted(reason) => {
                TxEngineError::InvalidResponse(format!("approval poll aborted: {}", reason))
            }
        }
    }
}

/// Failure after the custodian accepted the submission.
///
/// Funds may already be in flight; `tx_id` identifies the submitted transfer.
#[derive(Debug, Error)]
#[error("Transfer {tx_id} was submitted but post-execute failed: {cause}")]
pub struct PostExecuteError {
    pub tx_id: String,
    #[source]
    pub cause: TxEngineError,
}
