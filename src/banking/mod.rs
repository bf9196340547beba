//! Bank partner integration types.
//!
//! # Responsibilities
//! - Describe linked banks and the approvals an open-banking payment needs
//! - Provide the callback descriptor attached to redirect-based transfers
//! - Decide which funding currencies require open-banking redirection

pub mod callback;
pub mod types;

pub use callback::{BankPartnerCallbackProvider, CallbackUrlError, ConfiguredCallbackProvider};
pub use types::{
    is_open_banking_currency, BankPartner, BankPaymentApproval, BankTransferAction,
    BankTransferCallback, LinkedBank, OPEN_BANKING_CURRENCIES,
};
