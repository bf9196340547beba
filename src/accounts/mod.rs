//! Account abstractions.
//!
//! # Data Flow
//! ```text
//! caller picks source + target Account
//!     → AccountKind (registry key)
//!     → engine checks capability variants at every stage
//!     → receive_address() resolved at execute time
//! ```
//!
//! # Design Decisions
//! - Closed enum of account variants; engines match on the variant they need
//! - Balances are snapshots supplied by the account provider, not live reads

pub mod types;

pub use types::{
    Account, AccountError, AccountKind, FiatAccount, LinkedBankAccount, ReceiveAddress,
    WalletAccount,
};
