//! Custodial backend collaborator.
//!
//! # Data Flow
//! ```text
//! engine
//!     → manager.rs trait (limits, fees, transfers, charges, linked banks)
//!     → production implementation (host application)
//!       or memory.rs (simulator, tests)
//! ```

pub mod manager;
pub mod memory;

pub use manager::{BankTransferCharge, CustodialWalletManager, ProviderError, TransferLimits};
pub use memory::{InMemoryCustodialManager, TransferRecord, WithdrawOrder};
