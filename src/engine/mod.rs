//! Transaction engine subsystem.
//!
//! # Data Flow
//! ```text
//! registry.rs  (source kind, target kind, action) → Box<dyn TxEngine>
//!     → processor.rs start: initialise_tx
//!     → update_amount / update_fee_level
//!     → validate (validation.rs)
//!     → build_confirmations (confirmation.rs)
//!     → execute → TxResult
//!     → post_execute → Completed | NeedsApproval
//! ```
//!
//! # Responsibilities
//! - Model an in-progress transaction (`PendingTx`) and its pipeline stage
//! - Implement per-use-case engines behind the `TxEngine` trait
//! - Keep validation outcomes in `ValidationState`, not in errors
//!
//! # Design Decisions
//! - Engines are stateless between calls apart from their bound accounts
//! - Shared collaborators live in `EngineContext`, cloned into each engine
//! - Errors after submission carry the submitted id (`PostExecuteError`)

pub mod confirmation;
pub mod context;
pub mod error;
pub mod fiat_deposit;
pub mod fiat_withdraw;
pub mod pending;
pub mod processor;
pub mod registry;
pub mod result;
pub mod traits;
pub mod types;
pub mod validation;

pub use confirmation::{ConfirmationsBuilder, TxConfirmation};
pub use context::{Deadlines, EngineContext};
pub use error::{PostExecuteError, TxEngineError};
pub use fiat_deposit::FiatDepositTxEngine;
pub use fiat_withdraw::FiatWithdrawTxEngine;
pub use pending::PendingTx;
pub use processor::{FlowError, FlowOutcome, TransactionProcessor};
pub use registry::{EngineKey, EngineRegistry};
pub use result::{PostExecuteOutcome, TxResult};
pub use traits::TxEngine;
pub use types::{AssetAction, FeeLevel, FeeSelection, TxLimit, TxStage, ValidationState};
