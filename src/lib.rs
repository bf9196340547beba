//! Wallet transaction execution engine library.

pub mod accounts;
pub mod banking;
pub mod config;
pub mod custodial;
pub mod engine;
pub mod money;
pub mod observability;
pub mod resilience;

pub use config::schema::EngineConfig;
pub use engine::{EngineRegistry, TransactionProcessor, TxEngine};
pub use resilience::CancelToken;
