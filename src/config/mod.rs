//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EngineConfig (validated, immutable)
//!     → poll settings, deadlines and callback provider built from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::EngineConfig;
pub use schema::BankingConfig;
pub use schema::DelayStrategy;
pub use schema::ObservabilityConfig;
pub use schema::PollConfig;
pub use schema::TimeoutConfig;
