//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engines, processor and poller produce:
//!     → tracing events (structured fields: engine, stage, tx_id)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → whatever metrics recorder the host application installs
//! ```

pub mod logging;
pub mod metrics;
