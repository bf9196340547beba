//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the custodial manager:
//!     → timeouts.rs (enforce per-call deadline)
//!
//! Waiting on an external system (bank authorisation):
//!     → poll.rs (produce until ready, bounded by attempts/deadline)
//!     → backoff.rs (fixed or exponential delay between attempts)
//!     → cancel.rs (caller-owned cancellation)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No automatic retries outside the poller
//! - Cancellation is explicit and owned by the flow's caller

pub mod backoff;
pub mod cancel;
pub mod poll;
pub mod timeouts;

pub use cancel::CancelToken;
pub use poll::{PollError, PollHandle, PollSettings, Poller};
pub use timeouts::{with_deadline, TimeoutError};
