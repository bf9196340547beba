//! Metrics collection.
//!
//! # Responsibilities
//! - Define engine metrics (stage transitions, validation outcomes, submissions, polls)
//! - Record through the `metrics` facade; the host application installs an exporter
//!
//! # Metrics
//! - `txengine_stage_transitions_total` (counter): by engine, stage
//! - `txengine_validations_total` (counter): by engine, state
//! - `txengine_submissions_total` (counter): by engine, outcome
//! - `txengine_poll_sessions_total` (counter): by outcome
//! - `txengine_poll_attempts` (histogram): produce calls per session
//!
//! # Design Decisions
//! - Labels are small fixed sets (engine name, enum names), never ids or amounts

use metrics::{counter, histogram};

/// Record a pipeline stage reached by a flow.
pub fn record_stage(engine: &'static str, stage: &'static str) {
    counter!("txengine_stage_transitions_total", "engine" => engine, "stage" => stage).increment(1);
}

/// Record the outcome of a validation pass.
pub fn record_validation(engine: &'static str, state: &'static str) {
    counter!("txengine_validations_total", "engine" => engine, "state" => state).increment(1);
}

/// Record a submission attempt and whether the custodian accepted it.
pub fn record_submission(engine: &'static str, accepted: bool) {
    let outcome = if accepted { "accepted" } else { "failed" };
    counter!("txengine_submissions_total", "engine" => engine, "outcome" => outcome).increment(1);
}

/// Record the end of a poll session.
pub fn record_poll_session(outcome: &'static str, attempts: u32) {
    counter!("txengine_poll_sessions_total", "outcome" => outcome).increment(1);
    histogram!("txengine_poll_attempts").record(f64::from(attempts));
}
