//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap custodial manager calls with a deadline
//! - Cancel the wrapped call cleanly on timeout (the future is dropped)
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from provider errors

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// A call did not complete before its deadline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} timed out after {limit:?}")]
pub struct TimeoutError {
    pub operation: &'static str,
    pub limit: Duration,
}

/// Run `fut`, failing with `TimeoutError` if it takes longer than `limit`.
pub async fn with_deadline<F, T>(operation: &'static str, limit: Duration, fut: F) -> Result<T, TimeoutError>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(value) => Ok(value),
        Err(_) => {
            tracing::warn!(operation, limit_ms = limit.as_millis() as u64, "Call exceeded deadline");
            Err(TimeoutError { operation, limit })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let value = with_deadline("fast", Duration::from_secs(1), async { 7 }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_times_out() {
        let err = with_deadline("slow", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
        })
        .await
        .unwrap_err();
        assert_eq!(err.operation, "slow");
        assert!(err.to_string().starts_with("slow timed out"));
    }
}
