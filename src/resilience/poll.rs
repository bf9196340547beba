//! Retry-until-ready polling.
//!
//! # Responsibilities
//! - Call a producer repeatedly until a predicate accepts its value, or
//!   until an extractor pulls a ready value out of it
//! - Bound the session by attempt count and an optional overall deadline
//! - Stop producing as soon as the session's `CancelToken` fires
//!
//! # Design Decisions
//! - Produce calls are sequential: at most one in flight per session
//! - Producer errors end the session; retrying them is the producer's concern
//! - `spawn` runs a session on its own task and hands back a `PollHandle`

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config::PollConfig;
use crate::observability::metrics;
use crate::resilience::backoff::PollDelay;
use crate::resilience::cancel::CancelToken;

/// Why a poll session ended without a ready value.
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// The predicate never accepted a value within the attempt or time bound.
    #[error("Poll timed out after {attempts} attempts")]
    TimedOut { attempts: u32 },

    /// The session's cancel token fired.
    #[error("Poll cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    /// The producer failed.
    #[error("Poll producer failed on attempt {attempt}: {source}")]
    Producer {
        attempt: u32,
        #[source]
        source: E,
    },

    /// The task running a spawned session panicked or was aborted.
    #[error("Poll task aborted: {0}")]
    Aborted(String),
}

/// Runtime form of `PollConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub delay: PollDelay,
    pub timeout: Option<Duration>,
}

impl From<&PollConfig> for PollSettings {
    fn from(config: &PollConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: PollDelay::from(config),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Generic retry-until-predicate primitive.
#[derive(Debug, Clone)]
pub struct Poller {
    settings: PollSettings,
}

impl Poller {
    pub fn new(settings: PollSettings) -> Self {
        Self { settings }
    }

    /// Poll until `is_ready` accepts a produced value, returning that value.
    pub async fn poll_until<T, E, F, Fut, P>(
        &self,
        produce: F,
        is_ready: P,
        cancel: &CancelToken,
    ) -> Result<T, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&T) -> bool,
    {
        self.poll_map(produce, |value: T| is_ready(&value).then_some(value), cancel)
            .await
    }

    /// Poll until `extract` pulls a ready value out of a produced one.
    ///
    /// Values `extract` turns into `None` are dropped and the session
    /// waits for the next attempt.
    pub async fn poll_map<T, U, E, F, Fut, X>(
        &self,
        mut produce: F,
        mut extract: X,
        cancel: &CancelToken,
    ) -> Result<U, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        X: FnMut(T) -> Option<U>,
    {
        let mut attempts = 0u32;
        let run = self.run_attempts(&mut produce, &mut extract, cancel, &mut attempts);

        let result = match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.ok(),
            None => Some(run.await),
        };

        let result = result.unwrap_or(Err(PollError::TimedOut { attempts }));
        let outcome = match &result {
            Ok(_) => "ready",
            Err(PollError::TimedOut { .. }) => "timed_out",
            Err(PollError::Cancelled { .. }) => "cancelled",
            Err(_) => "failed",
        };
        metrics::record_poll_session(outcome, attempts);
        result
    }

    async fn run_attempts<T, U, E, F, Fut, X>(
        &self,
        produce: &mut F,
        extract: &mut X,
        cancel: &CancelToken,
        attempts: &mut u32,
    ) -> Result<U, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        X: FnMut(T) -> Option<U>,
    {
        loop {
            if cancel.is_cancelled() {
                return Err(PollError::Cancelled { attempts: *attempts });
            }

            *attempts += 1;
            let attempt = *attempts;
            let value = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PollError::Cancelled { attempts: attempt }),
                produced = produce() => produced.map_err(|source| PollError::Producer { attempt, source })?,
            };

            if let Some(ready) = extract(value) {
                tracing::debug!(attempt, "Poll predicate satisfied");
                return Ok(ready);
            }

            if attempt >= self.settings.max_attempts {
                tracing::warn!(attempt, "Poll attempts exhausted");
                return Err(PollError::TimedOut { attempts: attempt });
            }

            let delay = self.settings.delay.delay_for(attempt);
            tracing::trace!(attempt, delay_ms = delay.as_millis() as u64, "Value not ready, waiting");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PollError::Cancelled { attempts: attempt }),
                _ = sleep(delay) => {}
            }
        }
    }

    /// Run a poll session on its own task.
    ///
    /// The returned handle owns a fresh cancel token for the session.
    pub fn spawn<T, E, F, Fut, P>(self, produce: F, is_ready: P) -> PollHandle<T, E>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let cancel = CancelToken::new();
        let session_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            self.poll_until(produce, is_ready, &session_cancel).await
        });
        PollHandle { cancel, task }
    }
}

/// Handle to a spawned poll session.
pub struct PollHandle<T, E> {
    cancel: CancelToken,
    task: JoinHandle<Result<T, PollError<E>>>,
}

impl<T, E> PollHandle<T, E> {
    /// Stop the session. No produce call starts after this returns.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the session to end.
    pub async fn wait(self) -> Result<T, PollError<E>> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(PollError::Aborted(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Reading {
        name: &'static str,
        ready: bool,
    }

    fn fast_poller(max_attempts: u32) -> Poller {
        Poller::new(PollSettings {
            max_attempts,
            delay: PollDelay::Fixed(Duration::from_millis(1)),
            timeout: None,
        })
    }

    fn scripted(calls: Arc<AtomicU32>) -> impl FnMut() -> std::future::Ready<Result<Reading, Infallible>> {
        let script = [
            Reading { name: "A", ready: false },
            Reading { name: "B", ready: false },
            Reading { name: "C", ready: true },
        ];
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) as usize;
            std::future::ready(Ok(script[n.min(2)].clone()))
        }
    }

    #[tokio::test]
    async fn test_completes_with_first_ready_value() {
        let calls = Arc::new(AtomicU32::new(0));
        let value = fast_poller(10)
            .poll_until(scripted(calls.clone()), |r: &Reading| r.ready, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(value.name, "C");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_poll_map_returns_extracted_value() {
        let calls = Arc::new(AtomicU32::new(0));
        let name = fast_poller(10)
            .poll_map(
                scripted(calls.clone()),
                |r: Reading| r.ready.then_some(r.name),
                &CancelToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(name, "C");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempts_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));
        let err = fast_poller(2)
            .poll_until(scripted(calls.clone()), |r: &Reading| r.ready, &CancelToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::TimedOut { attempts: 2 }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_overall_timeout() {
        let poller = Poller::new(PollSettings {
            max_attempts: 1000,
            delay: PollDelay::Fixed(Duration::from_millis(20)),
            timeout: Some(Duration::from_millis(50)),
        });
        let err = poller
            .poll_until(
                || async { Ok::<_, Infallible>(false) },
                |ready: &bool| *ready,
                &CancelToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::TimedOut { .. }));
    }

    #[tokio::test]
    async fn test_cancel_after_first_call_stops_production() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancelToken::new();
        let producer_calls = calls.clone();
        let producer_cancel = cancel.clone();

        let err = fast_poller(10)
            .poll_until(
                move || {
                    producer_calls.fetch_add(1, Ordering::SeqCst);
                    producer_cancel.cancel();
                    async { Ok::<_, Infallible>(false) }
                },
                |ready: &bool| *ready,
                &cancel,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled { attempts: 1 }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_spawned_session_cancel() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let poller = Poller::new(PollSettings {
            max_attempts: 1000,
            delay: PollDelay::Fixed(Duration::from_secs(5)),
            timeout: None,
        });

        let handle = poller.spawn(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, Infallible>(false) }
            },
            |ready: &bool| *ready,
        );

        while calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        handle.cancel();

        let err = tokio::time::timeout(Duration::from_secs(1), handle.wait())
            .await
            .expect("cancel should interrupt the delay")
            .unwrap_err();
        assert!(matches!(err, PollError::Cancelled { attempts: 1 }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_producer_error_ends_session() {
        let err = fast_poller(10)
            .poll_until(
                || async { Err::<bool, _>("charge endpoint down") },
                |ready: &bool| *ready,
                &CancelToken::new(),
            )
            .await
            .unwrap_err();
        match err {
            PollError::Producer { attempt, source } => {
                assert_eq!(attempt, 1);
                assert_eq!(source, "charge endpoint down");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_settings_from_config() {
        let config = PollConfig {
            max_attempts: 0,
            timeout_secs: None,
            ..PollConfig::default()
        };
        let settings = PollSettings::from(&config);
        assert_eq!(settings.max_attempts, 1);
        assert_eq!(settings.timeout, None);
    }
}
