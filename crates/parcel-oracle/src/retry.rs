use crate::backends::CompletionBackend;
use async_trait::async_trait;
use parcel_core::{Message, OracleError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Type alias for the injectable sleep function used in tests.
#[cfg(test)]
type SleepFn = Box<
    dyn Fn(u64) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> + Send + Sync,
>;

/// Configures retry behaviour for oracle calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Maximum delay in milliseconds (cap for exponential backoff).
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    /// Pick the actual wait uniformly from `[0, delay]`.
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    60_000
}

fn default_jitter() -> bool {
    true
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            jitter: default_jitter(),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without waiting. Intended for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_base_ms: 0,
            backoff_max_ms: 0,
            jitter: false,
        }
    }
}

/// Computes the backoff delay for a given attempt using exponential backoff
/// capped at `backoff_max_ms`.
pub fn compute_backoff(policy: &RetryPolicy, attempt: u32) -> u64 {
    let delay = policy
        .backoff_base_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    delay.min(policy.backoff_max_ms)
}

fn wait_for(policy: &RetryPolicy, attempt: u32) -> u64 {
    let delay = compute_backoff(policy, attempt);
    if policy.jitter && delay > 0 {
        rand::thread_rng().gen_range(0..=delay)
    } else {
        delay
    }
}

/// A [`CompletionBackend`] that retries its inner backend with exponential
/// backoff.
///
/// Every failure is retried until `max_attempts` is reached, except failures
/// that [`OracleError::is_retryable`] rejects (context exhaustion), which are
/// returned immediately. On exhaustion the last classified error is returned.
pub struct RetryingBackend {
    inner: Box<dyn CompletionBackend>,
    policy: RetryPolicy,
    /// Injectable sleep function for testing (allows skipping real delays).
    #[cfg(test)]
    sleep_fn: Option<SleepFn>,
}

impl RetryingBackend {
    pub fn new(inner: Box<dyn CompletionBackend>, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            #[cfg(test)]
            sleep_fn: None,
        }
    }

    /// The wrapped backend, for single un-retried calls.
    pub fn inner(&self) -> &dyn CompletionBackend {
        self.inner.as_ref()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn do_sleep(&self, ms: u64) {
        #[cfg(test)]
        if let Some(ref f) = self.sleep_fn {
            f(ms).await;
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    }
}

#[async_trait]
impl CompletionBackend for RetryingBackend {
    async fn complete(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String, OracleError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_err: Option<OracleError> = None;

        for attempt in 0..attempts {
            match self.inner.complete(messages, max_tokens).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    if !e.is_retryable() {
                        warn!(attempt = attempt + 1, error = %e, "Non-retryable oracle error, giving up");
                        return Err(e);
                    }

                    if attempt + 1 < attempts {
                        let delay = wait_for(&self.policy, attempt);
                        info!(
                            tries = attempt + 1,
                            delay_ms = delay,
                            error = %e,
                            "Backing off before retrying oracle call"
                        );
                        self.do_sleep(delay).await;
                    }
                    last_err = Some(e);
                }
            }
        }

        let err = last_err.unwrap_or_else(|| OracleError::Unexpected("no attempts made".into()));
        warn!(attempts, error = %err, "Oracle retries exhausted");
        Err(err)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// A mock backend that returns a sequence of results.
    struct MockBackend {
        results: tokio::sync::Mutex<Vec<Result<String, OracleError>>>,
        call_count: Arc<AtomicU32>,
    }

    impl MockBackend {
        fn new(results: Vec<Result<String, OracleError>>) -> (Self, Arc<AtomicU32>) {
            let count = Arc::new(AtomicU32::new(0));
            (
                Self {
                    results: tokio::sync::Mutex::new(results),
                    call_count: count.clone(),
                },
                count,
            )
        }
    }

    #[async_trait]
    impl CompletionBackend for MockBackend {
        async fn complete(
            &self,
            _messages: &[Message],
            _max_tokens: Option<u32>,
        ) -> Result<String, OracleError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let mut results = self.results.lock().await;
            if results.is_empty() {
                Err(OracleError::Unexpected("MockBackend: no more results".into()))
            } else {
                results.remove(0)
            }
        }
    }

    fn recording_backend(
        results: Vec<Result<String, OracleError>>,
        policy: RetryPolicy,
    ) -> (RetryingBackend, Arc<AtomicU32>, Arc<Mutex<Vec<u64>>>) {
        let (mock, calls) = MockBackend::new(results);
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let recorded = sleeps.clone();
        let backend = RetryingBackend {
            inner: Box::new(mock),
            policy,
            sleep_fn: Some(Box::new(move |ms| {
                recorded.lock().unwrap().push(ms);
                Box::pin(async {}) as Pin<Box<dyn Future<Output = ()> + Send>>
            })),
        };
        (backend, calls, sleeps)
    }

    fn no_jitter() -> RetryPolicy {
        RetryPolicy {
            jitter: false,
            ..RetryPolicy::default()
        }
    }

    // ── retry succeeds on second attempt ────────────────────────────────

    #[tokio::test]
    async fn retry_succeeds_on_second_try() {
        let (backend, calls, sleeps) = recording_backend(
            vec![
                Err(OracleError::RateLimited("429 Too Many Requests".into())),
                Ok("ok".into()),
            ],
            no_jitter(),
        );

        let text = backend.complete(&[], None).await.unwrap();
        assert_eq!(text, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*sleeps.lock().unwrap(), vec![1_000]);
    }

    // ── five attempts total, then the last error ────────────────────────

    #[tokio::test]
    async fn gives_up_after_five_attempts() {
        let failures = (0..10)
            .map(|i| Err(OracleError::Unexpected(format!("failure {i}"))))
            .collect();
        let (backend, calls, sleeps) = recording_backend(failures, no_jitter());

        let err = backend.complete(&[], None).await.unwrap_err();
        assert_eq!(err, OracleError::Unexpected("failure 4".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        // No wait after the final attempt.
        assert_eq!(*sleeps.lock().unwrap(), vec![1_000, 2_000, 4_000, 8_000]);
    }

    // ── context exhaustion is never retried ─────────────────────────────

    #[tokio::test]
    async fn context_too_long_gives_up_immediately() {
        let (backend, calls, sleeps) = recording_backend(
            vec![
                Err(OracleError::ContextTooLong("maximum context length is 4097".into())),
                Ok("should not reach".into()),
            ],
            no_jitter(),
        );

        let err = backend.complete(&[], None).await.unwrap_err();
        assert!(matches!(err, OracleError::ContextTooLong(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeps.lock().unwrap().is_empty());
    }

    // ── zero attempts still makes one call ──────────────────────────────

    #[tokio::test]
    async fn zero_attempts_is_treated_as_one() {
        let (backend, calls, _) = recording_backend(vec![Ok("once".into())], RetryPolicy::immediate(0));
        assert_eq!(backend.complete(&[], None).await.unwrap(), "once");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // ── backoff timing computation ──────────────────────────────────────

    #[test]
    fn backoff_computation() {
        let policy = RetryPolicy {
            max_attempts: 5,
            backoff_base_ms: 500,
            backoff_max_ms: 30_000,
            jitter: false,
        };

        assert_eq!(compute_backoff(&policy, 0), 500);
        assert_eq!(compute_backoff(&policy, 1), 1000);
        assert_eq!(compute_backoff(&policy, 2), 2000);
        assert_eq!(compute_backoff(&policy, 5), 16000);
        assert_eq!(compute_backoff(&policy, 6), 30_000); // capped at max
        assert_eq!(compute_backoff(&policy, 64), 30_000);
    }

    #[test]
    fn jitter_stays_within_delay() {
        let policy = RetryPolicy::default();
        for attempt in 0..4 {
            let cap = compute_backoff(&policy, attempt);
            for _ in 0..50 {
                assert!(wait_for(&policy, attempt) <= cap);
            }
        }
    }
}
