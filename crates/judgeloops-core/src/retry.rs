use std::future::Future;
use std::time::Duration;

use judgeloops_provider::ProviderError;
use thiserror::Error;
use tracing::warn;

/// Bounded retry with a fixed pause between attempts.
///
/// No jitter and no growth: a failed call is retried after exactly `backoff`
/// until `max_attempts` calls have been made, then the last error is handed
/// back to the caller to degrade however its stage requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

/// A value together with the number of calls it took
#[derive(Debug, Clone, PartialEq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

#[derive(Error, Debug)]
#[error("gave up after {attempts} attempt(s): {last}")]
pub struct RetryError {
    pub attempts: u32,
    #[source]
    pub last: ProviderError,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// 3 attempts, 2s apart
    pub fn generation() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Duration::from_secs(2))
    }

    /// 3 attempts, 1s apart
    pub fn judging() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Duration::from_secs(1))
    }

    /// Attempts actually made; zero is treated as one
    pub fn effective_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub async fn run<T, F, Fut>(&self, op: F) -> Result<Retried<T>, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        self.run_checked(op, |_| Ok(())).await
    }

    /// Like [`run`](Self::run), but a successful value that fails `check`
    /// counts as a failed attempt too.
    pub async fn run_checked<T, F, Fut, C>(
        &self,
        mut op: F,
        check: C,
    ) -> Result<Retried<T>, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
        C: Fn(&T) -> Result<(), ProviderError>,
    {
        let max_attempts = self.effective_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match op().await {
                Ok(value) => match check(&value) {
                    Ok(()) => {
                        return Ok(Retried {
                            value,
                            attempts: attempt,
                        })
                    }
                    Err(e) => e,
                },
                Err(e) => e,
            };

            if attempt >= max_attempts {
                return Err(RetryError {
                    attempts: attempt,
                    last: error,
                });
            }

            warn!(attempt, max_attempts, error = %error, "Attempt failed, retrying");

            if !self.backoff.is_zero() {
                tokio::time::sleep(self.backoff).await;
            }
        }
    }
}

/// Check for [`RetryPolicy::run_checked`] that rejects blank text
#[allow(clippy::ptr_arg)]
pub fn reject_blank(text: &String) -> Result<(), ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::EmptyOutput)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    fn flaky(
        calls: &AtomicU32,
        succeed_on: u32,
    ) -> impl Future<Output = Result<String, ProviderError>> {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if n >= succeed_on {
                Ok(format!("answer {n}"))
            } else {
                Err(ProviderError::ExecutionFailed(format!("flake {n}")))
            }
        }
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result = policy.run(|| flaky(&calls, 3)).await.unwrap();

        assert_eq!(result.value, "answer 3");
        assert_eq!(result.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let err = policy.run(|| flaky(&calls, 10)).await.unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("flake 3"));
    }

    #[tokio::test]
    async fn test_blank_output_is_retried_when_checked() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let err = policy
            .run_checked(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, ProviderError>("   ".to_string()) }
                },
                reject_blank,
            )
            .await
            .unwrap_err();

        assert!(matches!(err.last, ProviderError::EmptyOutput));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_blank_output_accepted_without_check() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let result = policy
            .run(|| async { Ok::<_, ProviderError>(String::new()) })
            .await
            .unwrap();
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_calls_once() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(0, Duration::ZERO);

        let err = policy.run(|| flaky(&calls, 10)).await.unwrap_err();
        assert_eq!(err.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backoff_only_between_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(30));

        let started = Instant::now();
        let _ = policy.run(|| flaky(&calls, 10)).await;
        let elapsed = started.elapsed();

        // Two pauses for three attempts
        assert!(elapsed >= Duration::from_millis(60));
        assert!(elapsed < Duration::from_millis(90 + 500));
    }

    #[test]
    fn test_presets() {
        assert_eq!(RetryPolicy::generation().backoff, Duration::from_secs(2));
        assert_eq!(RetryPolicy::judging().backoff, Duration::from_secs(1));
        assert_eq!(RetryPolicy::judging().max_attempts, 3);
    }
}
