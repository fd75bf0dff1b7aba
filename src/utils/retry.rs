// src/utils/retry.rs

//! Bounded retry with exponential backoff.
//!
//! Every attempt but the last is guarded: a matching error is logged, the
//! task sleeps, and the operation runs again. The last attempt is not
//! guarded, so when all tries fail the caller sees the final error itself.

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use crate::models::RetryConfig;

/// Retry policy for fallible async operations.
#[derive(Debug, Clone)]
pub struct Retry {
    tries: u32,
    delay: Duration,
    backoff: f64,
    log_target: Option<&'static str>,
}

impl Retry {
    /// Create a policy with `tries` total attempts, an initial `delay`, and a
    /// multiplicative `backoff` applied after each failure.
    pub fn new(tries: u32, delay: Duration, backoff: f64) -> Self {
        Self {
            tries,
            delay,
            backoff,
            log_target: None,
        }
    }

    /// Build a policy from configuration.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.tries, secs_to_duration(config.delay_secs), config.backoff)
    }

    /// Log retry notices under the given target instead of this module's.
    pub fn with_logger(mut self, target: &'static str) -> Self {
        self.log_target = Some(target);
        self
    }

    /// Run `op`, retrying errors for which `retry_if` returns true.
    pub async fn run<T, E, F, Fut, P>(&self, retry_if: P, op: F) -> Result<T, E>
    where
        E: Debug + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        self.run_with_sleep(retry_if, op, tokio::time::sleep).await
    }

    /// Same as [`Retry::run`] with an injectable sleep function.
    pub async fn run_with_sleep<T, E, F, Fut, P, S, SFut>(
        &self,
        retry_if: P,
        mut op: F,
        mut sleep: S,
    ) -> Result<T, E>
    where
        E: Debug + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        S: FnMut(Duration) -> SFut,
        SFut: Future<Output = ()>,
    {
        let target = self.log_target.unwrap_or(module_path!());
        let mut remaining = self.tries;
        let mut delay = self.delay;

        while remaining > 1 {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if retry_if(&e) => {
                    if remaining == self.tries {
                        log::error!(target: target, "{:?}", e);
                    }
                    log::warn!(
                        target: target,
                        "{}, Retrying in {:.1} seconds...",
                        e,
                        delay.as_secs_f64()
                    );
                    sleep(delay).await;
                    remaining -= 1;
                    delay = secs_to_duration(delay.as_secs_f64() * self.backoff.max(0.0));
                }
                Err(e) => return Err(e),
            }
        }

        op().await
    }
}

/// Convert seconds to a `Duration`, saturating instead of panicking.
///
/// Negative and NaN values become zero; values too large to represent
/// become [`Duration::MAX`].
fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

impl Default for Retry {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient(u32),
        Fatal,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn is_transient(e: &TestError) -> bool {
        matches!(e, TestError::Transient(_))
    }

    #[tokio::test]
    async fn test_succeeds_on_third_try() {
        let retry = Retry::new(3, Duration::from_secs(1), 2.0);
        let mut calls = 0;
        let mut slept = Vec::new();

        let result = retry
            .run_with_sleep(
                is_transient,
                || {
                    calls += 1;
                    let n = calls;
                    async move {
                        if n < 3 {
                            Err(TestError::Transient(n))
                        } else {
                            Ok(n)
                        }
                    }
                },
                |d| {
                    slept.push(d);
                    std::future::ready(())
                },
            )
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(slept, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn test_final_failure_propagates() {
        let retry = Retry::new(3, Duration::from_millis(10), 2.0);
        let mut calls = 0;
        let mut sleeps = 0;

        let result: Result<(), TestError> = retry
            .run_with_sleep(
                is_transient,
                || {
                    calls += 1;
                    let n = calls;
                    async move { Err(TestError::Transient(n)) }
                },
                |_| {
                    sleeps += 1;
                    std::future::ready(())
                },
            )
            .await;

        assert_eq!(result, Err(TestError::Transient(3)));
        assert_eq!(calls, 3);
        assert_eq!(sleeps, 2);
    }

    #[tokio::test]
    async fn test_unmatched_error_is_not_retried() {
        let retry = Retry::new(5, Duration::from_millis(10), 2.0);
        let mut calls = 0;
        let mut sleeps = 0;

        let result: Result<(), TestError> = retry
            .run_with_sleep(
                is_transient,
                || {
                    calls += 1;
                    async { Err(TestError::Fatal) }
                },
                |_| {
                    sleeps += 1;
                    std::future::ready(())
                },
            )
            .await;

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls, 1);
        assert_eq!(sleeps, 0);
    }

    #[tokio::test]
    async fn test_single_try_is_unguarded() {
        let retry = Retry::new(1, Duration::from_secs(60), 2.0);
        let mut calls = 0;

        let result: Result<(), TestError> = retry
            .run_with_sleep(
                is_transient,
                || {
                    calls += 1;
                    async { Err(TestError::Transient(1)) }
                },
                |_: Duration| -> std::future::Ready<()> { panic!("should not sleep") },
            )
            .await;

        assert_eq!(result, Err(TestError::Transient(1)));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_uses_tokio_sleep() {
        let retry = Retry::new(2, Duration::from_secs(3), 2.0).with_logger("timeschd::test");
        let start = tokio::time::Instant::now();
        let mut calls = 0;

        let result = retry
            .run(is_transient, || {
                calls += 1;
                let n = calls;
                async move {
                    if n == 1 {
                        Err(TestError::Transient(n))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_out_of_range_settings_do_not_panic() {
        let config: RetryConfig = toml::from_str("tries = 3\nbackoff = -1.0").unwrap();
        let retry = Retry::from_config(&config);
        let mut slept = Vec::new();

        let result: Result<(), TestError> = retry
            .run_with_sleep(
                is_transient,
                || async { Err(TestError::Transient(0)) },
                |d| {
                    slept.push(d);
                    std::future::ready(())
                },
            )
            .await;

        assert_eq!(result, Err(TestError::Transient(0)));
        assert_eq!(slept, vec![Duration::from_secs(3), Duration::ZERO]);
    }

    #[test]
    fn test_secs_to_duration_saturates() {
        assert_eq!(secs_to_duration(-2.0), Duration::ZERO);
        assert_eq!(secs_to_duration(f64::NAN), Duration::ZERO);
        assert_eq!(secs_to_duration(f64::INFINITY), Duration::MAX);
        assert_eq!(secs_to_duration(1.5), Duration::from_millis(1500));
    }
}
