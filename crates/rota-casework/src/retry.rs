//! Explicit retry combinator with a deterministic exponential backoff
//! schedule and bounded optional jitter.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::time::sleep;

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_BASE_BACKOFF_MS: u64 = 200;

static JITTER_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy)]
/// Public struct `RetryPolicy` used across rota components.
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff_ms: DEFAULT_BASE_BACKOFF_MS,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Deterministic backoff for the given zero-based attempt index.
    pub fn backoff_ms(&self, attempt: usize) -> u64 {
        let shift = attempt.min(6);
        self.base_backoff_ms.saturating_mul(1_u64 << shift)
    }

    /// Backoff with bounded jitter in [50%, 100%] of the deterministic value.
    pub fn delay_ms(&self, attempt: usize) -> u64 {
        let base = self.backoff_ms(attempt);
        if !self.jitter || base <= 1 {
            return base;
        }

        let low = base / 2;
        let width = base.saturating_sub(low);
        let seed = JITTER_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mixed = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(17) ^ 0xA24B_AED4_963E_E407;
        let jitter = if width == 0 {
            0
        } else {
            mixed % width.saturating_add(1)
        };
        low.saturating_add(jitter)
    }
}

/// Runs `operation` up to `policy.max_attempts` times, sleeping between
/// attempts that fail with an error `is_retryable` accepts. `on_exhausted`
/// fires once when a retryable error survives the final attempt; the error
/// itself is always returned, never swallowed.
pub async fn run_with_retry<T, E, Op, Fut>(
    policy: &RetryPolicy,
    mut operation: Op,
    is_retryable: impl Fn(&E) -> bool,
    mut on_exhausted: impl FnMut(&E),
) -> Result<T, E>
where
    Op: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !is_retryable(&error) {
                    return Err(error);
                }
                if attempt + 1 >= max_attempts {
                    on_exhausted(&error);
                    return Err(error);
                }
                sleep(std::time::Duration::from_millis(policy.delay_ms(attempt))).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{run_with_retry, RetryPolicy};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_backoff_ms: 1,
            jitter: false,
        }
    }

    #[test]
    fn backoff_doubles_per_attempt_and_caps_the_shift() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_backoff_ms: 200,
            jitter: false,
        };
        assert_eq!(policy.backoff_ms(0), 200);
        assert_eq!(policy.backoff_ms(1), 400);
        assert_eq!(policy.backoff_ms(2), 800);
        assert_eq!(policy.backoff_ms(6), policy.backoff_ms(9));
    }

    #[test]
    fn jittered_delay_stays_within_half_open_band() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_backoff_ms: 200,
            jitter: true,
        };
        let base = policy.backoff_ms(2);
        for _ in 0..64 {
            let delay = policy.delay_ms(2);
            assert!(delay >= base / 2, "expected {delay} >= {}", base / 2);
            assert!(delay <= base, "expected {delay} <= {base}");
        }
    }

    #[tokio::test]
    async fn succeeds_after_retryable_failures() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, &str> = run_with_retry(
            &fast_policy(),
            |_attempt| {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if call < 2 {
                        Err("conflict")
                    } else {
                        Ok(7)
                    }
                }
            },
            |_error| true,
            |_error| {},
        )
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, &str> = run_with_retry(
            &fast_policy(),
            |_attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal") }
            },
            |error| *error != "fatal",
            |_error| {},
        )
        .await;
        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_invokes_recovery_callback_once() {
        let calls = AtomicUsize::new(0);
        let exhausted = AtomicUsize::new(0);
        let result: Result<u32, &str> = run_with_retry(
            &fast_policy(),
            |_attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("conflict") }
            },
            |_error| true,
            |_error| {
                exhausted.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await;
        assert_eq!(result, Err("conflict"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(exhausted.load(Ordering::SeqCst), 1);
    }
}
