//! Bounded retry with backoff for store operations.
//!
//! [`retry`] is shared by the existence check and the transfer so both get
//! the same attempt ceiling and delay. It never inspects the error: every
//! failure is retried until the budget is spent.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay after every failure.
    Fixed(Duration),
    /// `base`, then `2 * base`, `4 * base`, ...
    Exponential {
        /// Delay after the first failure.
        base: Duration,
    },
}

impl Backoff {
    /// Delay to wait after the `failures`-th consecutive failure (1-based).
    #[must_use]
    pub const fn delay(self, failures: u32) -> Duration {
        match self {
            Self::Fixed(delay) => delay,
            Self::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(failures.saturating_sub(1)))
            }
        }
    }
}

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

/// Final result of a retried operation and how many attempts it took.
#[derive(Debug)]
pub struct Retried<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

/// Runs `op` until it succeeds or `policy.max_attempts` attempts have
/// failed, sleeping according to `policy.backoff` between attempts.
///
/// `op` receives the 1-based attempt number. `label` prefixes the retry
/// warnings. There is no sleep after the last attempt. A `max_attempts` of
/// zero is treated as one.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Retried<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                return Retried {
                    result: Ok(value),
                    attempts: attempt,
                };
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.backoff.delay(attempt);
                log::warn!(
                    "{label}: attempt {attempt}/{max_attempts} failed, retrying in {delay:.1?}...\n  {e}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                log::debug!("{label}: attempt {attempt}/{max_attempts} failed, giving up: {e}");
                return Retried {
                    result: Err(e),
                    attempts: attempt,
                };
            }
        }
    }
}
