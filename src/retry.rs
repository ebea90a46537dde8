//! Retry with exponential back-off and jitter for upstream calls.
//!
//! [`retry_with_backoff`] wraps a fallible operation and retries on transient
//! errors (HTTP 429, timeouts, connection failures, upstream 5xx). Fatal
//! errors (bad cookie, malformed input, unparseable payloads) are returned
//! immediately without any retry.

use std::thread;
use std::time::Duration;

use crate::error::TrendsError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Retriable: [`TrendsError::RateLimited`] (upstream asked us to slow down),
/// [`TrendsError::Http`] timeouts and connection failures, and
/// [`TrendsError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else is a hard stop for the current region: a stale cookie will
/// not get fresher, and retrying will not change a payload's shape.
pub fn is_retriable(err: &TrendsError) -> bool {
    match err {
        TrendsError::RateLimited => true,
        TrendsError::Http(e) => e.is_timeout() || e.is_connect(),
        TrendsError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        TrendsError::Unauthorized { .. }
        | TrendsError::Deserialize { .. }
        | TrendsError::UnexpectedPayload { .. }
        | TrendsError::InvalidInput(_) => false,
    }
}

/// Back-off schedule: `backoff_base * 2^attempt + U(0, jitter)` seconds.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first try.
    pub max_retries: u32,
    /// Exponential base in seconds.
    pub backoff_base: f64,
    /// Upper bound of the uniform random delay added to each back-off.
    pub jitter: f64,
}

impl RetryPolicy {
    /// Delay before the retry that follows failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.backoff_base.max(0.0) * f64::from(1u32 << attempt.min(20));
        let jitter = if self.jitter > 0.0 {
            rand::random::<f64>() * self.jitter
        } else {
            0.0
        };
        Duration::from_secs_f64(base + jitter)
    }
}

/// Runs `operation` with up to `policy.max_retries` additional attempts on
/// transient errors. The 0-based attempt number is passed to the operation so
/// callers can rotate proxies or rebuild clients per attempt.
pub fn retry_with_backoff<T, F>(policy: &RetryPolicy, mut operation: F) -> Result<T, TrendsError>
where
    F: FnMut(u32) -> Result<T, TrendsError>,
{
    let mut attempt = 0u32;
    loop {
        match operation(attempt) {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "transient error (attempt {}/{}): {}; retrying in {:.1}s",
                    attempt + 1,
                    policy.max_retries + 1,
                    err,
                    delay.as_secs_f64()
                );
                thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}
