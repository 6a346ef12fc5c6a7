//! Bounded polling for resources the host creates asynchronously.

use std::future::Future;
use std::time::Duration;

use crate::error::{ForgeError, Result};

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed,
    /// Delay doubles after every retry, starting at the base delay.
    Exponential,
}

/// Attempt cap and pacing for [`poll_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Fixed,
        }
    }

    pub const fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            delay: base_delay,
            backoff: Backoff::Exponential,
        }
    }

    /// Delay to wait before `attempt` (zero-based). The first attempt never waits.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        match self.backoff {
            Backoff::Fixed => self.delay,
            // 1x, 2x, 4x, ... capped so the shift never overflows
            Backoff::Exponential => self.delay.saturating_mul(1u32 << (attempt - 1).min(16)),
        }
    }
}

/// Run `probe` until `ready` accepts its value or the policy is exhausted.
///
/// Transient errors (see [`ForgeError::is_transient`]) count as a failed
/// attempt; any other error is returned immediately. Running out of
/// attempts is an error, never a silent fallthrough with a stale value.
pub async fn poll_until<T, F, Fut, P>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut probe: F,
    ready: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let mut last: Option<String> = None;

    for attempt in 0..policy.max_attempts {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            tracing::debug!(
                operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Polling again after delay"
            );
            tokio::time::sleep(delay).await;
        }

        match probe().await {
            Ok(value) if ready(&value) => return Ok(value),
            Ok(_) => {
                last = Some("value not ready".to_string());
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(
                    operation,
                    attempt = attempt + 1,
                    error = %e,
                    "Transient failure while polling"
                );
                last = Some(e.to_string());
            }
            Err(e) => return Err(e),
        }
    }

    tracing::warn!(operation, attempts = policy.max_attempts, "Polling exhausted");
    Err(ForgeError::RetriesExhausted {
        operation,
        attempts: policy.max_attempts,
        last,
    })
}
