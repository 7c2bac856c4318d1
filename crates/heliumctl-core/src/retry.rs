use std::time::Duration;

/// Delay schedule between attempts of a retried file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    /// Retry immediately once, then wait `step * n` before further attempts.
    ///
    /// Attempt 1 runs at once, attempt 2 retries with no delay, attempt 3
    /// waits `step`, attempt 4 waits `2 * step`, and so on.
    Stepped { step: Duration },

    /// Wait `warmup` before the first attempt so a transient lock can clear,
    /// then wait `step * attempt` before each retry.
    Warmup { warmup: Duration, step: Duration },
}

impl DelayPolicy {
    /// Delay to observe before running the given attempt (1-based).
    pub fn delay_before(&self, attempt: u32) -> Duration {
        match *self {
            DelayPolicy::Stepped { step } => {
                if attempt <= 2 {
                    Duration::ZERO
                } else {
                    step * (attempt - 2)
                }
            }
            DelayPolicy::Warmup { warmup, step } => {
                if attempt <= 1 {
                    warmup
                } else {
                    step * attempt
                }
            }
        }
    }
}

/// How often and how patiently to retry a contended file operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: DelayPolicy,
}

impl RetryPolicy {
    /// Schedule for snapshotting a possibly-locked live file: three
    /// attempts, retrying immediately and then after 500 ms.
    pub fn snapshot() -> Self {
        Self {
            max_attempts: 3,
            delay: DelayPolicy::Stepped {
                step: Duration::from_millis(500),
            },
        }
    }

    /// Schedule for copying a modified temp file back over the live path:
    /// five attempts with a 500 ms warm-up, then a linearly growing wait
    /// (600 ms, 900 ms, ...).
    pub fn replace() -> Self {
        Self {
            max_attempts: 5,
            delay: DelayPolicy::Warmup {
                warmup: Duration::from_millis(500),
                step: Duration::from_millis(300),
            },
        }
    }
}

/// Run `op` until it succeeds or the policy is exhausted, sleeping per the
/// delay schedule between attempts. The final attempt's error is returned
/// when every attempt fails.
pub async fn with_retry<T, E>(
    policy: RetryPolicy,
    mut op: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..attempts {
        let delay = policy.delay.delay_before(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Ok(value) = op() {
            return Ok(value);
        }
        tracing::debug!("attempt {} of {} failed, retrying", attempt, attempts);
    }

    let delay = policy.delay.delay_before(attempts);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    op()
}
