use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Shared backoff policy for all providers: a bounded number of attempts
/// with an exponentially doubling delay capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// What the state machine decided after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Sleep this long, then try again.
    RetryAfter(Duration),
    /// Propagate the error; either the failure was terminal or the attempt
    /// ceiling is exhausted.
    GiveUp,
}

/// Pure retry state: `Attempting(n)` with the delay the next backoff will
/// use. Success and terminal failure are exits, not stored states, so the
/// machine holds no I/O and transitions are unit-testable with a fake
/// clock.
#[derive(Debug, Clone)]
pub struct RetryState {
    attempt: u32,
    delay: Duration,
    max_attempts: u32,
    max_delay: Duration,
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 1,
            delay: policy.initial_delay,
            max_attempts: policy.max_attempts.max(1),
            max_delay: policy.max_delay,
        }
    }

    /// 1-based attempt counter.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Record a failed attempt. Retryable failures advance to the next
    /// attempt with a doubled (capped) delay while attempts remain;
    /// non-retryable failures give up immediately.
    pub fn on_failure(&mut self, retryable: bool) -> Transition {
        if !retryable || self.attempt >= self.max_attempts {
            return Transition::GiveUp;
        }

        let sleep = self.delay;
        self.delay = (self.delay * 2).min(self.max_delay);
        self.attempt += 1;
        Transition::RetryAfter(sleep)
    }
}

/// Drive an async operation through the retry state machine. The operation
/// receives the 1-based attempt number; retryable errors are retried per
/// the policy, everything else propagates immediately.
pub async fn run_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut state = RetryState::new(policy);
    loop {
        match op(state.attempt()).await {
            Ok(value) => return Ok(value),
            Err(err) => match state.on_failure(err.is_retryable()) {
                Transition::RetryAfter(delay) => {
                    tracing::warn!(
                        "Attempt {}/{} failed ({}), retrying in {:.1}s",
                        state.attempt() - 1,
                        policy.max_attempts,
                        err,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
                Transition::GiveUp => return Err(err),
            },
        }
    }
}
