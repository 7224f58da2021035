//! Conflict Retry Client
//!
//! Wraps one read-mutate-conditional-write cycle and re-runs it from scratch
//! when the store reports a version conflict. A fresh read on every attempt
//! is mandatory: the token from the failed attempt is stale and would only
//! conflict again.
//!
//! ```text
//! Start -> Attempt(1) --ok--------------------------> Success
//!              |      --permanent error-------------> Failed
//!              |      --conflict, n == max----------> RetriesExhausted
//!              +------ conflict, n <  max --> Backoff(n) --sleep--> Attempt(n+1)
//! ```
//!
//! The client holds no document, no version and no lock; its only state is
//! the attempt counter carried by [`RetryState`].

use async_trait::async_trait;
use docsync_core::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// Retry Configuration
// ============================================================================

/// Configuration for conflict retry behavior
///
/// `max_retries` counts attempts, not re-runs: with the default of 3 an
/// operation is tried at most three times. Between attempts the client waits
/// `base_delay * attempt`, capped at `max_delay`.
///
/// # Example
/// ```
/// use docsync_concurrency::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::new()
///     .with_max_retries(5)
///     .with_base_delay_ms(10)
///     .with_max_delay_ms(35);
/// assert_eq!(config.delay_for(1), Duration::from_millis(10));
/// assert_eq!(config.delay_for(3), Duration::from_millis(30));
/// assert_eq!(config.delay_for(4), Duration::from_millis(35));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (values below 1 are treated as 1)
    pub max_retries: u32,
    /// Delay unit for linear backoff
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Create a new RetryConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a RetryConfig that makes a single attempt
    pub fn no_retry() -> Self {
        Self {
            max_retries: 1,
            ..Default::default()
        }
    }

    /// Set maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff unit
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the backoff unit in milliseconds
    pub fn with_base_delay_ms(self, base_delay_ms: u64) -> Self {
        self.with_base_delay(Duration::from_millis(base_delay_ms))
    }

    /// Set the delay cap
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Set the delay cap in milliseconds
    pub fn with_max_delay_ms(self, max_delay_ms: u64) -> Self {
        self.with_max_delay(Duration::from_millis(max_delay_ms))
    }

    /// Effective attempt bound
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay after the `attempt`-th conflicting attempt (linear backoff)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .checked_mul(attempt)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

// ============================================================================
// Sleeper
// ============================================================================

/// Cooperative pause between attempts
///
/// Injected so the state machine can be driven without real timers.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `delay`
    async fn sleep(&self, delay: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

// ============================================================================
// State machine
// ============================================================================

/// Where one `perform` call currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryState {
    /// About to run attempt `n` (1-based)
    Attempt(u32),
    /// Attempt `n` conflicted; wait before the next one
    Backoff { attempt: u32, delay: Duration },
}

/// Re-runs an operation on version conflict, up to a bound
#[derive(Debug, Clone)]
pub struct ConflictRetry<S = TokioSleeper> {
    config: RetryConfig,
    sleeper: S,
}

impl ConflictRetry<TokioSleeper> {
    /// Retry client using the tokio timer
    pub fn new(config: RetryConfig) -> Self {
        Self::with_sleeper(config, TokioSleeper)
    }
}

impl Default for ConflictRetry<TokioSleeper> {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl<S: Sleeper> ConflictRetry<S> {
    /// Retry client with a custom sleeper
    pub fn with_sleeper(config: RetryConfig, sleeper: S) -> Self {
        Self { config, sleeper }
    }

    /// The active configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails permanently, or exhausts
    /// the attempt bound
    ///
    /// `operation` must perform a complete read-mutate-conditional-write
    /// cycle each time it is called. Only [`Error::Conflict`] is retried;
    /// every other error is returned as-is from the attempt that raised it.
    /// After the last conflicting attempt this returns
    /// [`Error::RetriesExhausted`] without waiting.
    pub async fn perform<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max = self.config.attempts();
        let mut state = RetryState::Attempt(1);

        loop {
            state = match state {
                RetryState::Attempt(attempt) => match operation().await {
                    Ok(value) => {
                        if attempt > 1 {
                            debug!(attempt, "Operation succeeded after conflict retry");
                        }
                        return Ok(value);
                    }
                    Err(e) if e.is_retryable() => {
                        if attempt >= max {
                            warn!(attempts = attempt, error = %e, "Giving up after repeated version conflicts");
                            return Err(Error::RetriesExhausted { attempts: attempt });
                        }
                        let delay = self.config.delay_for(attempt);
                        warn!(attempt, max, ?delay, error = %e, "Version conflict, retrying");
                        RetryState::Backoff { attempt, delay }
                    }
                    Err(e) => {
                        debug!(attempt, error = %e, "Operation failed, not retryable");
                        return Err(e);
                    }
                },
                RetryState::Backoff { attempt, delay } => {
                    self.sleeper.sleep(delay).await;
                    RetryState::Attempt(attempt + 1)
                }
            };
        }
    }
}
