//! Retry configuration, delay calculation, and the generator decorator.
//!
//! [`RetryingGenerator`] wraps any [`QuestionGenerator`] and retries
//! transient failures (see [`SupplyError::is_transient`]) with exponential
//! backoff. Application errors are never retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::warn;

use crate::telemetry;
use crate::traits::QuestionGenerator;
use crate::types::{GenerateRequest, Question};
use crate::{Result, SupplyError};

/// Configuration for retry behaviour on transient errors.
///
/// ```rust
/// # use trivia_supply::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(3)
///     .initial_delay(Duration::from_millis(200))
///     .jitter(true);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Base delay before the first retry. Default: 500ms.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 30s.
    pub max_delay: Duration,
    /// Whether to scale delays by a random factor in `[0.5, 1.0]`. Default: true.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Enable or disable jitter.
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Backoff for a 0-indexed attempt: `initial_delay * 2^attempt`, capped
    /// at `max_delay`. Without jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }

    /// Delay actually slept before the next attempt.
    ///
    /// A `retry_after` hint from a rate-limited reply wins over backoff and
    /// is never jittered.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(hint) = retry_after {
            return hint;
        }
        let delay = self.delay_for_attempt(attempt);
        if self.jitter {
            delay.mul_f64(rand::thread_rng().gen_range(0.5..=1.0))
        } else {
            delay
        }
    }
}

/// Execute an async operation with retry logic.
///
/// Permanent errors are returned immediately without retry.
pub(crate) async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    generator_name: &str,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..config.max_attempts.max(1) {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() => {
                if attempt + 1 < config.max_attempts {
                    metrics::counter!(telemetry::RETRIES_TOTAL).increment(1);
                    let delay = config.effective_delay(attempt, e.retry_after());
                    warn!(
                        generator = generator_name,
                        attempt = attempt + 1,
                        max_attempts = config.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err
        .unwrap_or_else(|| SupplyError::RemoteTransport("no attempt was made".into())))
}

/// Decorator that wraps a [`QuestionGenerator`] with retry logic.
pub struct RetryingGenerator {
    inner: Arc<dyn QuestionGenerator>,
    config: RetryConfig,
}

impl RetryingGenerator {
    /// Wrap a generator with retry logic.
    pub fn new(inner: Arc<dyn QuestionGenerator>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl QuestionGenerator for RetryingGenerator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<Question>> {
        with_retry(&self.config, self.inner.name(), || {
            self.inner.generate(request)
        })
        .await
    }
}
