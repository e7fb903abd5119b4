use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use trivia_supply::{
    GameSettings, GenerateRequest, Question, QuestionGenerator, QuestionKind, Result,
    RetryConfig, RetryingGenerator, SupplyError,
};

/// Mock generator that fails N times then succeeds.
struct FailThenSucceed {
    fail_count: AtomicU32,
    fail_with: fn() -> SupplyError,
    total_calls: AtomicU32,
}

impl FailThenSucceed {
    fn new(failures: u32, fail_with: fn() -> SupplyError) -> Self {
        Self {
            fail_count: AtomicU32::new(failures),
            fail_with,
            total_calls: AtomicU32::new(0),
        }
    }

    fn call_count(&self) -> u32 {
        self.total_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuestionGenerator for FailThenSucceed {
    fn name(&self) -> &str {
        "mock-retry"
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<Vec<Question>> {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        let remaining = self.fail_count.load(Ordering::Relaxed);
        if remaining > 0 {
            self.fail_count.fetch_sub(1, Ordering::Relaxed);
            return Err((self.fail_with)());
        }
        let options = [("A", "True"), ("B", "False")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(vec![Question::new(
            QuestionKind::TrueFalse,
            "Honey never spoils",
            options,
            "A",
            "",
        )?])
    }
}

fn transport() -> SupplyError {
    SupplyError::RemoteTransport("connection reset".into())
}

fn rate_limited() -> SupplyError {
    SupplyError::RateLimited {
        retry_after: Some(Duration::from_secs(20)),
    }
}

fn application() -> SupplyError {
    SupplyError::RemoteApplication("invalid category".into())
}

fn request() -> GenerateRequest {
    GenerateRequest::new(&GameSettings::default(), 1)
}

fn fast_config(attempts: u32) -> RetryConfig {
    RetryConfig::new()
        .max_attempts(attempts)
        .initial_delay(Duration::from_millis(10))
        .jitter(false)
}

fn wrap(inner: &Arc<FailThenSucceed>, config: RetryConfig) -> RetryingGenerator {
    RetryingGenerator::new(Arc::clone(inner) as Arc<dyn QuestionGenerator>, config)
}

#[tokio::test(start_paused = true)]
async fn retries_transient_then_succeeds() {
    let inner = Arc::new(FailThenSucceed::new(2, transport));
    let generator = wrap(&inner, fast_config(3));

    let questions = generator.generate(&request()).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(inner.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts() {
    let inner = Arc::new(FailThenSucceed::new(5, transport));
    let generator = wrap(&inner, fast_config(3));

    let err = generator.generate(&request()).await.unwrap_err();
    assert!(matches!(err, SupplyError::RemoteTransport(_)));
    assert_eq!(inner.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn application_errors_are_not_retried() {
    let inner = Arc::new(FailThenSucceed::new(1, application));
    let generator = wrap(&inner, fast_config(3));

    let err = generator.generate(&request()).await.unwrap_err();
    assert!(matches!(err, SupplyError::RemoteApplication(_)));
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn retry_after_hint_is_honoured() {
    let inner = Arc::new(FailThenSucceed::new(1, rate_limited));
    let generator = wrap(&inner, fast_config(2));

    let started = tokio::time::Instant::now();
    generator.generate(&request()).await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(20));
    assert_eq!(inner.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn single_attempt_config_does_not_retry() {
    let inner = Arc::new(FailThenSucceed::new(1, transport));
    let generator = wrap(&inner, RetryConfig::disabled());

    generator.generate(&request()).await.unwrap_err();
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test]
async fn name_is_inner_name() {
    let inner = Arc::new(FailThenSucceed::new(0, transport));
    assert_eq!(wrap(&inner, fast_config(3)).name(), "mock-retry");
}

#[test]
fn default_config_values() {
    let config = RetryConfig::default();
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(500));
    assert_eq!(config.max_delay, Duration::from_secs(30));
    assert!(config.jitter);
}
