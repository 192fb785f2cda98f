//! Rate-limit retry with exponential back-off for embedding calls.
//!
//! Only [`EmbedError::RateLimited`] is retried. Every other error is returned
//! on the attempt that produced it.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use pollsense_core::AppConfig;

use crate::embeddings::Embedder;
use crate::error::EmbedError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY: Duration = Duration::from_secs(60);

/// How many times to try and how long to wait in between.
///
/// | Retry | Sleep before it (base = 1 s) |
/// |-------|------------------------------|
/// | 1     | 2 s                          |
/// | 2     | 4 s                          |
/// | 3     | 8 s                          |
///
/// The default three attempts therefore wait 2 s and then 4 s.
///
/// With `jitter` each sleep is scaled by a random factor in `[0.75, 1.25)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Total attempts including the first. Treated as at least 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            jitter: false,
        }
    }
}

impl BackoffPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            jitter: false,
        }
    }

    /// Configured attempts and base delay, with jitter on.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(
            config.embedding_max_attempts,
            Duration::from_millis(config.embedding_backoff_base_ms),
        )
        .with_jitter(true)
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Un-jittered sleep before retry number `retry` (1-based):
    /// `base * 2^retry`.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.min(20);
        self.base_delay.saturating_mul(factor).min(MAX_DELAY)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter {
            delay.mul_f64(rand::random::<f64>() * 0.5 + 0.75)
        } else {
            delay
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-rate-limit error, or
/// `policy.max_attempts` attempts have been made. On exhaustion the last
/// rate-limit error is returned.
///
/// # Errors
///
/// Returns the first non-retriable error, or the final
/// [`EmbedError::RateLimited`] once attempts are exhausted.
pub async fn retry_on_rate_limit<T, F, Fut>(
    policy: &BackoffPolicy,
    mut operation: F,
) -> Result<T, EmbedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EmbedError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_rate_limited() || attempt >= max_attempts {
                    return Err(err);
                }
                let delay = policy.jittered(policy.delay_for(attempt));
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "embedding rate limited; retrying after back-off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// An [`Embedder`] that retries the wrapped embedder on rate limiting.
pub struct RetryingEmbedder<E> {
    inner: E,
    policy: BackoffPolicy,
}

impl<E> RetryingEmbedder<E> {
    #[must_use]
    pub fn new(inner: E, policy: BackoffPolicy) -> Self {
        Self { inner, policy }
    }

    #[must_use]
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }
}

#[async_trait]
impl<E: Embedder> Embedder for RetryingEmbedder<E> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        retry_on_rate_limit(&self.policy, || self.inner.embed(text)).await
    }
}
