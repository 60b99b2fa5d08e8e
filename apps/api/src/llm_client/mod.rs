//! Text generation: the single seam through which proposal prose is delegated
//! to an external model.
//!
//! Pipeline code depends only on [`TextGenerator`]; the vendor client lives in
//! [`anthropic`] and can be swapped without touching generation logic. Retries
//! are layered on with [`Retrying`] rather than baked into the client.
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

pub mod anthropic;
pub mod prompts;
pub mod stream;

pub use anthropic::AnthropicClient;
pub use stream::{collect_stream, TokenStream};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("text generation unavailable: {0}")]
    Unavailable(String),

    #[error("text generation timed out: {0}")]
    Timeout(String),

    #[error("text generation request failed (status {status:?}): {message}")]
    Request {
        status: Option<u16>,
        message: String,
    },

    #[error("text generation returned empty content")]
    EmptyContent,

    #[error("text generation cancelled")]
    Cancelled,
}

impl AdapterError {
    /// Transport failures, timeouts, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdapterError::Timeout(_) | AdapterError::EmptyContent => true,
            AdapterError::Request { status: None, .. } => true,
            AdapterError::Request {
                status: Some(code), ..
            } => *code == 429 || *code >= 500,
            AdapterError::Unavailable(_) | AdapterError::Cancelled => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_tokens: 4096,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier recorded in proposal metadata.
    fn model(&self) -> &str;

    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: GenerationOptions,
    ) -> Result<String, AdapterError>;

    /// Ordered text deltas. Dropping the stream abandons the request.
    async fn stream(
        &self,
        system: &str,
        user: &str,
        options: GenerationOptions,
    ) -> Result<TokenStream, AdapterError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Retry
// ────────────────────────────────────────────────────────────────────────────

/// Fixed attempt count with linear backoff: the wait before attempt `n + 1` is `n × base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Applies a [`RetryPolicy`] to any generator. Non-retryable errors return
/// immediately; after the last attempt the final error is returned unchanged.
pub struct Retrying<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G: TextGenerator> Retrying<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, AdapterError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, AdapterError>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() || attempt >= self.policy.attempts => return Err(e),
                Err(e) => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        "{operation} attempt {attempt}/{} failed ({e}), retrying after {}ms",
                        self.policy.attempts,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for Retrying<G> {
    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: GenerationOptions,
    ) -> Result<String, AdapterError> {
        self.run("completion", || self.inner.complete(system, user, options))
            .await
    }

    async fn stream(
        &self,
        system: &str,
        user: &str,
        options: GenerationOptions,
    ) -> Result<TokenStream, AdapterError> {
        self.run("stream", || self.inner.stream(system, user, options))
            .await
    }
}

/// Strips ```markdown ... ``` or ``` ... ``` fences some models wrap prose in.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.trim_start()
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or_else(|| rest.trim())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted generators shared by tests across the crate.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use futures_util::stream;

    use super::*;

    /// Replays scripted results in order and counts calls.
    pub struct ScriptedGenerator {
        results: Mutex<VecDeque<Result<String, AdapterError>>>,
        pub calls: AtomicU32,
    }

    impl ScriptedGenerator {
        pub fn new(results: Vec<Result<String, AdapterError>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                calls: AtomicU32::new(0),
            }
        }

        pub fn always(text: &str) -> Self {
            Self::new((0..16).map(|_| Ok(text.to_string())).collect())
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn next(&self) -> Result<String, AdapterError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AdapterError::Request {
                    status: Some(503),
                    message: format!("failure {n}"),
                }))
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _options: GenerationOptions,
        ) -> Result<String, AdapterError> {
            self.next()
        }

        async fn stream(
            &self,
            _system: &str,
            _user: &str,
            _options: GenerationOptions,
        ) -> Result<TokenStream, AdapterError> {
            let text = self.next()?;
            let chunks: Vec<Result<String, AdapterError>> = text
                .split_inclusive(' ')
                .map(|c| Ok(c.to_string()))
                .collect();
            Ok(Box::pin(stream::iter(chunks)))
        }
    }
}
