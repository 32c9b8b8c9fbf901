//! Background story generation with fixed-delay retry

use std::sync::Arc;
use std::time::Duration;

use fabula_llm::{GenerationRequest, LlmError, TextGenerator};
use fabula_telemetry::metrics::{self, Counter, Histogram, KeyValue};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::Instrument;

use crate::model::StoryState;
use crate::narration::narrate;
use crate::store::StoryStore;

/// How often and how patiently a failed generation is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure
    pub attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Longest a generation can take when every attempt runs into `timeout`
    pub const fn worst_case(&self, timeout: Duration) -> Duration {
        timeout
            .saturating_mul(self.attempts.saturating_add(1))
            .saturating_add(self.delay.saturating_mul(self.attempts))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            delay: Duration::from_secs(1),
        }
    }
}

/// Generates stories in the background and records each outcome in the store
pub struct StoryGenerator {
    llm: Arc<dyn TextGenerator>,
    store: Arc<dyn StoryStore>,
    retry: RetryPolicy,
    system_instruction: String,
    max_tokens: u32,
    temperature: Option<f64>,
    duration: Histogram<f64>,
    failed: Counter<u64>,
}

impl StoryGenerator {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        store: Arc<dyn StoryStore>,
        retry: RetryPolicy,
        system_instruction: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            llm,
            store,
            retry,
            system_instruction: system_instruction.into(),
            max_tokens,
            temperature: None,
            duration: metrics::duration_histogram(metrics::STORY_GENERATION_DURATION),
            failed: metrics::counter(metrics::STORY_GENERATION_FAILED),
        }
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Run [`Self::prepare`] on a detached task
    ///
    /// Callers are not expected to await the handle; it exists so tests can.
    pub fn spawn(self: &Arc<Self>, key: String, generation: u64, subject: String) -> JoinHandle<()> {
        let generator = Arc::clone(self);
        let span = tracing::info_span!("story_generation", key = %key, generation);

        tokio::spawn(async move { generator.prepare(&key, generation, &subject).await }.instrument(span))
    }

    /// Generate a story about `subject` and settle the entry stored under `key`
    ///
    /// Never fails: every outcome, including exhausted retries, is written to
    /// the store. A result for an entry that was cancelled, evicted or
    /// replaced by a newer `generation` is dropped.
    pub async fn prepare(&self, key: &str, generation: u64, subject: &str) {
        let request = GenerationRequest::new(format!("Tell {subject}"), self.max_tokens)
            .with_system_instruction(self.system_instruction.clone())
            .with_temperature(self.temperature);

        let start = std::time::Instant::now();

        let state = match self.generate(&request).await {
            Ok(raw) => {
                let narration = narrate(&raw);
                if narration.text.is_empty() {
                    self.failed.add(1, &[KeyValue::new("reason", "empty")]);
                    tracing::warn!("generated story was empty after removing narrator tags");
                    StoryState::Failed {
                        message: "the generated story was empty".to_owned(),
                    }
                } else {
                    tracing::info!(persona = %narration.persona, chars = narration.text.len(), "story ready");
                    StoryState::Ready {
                        text: narration.text,
                        narration: narration.markup,
                    }
                }
            }
            Err(e) => {
                let reason = if e.is_retryable() { "exhausted" } else { "permanent" };
                self.failed.add(1, &[KeyValue::new("reason", reason)]);
                tracing::error!(error = %e, "story generation failed");
                StoryState::Failed { message: e.to_string() }
            }
        };

        metrics::record_duration(
            &self.duration,
            start,
            &[KeyValue::new("status", state.status().to_string())],
        );

        if !self.store.settle(key, generation, state, Instant::now()) {
            tracing::debug!("story is no longer pending, dropping result");
        }
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let mut attempt = 0;

        loop {
            match self.llm.generate(request).await {
                Ok(generation) => return Ok(generation.text),
                Err(e) if e.is_retryable() && attempt < self.retry.attempts => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry.attempts,
                        error = %e,
                        "story generation attempt failed, retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
