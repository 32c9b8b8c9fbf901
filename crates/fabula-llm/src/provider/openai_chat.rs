//! `OpenAI` Chat Completions provider

use std::time::Instant;

use async_trait::async_trait;
use fabula_telemetry::metrics;
use reqwest::Client;
use secrecy::SecretString;
use url::Url;

use super::{TextGenerator, authorize, endpoint, send};
use crate::error::LlmError;
use crate::protocol::openai::{OpenAiChatRequest, OpenAiChatResponse};
use crate::types::{Generation, GenerationRequest};

/// Chat Completions provider
///
/// Stateless: `previous_response_id` is ignored because the endpoint has
/// no server-side conversation storage.
pub struct OpenAiChatProvider {
    name: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    model: String,
    duration: metrics::Histogram<f64>,
}

impl OpenAiChatProvider {
    pub fn new(client: Client, base_url: Url, api_key: Option<SecretString>, model: String) -> Self {
        Self {
            name: "openai_chat".to_owned(),
            client,
            base_url,
            api_key,
            model,
            duration: metrics::llm_request_duration(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        if request.previous_response_id.is_some() {
            tracing::debug!(provider = %self.name, "ignoring previous_response_id for chat completions");
        }

        let wire_request = OpenAiChatRequest::new(&self.model, request);
        let builder = self
            .client
            .post(endpoint(&self.base_url, "chat/completions"))
            .json(&wire_request);

        let start = Instant::now();
        let result = send(&self.name, authorize(builder, self.api_key.as_ref())).await;
        metrics::record_duration(&self.duration, start, &[metrics::KeyValue::new("provider", self.name.clone())]);

        let wire_response: OpenAiChatResponse = result?
            .json()
            .await
            .map_err(|e| LlmError::Upstream(format!("failed to parse response: {e}")))?;

        let text = wire_response
            .first_text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(LlmError::EmptyResponse)?
            .to_owned();

        tracing::debug!(provider = %self.name, id = %wire_response.id, chars = text.len(), "completion received");

        Ok(Generation {
            text,
            response_id: Some(wire_response.id),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
