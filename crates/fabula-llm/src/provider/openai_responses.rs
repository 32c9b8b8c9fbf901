//! `OpenAI` Responses provider with conversation chaining

use std::time::Instant;

use async_trait::async_trait;
use fabula_telemetry::metrics;
use reqwest::Client;
use secrecy::SecretString;
use url::Url;

use super::{TextGenerator, authorize, endpoint, send};
use crate::error::LlmError;
use crate::protocol::openai::{OpenAiResponsesRequest, OpenAiResponsesResponse};
use crate::types::{Generation, GenerationRequest};

/// Responses API provider
pub struct OpenAiResponsesProvider {
    name: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    model: String,
    duration: metrics::Histogram<f64>,
}

impl OpenAiResponsesProvider {
    pub fn new(client: Client, base_url: Url, api_key: Option<SecretString>, model: String) -> Self {
        Self {
            name: "openai_responses".to_owned(),
            client,
            base_url,
            api_key,
            model,
            duration: metrics::llm_request_duration(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiResponsesProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        let wire_request = OpenAiResponsesRequest::new(&self.model, request);
        let builder = self.client.post(endpoint(&self.base_url, "responses")).json(&wire_request);

        let start = Instant::now();
        let result = send(&self.name, authorize(builder, self.api_key.as_ref())).await;
        metrics::record_duration(&self.duration, start, &[metrics::KeyValue::new("provider", self.name.clone())]);

        let wire_response: OpenAiResponsesResponse = result?
            .json()
            .await
            .map_err(|e| LlmError::Upstream(format!("failed to parse response: {e}")))?;

        let text = wire_response.text().trim().to_owned();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        tracing::debug!(
            provider = %self.name,
            id = %wire_response.id,
            chained = request.previous_response_id.is_some(),
            "response received"
        );

        Ok(Generation {
            text,
            response_id: Some(wire_response.id),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
