//! Text-generation provider trait and implementations

pub mod openai_chat;
pub mod openai_responses;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::LlmError;
use crate::types::{Generation, GenerationRequest};

/// Default `OpenAI` API base URL
pub(crate) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Generates text for a prompt
///
/// Implemented by every upstream provider; the story generator and the
/// question handler only ever see this trait.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a single request
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Join a path onto the provider base URL
pub(crate) fn endpoint(base_url: &Url, path: &str) -> String {
    let base = base_url.as_str().trim_end_matches('/');
    format!("{base}/{path}")
}

/// Attach the bearer token when one is configured
pub(crate) fn authorize(builder: RequestBuilder, api_key: Option<&SecretString>) -> RequestBuilder {
    match api_key {
        Some(key) => builder.bearer_auth(key.expose_secret()),
        None => builder,
    }
}

/// Send a request and turn transport failures and non-success statuses into `LlmError`
pub(crate) async fn send(provider: &str, builder: RequestBuilder) -> Result<Response, LlmError> {
    let response = builder.send().await.map_err(|e| {
        tracing::error!(provider, error = %e, "upstream request failed");
        LlmError::from_transport(&e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(provider, %status, "upstream returned error");
        return Err(LlmError::from_status(status, body));
    }

    Ok(response)
}
