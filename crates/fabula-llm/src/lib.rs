#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod http_client;
pub mod protocol;
pub mod provider;
mod types;

use std::sync::Arc;

use fabula_config::{LlmConfig, LlmProviderType, parse_duration};
use url::Url;

pub use error::LlmError;
pub use provider::TextGenerator;
pub use types::{Generation, GenerationRequest};

use provider::{
    DEFAULT_BASE_URL, openai_chat::OpenAiChatProvider, openai_responses::OpenAiResponsesProvider,
};

/// Build the configured text generator
pub fn build_generator(config: &LlmConfig) -> anyhow::Result<Arc<dyn TextGenerator>> {
    let timeout = parse_duration("llm.timeout", &config.timeout)?;
    let client = http_client::http_client(timeout)?;

    let base_url = match &config.base_url {
        Some(url) => url.clone(),
        None => Url::parse(DEFAULT_BASE_URL)?,
    };

    if config.api_key.is_none() {
        tracing::warn!("no llm.api_key configured, requests are sent without authorization");
    }

    let generator: Arc<dyn TextGenerator> = match config.provider_type {
        LlmProviderType::OpenaiChat => Arc::new(OpenAiChatProvider::new(
            client,
            base_url,
            config.api_key.clone(),
            config.model.clone(),
        )),
        LlmProviderType::OpenaiResponses => Arc::new(OpenAiResponsesProvider::new(
            client,
            base_url,
            config.api_key.clone(),
            config.model.clone(),
        )),
    };

    tracing::debug!(provider = generator.name(), model = %config.model, "text generator initialized");

    Ok(generator)
}
