use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Text-generation provider configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Provider protocol type
    #[serde(rename = "type", default)]
    pub provider_type: LlmProviderType,
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,
    /// Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Per-request timeout (e.g. "120s")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_type: LlmProviderType::default(),
            api_key: None,
            base_url: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout: default_timeout(),
        }
    }
}

/// Supported provider protocols
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProviderType {
    /// `OpenAI` Chat Completions API
    #[default]
    OpenaiChat,
    /// `OpenAI` Responses API, which supports `previous_response_id` chaining
    OpenaiResponses,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout() -> String {
    "120s".to_string()
}
