//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use fabula_config::{Config, LlmProviderType, RetryConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with fast retries and the health route enabled
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        config.server.health.enabled = true;
        config.llm.timeout = "5s".to_owned();
        config.story.retry = RetryConfig {
            attempts: 2,
            delay: "10ms".to_owned(),
        };

        Self { config }
    }

    /// Point the text generator at a mock backend using the given API flavor
    pub fn with_mock_llm(mut self, provider_type: LlmProviderType, base_url: &str) -> Self {
        self.config.llm.provider_type = provider_type;
        self.config.llm.api_key = Some(SecretString::from("test-key"));
        self.config.llm.base_url = Some(base_url.parse().expect("valid URL"));
        self
    }

    /// Set the number of extra generation attempts for stories
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.config.story.retry.attempts = attempts;
        self
    }

    /// Mount the skill endpoint somewhere else
    pub fn with_skill_path(mut self, path: &str) -> Self {
        self.config.server.skill_path = path.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config.validate().expect("test configuration must be valid");
        self.config
    }
}
