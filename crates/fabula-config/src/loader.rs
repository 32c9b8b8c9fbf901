use std::path::Path;
use std::time::Duration;

use crate::{Config, parse_duration};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        tracing::debug!(path = %path.display(), "configuration loaded");

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency found
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_story()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        if !self.server.skill_path.starts_with('/') {
            anyhow::bail!("server.skill_path must start with '/'");
        }

        if self.server.health.enabled && self.server.health.path == self.server.skill_path {
            anyhow::bail!("server.health.path must differ from server.skill_path");
        }

        Ok(())
    }

    fn validate_llm(&self) -> anyhow::Result<()> {
        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model must not be empty");
        }

        if self.llm.max_tokens == 0 {
            anyhow::bail!("llm.max_tokens must be greater than 0");
        }

        if let Some(temperature) = self.llm.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            anyhow::bail!("llm.temperature must be between 0.0 and 2.0");
        }

        parse_duration("llm.timeout", &self.llm.timeout)?;

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        let Some(otlp) = self.telemetry.as_ref().and_then(|t| t.otlp.as_ref()) else {
            return Ok(());
        };

        if !(0.0..=1.0).contains(&otlp.sampling_ratio) {
            anyhow::bail!("telemetry.otlp.sampling_ratio must be between 0.0 and 1.0");
        }

        if parse_duration("telemetry.otlp.export_interval", &otlp.export_interval)?.is_zero() {
            anyhow::bail!("telemetry.otlp.export_interval must be greater than 0");
        }

        Ok(())
    }

    fn validate_story(&self) -> anyhow::Result<()> {
        let story = &self.story;

        if story.capacity == 0 {
            anyhow::bail!("story.capacity must be greater than 0");
        }

        parse_duration("story.max_age", &story.max_age)?;
        parse_duration("story.retry.delay", &story.retry.delay)?;

        if story.wait_tiers.is_empty() {
            anyhow::bail!("story.wait_tiers must define at least one tier");
        }

        let mut previous: Option<Duration> = None;
        for (index, tier) in story.wait_tiers.iter().enumerate() {
            let after = parse_duration(&format!("story.wait_tiers[{index}].after"), &tier.after)?;

            match previous {
                None if !after.is_zero() => {
                    anyhow::bail!("the first story wait tier must start at 0s");
                }
                Some(prev) if after <= prev => {
                    anyhow::bail!("story wait tiers must have strictly increasing 'after' values");
                }
                _ => {}
            }

            if tier.phrases.iter().all(|p| p.trim().is_empty()) {
                anyhow::bail!("story.wait_tiers[{index}] must have at least one non-empty phrase");
            }

            previous = Some(after);
        }

        Ok(())
    }
}
