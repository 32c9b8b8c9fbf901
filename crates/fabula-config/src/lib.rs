#![allow(clippy::must_use_candidate)]

mod env;
pub mod health;
pub mod llm;
mod loader;
pub mod server;
pub mod skill;
pub mod story;
pub mod telemetry;

use std::time::Duration;

use serde::Deserialize;

pub use health::*;
pub use llm::*;
pub use server::*;
pub use skill::*;
pub use story::*;
pub use telemetry::{LogFormat, OtlpConfig, OtlpProtocol, TelemetryConfig};

/// Top-level Fabula configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Text-generation provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Story preparation and polling configuration
    #[serde(default)]
    pub story: StoryConfig,
    /// Skill presentation configuration
    #[serde(default)]
    pub skill: SkillConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

/// Parse a human-readable duration such as `"45s"` or `"5m"`
///
/// # Errors
///
/// Returns an error naming the offending field when the value is not a valid duration
pub fn parse_duration(field: &str, value: &str) -> anyhow::Result<Duration> {
    duration_str::parse(value).map_err(|e| anyhow::anyhow!("invalid duration for {field} '{value}': {e}"))
}
