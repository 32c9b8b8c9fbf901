use std::net::SocketAddr;

use serde::Deserialize;

use crate::health::HealthConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    /// Path the voice platform posts skill request envelopes to
    #[serde(default = "default_skill_path")]
    pub skill_path: String,
    #[serde(default)]
    pub health: HealthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            skill_path: default_skill_path(),
            health: HealthConfig::default(),
        }
    }
}

fn default_skill_path() -> String {
    "/skill".to_string()
}
