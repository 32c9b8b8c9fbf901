use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

/// Logging and OpenTelemetry export configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// `service.name` resource attribute
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Extra resource attributes attached to every span and metric
    #[serde(default)]
    pub resource_attributes: BTreeMap<String, String>,
    /// Console log line format
    #[serde(default)]
    pub log_format: LogFormat,
    /// OTLP export of spans and metrics, disabled when absent
    #[serde(default)]
    pub otlp: Option<OtlpConfig>,
}

/// Console log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OtlpConfig {
    /// Collector endpoint
    pub endpoint: Url,
    #[serde(default)]
    pub protocol: OtlpProtocol,
    /// How often metrics are pushed (e.g. "30s")
    #[serde(default = "default_export_interval")]
    pub export_interval: String,
    /// Fraction of root spans kept, between 0.0 and 1.0
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
    /// Follow the sampling decision of an incoming parent span
    #[serde(default = "default_parent_based")]
    pub parent_based: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtlpProtocol {
    #[default]
    Grpc,
    HttpProto,
}

fn default_service_name() -> String {
    "fabula".to_string()
}

fn default_export_interval() -> String {
    "30s".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_sampling_ratio() -> f64 {
    1.0
}

#[allow(clippy::missing_const_for_fn)]
fn default_parent_based() -> bool {
    true
}
