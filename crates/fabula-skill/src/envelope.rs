//! Incoming skill request envelope

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::attributes::SessionAttributes;

/// Device interface key advertising visual rendering support
pub const APL_INTERFACE: &str = "Alexa.Presentation.APL";

/// One request from the voice platform
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub context: Option<Context>,
    pub request: Request,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub attributes: Option<SessionAttributes>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    #[serde(rename = "System", default)]
    pub system: Option<SystemContext>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemContext {
    #[serde(default)]
    pub device: Option<Device>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub supported_interfaces: Map<String, Value>,
}

/// Request body, tagged by its `type` field
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    LaunchRequest(LaunchRequest),
    IntentRequest(IntentRequest),
    SessionEndedRequest(SessionEndedRequest),
    /// Any request kind this skill does not handle
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub request_id: String,
    pub intent: Intent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedRequest {
    pub request_id: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub value: Option<String>,
}

impl RequestEnvelope {
    /// Identifier of this request, if the request kind carries one
    pub fn request_id(&self) -> Option<&str> {
        match &self.request {
            Request::LaunchRequest(r) => Some(&r.request_id),
            Request::IntentRequest(r) => Some(&r.request_id),
            Request::SessionEndedRequest(r) => Some(&r.request_id),
            Request::Unknown => None,
        }
    }

    pub const fn request_kind(&self) -> &'static str {
        match &self.request {
            Request::LaunchRequest(_) => "LaunchRequest",
            Request::IntentRequest(_) => "IntentRequest",
            Request::SessionEndedRequest(_) => "SessionEndedRequest",
            Request::Unknown => "Unknown",
        }
    }

    pub fn intent_name(&self) -> Option<&str> {
        match &self.request {
            Request::IntentRequest(r) => Some(&r.intent.name),
            _ => None,
        }
    }

    /// Trimmed value of a filled slot; empty values count as missing
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        let Request::IntentRequest(r) = &self.request else {
            return None;
        };

        r.intent
            .slots
            .get(name)
            .and_then(|slot| slot.value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Whether the requesting device can render visual documents
    pub fn supports_apl(&self) -> bool {
        self.context
            .as_ref()
            .and_then(|c| c.system.as_ref())
            .and_then(|s| s.device.as_ref())
            .is_some_and(|d| d.supported_interfaces.contains_key(APL_INTERFACE))
    }

    /// Session attributes sent back by the platform, empty for a new session
    pub fn attributes(&self) -> SessionAttributes {
        self.session
            .as_ref()
            .and_then(|s| s.attributes.clone())
            .unwrap_or_default()
    }
}
