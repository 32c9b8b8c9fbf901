//! Outgoing skill response envelope

use serde::Serialize;
use serde_json::Value;

use crate::attributes::SessionAttributes;

const RESPONSE_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: &'static str,
    pub session_attributes: SessionAttributes,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

/// Speech markup, always wrapped in a single `<speak>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub ssml: String,
}

impl OutputSpeech {
    pub fn ssml(markup: &str) -> Self {
        let markup = markup.trim();
        let ssml = if markup.starts_with("<speak>") {
            markup.to_owned()
        } else {
            format!("<speak>{markup}</speak>")
        };
        Self { kind: "SSML", ssml }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

/// Builder for a single turn's response
///
/// A reprompt keeps the session open; without one the platform decides,
/// unless [`ResponseBuilder::end_session`] is called.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    body: ResponseBody,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn speak(mut self, markup: &str) -> Self {
        self.body.output_speech = Some(OutputSpeech::ssml(markup));
        self
    }

    #[must_use]
    pub fn reprompt(mut self, markup: &str) -> Self {
        self.body.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::ssml(markup),
        });
        self.body.should_end_session = Some(false);
        self
    }

    #[must_use]
    pub fn directive(mut self, directive: Option<Value>) -> Self {
        self.body.directives.extend(directive);
        self
    }

    #[must_use]
    pub const fn end_session(mut self) -> Self {
        self.body.should_end_session = Some(true);
        self
    }

    pub fn build(self, session_attributes: SessionAttributes) -> ResponseEnvelope {
        ResponseEnvelope {
            version: RESPONSE_VERSION,
            session_attributes,
            response: self.body,
        }
    }
}
