//! `OpenAI` Chat Completions and Responses API wire format types

use serde::{Deserialize, Serialize};

use crate::types::GenerationRequest;

// -- Chat Completions --

/// `OpenAI` chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChatRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<OpenAiMessage>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl OpenAiChatRequest {
    pub fn new(model: &str, request: &GenerationRequest) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(instruction) = &request.system_instruction {
            messages.push(OpenAiMessage {
                role: "system".to_owned(),
                content: Some(instruction.clone()),
            });
        }
        messages.push(OpenAiMessage {
            role: "user".to_owned(),
            content: Some(request.prompt.clone()),
        });

        Self {
            model: model.to_owned(),
            messages,
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
        }
    }
}

/// `OpenAI` message within a request or response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiMessage {
    /// Message role
    pub role: String,
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// `OpenAI` chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChatResponse {
    /// Completion identifier
    pub id: String,
    /// Generated choices
    #[serde(default)]
    pub choices: Vec<OpenAiChoice>,
}

impl OpenAiChatResponse {
    /// Text of the first choice, if any
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content.as_deref())
    }
}

/// A single completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChoice {
    pub index: u32,
    pub message: OpenAiMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

// -- Responses --

/// `OpenAI` Responses API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiResponsesRequest {
    /// Model identifier
    pub model: String,
    /// User input
    pub input: String,
    /// System-level instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Continue the conversation that produced this response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

impl OpenAiResponsesRequest {
    pub fn new(model: &str, request: &GenerationRequest) -> Self {
        Self {
            model: model.to_owned(),
            input: request.prompt.clone(),
            instructions: request.system_instruction.clone(),
            max_output_tokens: Some(request.max_tokens),
            temperature: request.temperature,
            previous_response_id: request.previous_response_id.clone(),
        }
    }
}

/// `OpenAI` Responses API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiResponsesResponse {
    /// Response identifier, usable as `previous_response_id`
    pub id: String,
    /// Convenience aggregate some compatible servers include
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
    /// Structured output blocks
    #[serde(default)]
    pub output: Vec<OpenAiOutputBlock>,
}

impl OpenAiResponsesResponse {
    /// Generated text
    ///
    /// Prefers `output_text`; otherwise joins every `output_text` part of
    /// every message block with newlines.
    pub fn text(&self) -> String {
        if let Some(text) = self.output_text.as_deref().filter(|t| !t.is_empty()) {
            return text.to_owned();
        }

        self.output
            .iter()
            .flat_map(|block| match block {
                OpenAiOutputBlock::Message { content } => content.as_slice(),
                OpenAiOutputBlock::Other => &[],
            })
            .filter_map(|part| match part {
                OpenAiOutputContent::OutputText { text } => Some(text.as_str()),
                OpenAiOutputContent::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Output block of a Responses API response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAiOutputBlock {
    /// Assistant message
    Message {
        #[serde(default)]
        content: Vec<OpenAiOutputContent>,
    },
    /// Reasoning, tool calls and anything else without speakable text
    #[serde(other)]
    Other,
}

/// Content part inside an output message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAiOutputContent {
    /// Generated text
    OutputText { text: String },
    /// Refusals, annotations and other part types
    #[serde(other)]
    Other,
}
