use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Conversation state round-tripped through the platform session
///
/// Unknown attributes are preserved so other writers are not clobbered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAttributes {
    /// Key of the story this conversation is waiting for
    #[serde(default)]
    pub story_request_id: Option<String>,
    /// Set while the next "yes" or "no" refers to a pending story
    #[serde(default)]
    pub awaiting_story_confirmation: bool,
    /// Provider response to continue from on the next question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl SessionAttributes {
    /// Key of the pending story, if a confirmation is awaited
    pub fn pending_story(&self) -> Option<&str> {
        if self.awaiting_story_confirmation {
            self.story_request_id.as_deref()
        } else {
            None
        }
    }

    pub fn await_story(&mut self, key: impl Into<String>) {
        self.story_request_id = Some(key.into());
        self.awaiting_story_confirmation = true;
    }

    pub fn clear_story(&mut self) {
        self.story_request_id = None;
        self.awaiting_story_confirmation = false;
    }
}
