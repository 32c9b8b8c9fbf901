//! Classification of requests into conversational turns

use serde_json::Value;

use crate::TurnError;
use crate::envelope::{Request, RequestEnvelope};

pub const QUESTION_INTENT: &str = "QuestionIntent";
pub const STORY_INTENT: &str = "StoryIntent";
pub const YES_INTENT: &str = "AMAZON.YesIntent";
pub const NO_INTENT: &str = "AMAZON.NoIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const FALLBACK_INTENT: &str = "AMAZON.FallbackIntent";

const QUESTION_SLOT: &str = "question";
const SUBJECT_SLOT: &str = "subject";

/// One conversational turn, borrowed from its request envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Turn<'a> {
    Launch,
    Question { question: &'a str },
    Story { subject: &'a str, key: &'a str },
    Yes,
    No,
    Help,
    CancelOrStop,
    Fallback,
    SessionEnded {
        reason: Option<&'a str>,
        error: Option<&'a Value>,
    },
}

impl<'a> Turn<'a> {
    /// Classify a request, or explain why no turn handles it
    pub fn classify(envelope: &'a RequestEnvelope) -> Result<Self, TurnError> {
        let intent = match &envelope.request {
            Request::LaunchRequest(_) => return Ok(Self::Launch),
            Request::SessionEndedRequest(ended) => {
                return Ok(Self::SessionEnded {
                    reason: ended.reason.as_deref(),
                    error: ended.error.as_ref(),
                });
            }
            Request::IntentRequest(request) => request,
            Request::Unknown => return Err(TurnError::Unhandled("unknown request type".to_owned())),
        };

        let turn = match intent.intent.name.as_str() {
            QUESTION_INTENT => Self::Question {
                question: envelope
                    .slot_value(QUESTION_SLOT)
                    .ok_or(TurnError::MissingSlot(QUESTION_SLOT))?,
            },
            STORY_INTENT => Self::Story {
                subject: envelope
                    .slot_value(SUBJECT_SLOT)
                    .ok_or(TurnError::MissingSlot(SUBJECT_SLOT))?,
                key: &intent.request_id,
            },
            YES_INTENT => Self::Yes,
            NO_INTENT => Self::No,
            HELP_INTENT => Self::Help,
            CANCEL_INTENT | STOP_INTENT => Self::CancelOrStop,
            FALLBACK_INTENT => Self::Fallback,
            other => return Err(TurnError::Unhandled(format!("intent '{other}'"))),
        };

        Ok(turn)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Launch => "launch",
            Self::Question { .. } => "question",
            Self::Story { .. } => "story",
            Self::Yes => "yes",
            Self::No => "no",
            Self::Help => "help",
            Self::CancelOrStop => "cancel_or_stop",
            Self::Fallback => "fallback",
            Self::SessionEnded { .. } => "session_ended",
        }
    }
}
