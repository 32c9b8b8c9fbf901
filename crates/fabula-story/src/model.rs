use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Externally visible status of a story entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StoryStatus {
    Preparing,
    Ready,
    Error,
}

/// Lifecycle state of a story, carrying exactly the payload its status allows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryState {
    /// Generation is still running
    Preparing,
    /// Generation finished
    Ready {
        /// Plain story text for display
        text: String,
        /// Speech markup naming the narrating voice
        narration: String,
    },
    /// Generation failed after all retries
    Failed { message: String },
}

impl StoryState {
    pub const fn status(&self) -> StoryStatus {
        match self {
            Self::Preparing => StoryStatus::Preparing,
            Self::Ready { .. } => StoryStatus::Ready,
            Self::Failed { .. } => StoryStatus::Error,
        }
    }
}

/// One story generation task, in flight or finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    /// Conversation-scoped identifier
    pub key: String,
    /// What the user asked a story about
    pub subject: String,
    pub state: StoryState,
    /// Process-unique token for this request; only the task started for it may settle it
    pub generation: u64,
    /// Creation time, refreshed when the story settles
    pub created_at: Instant,
}

impl StoryRequest {
    /// A fresh entry for a story that has just been requested
    pub fn preparing(key: impl Into<String>, subject: impl Into<String>, now: Instant) -> Self {
        Self {
            key: key.into(),
            subject: subject.into(),
            state: StoryState::Preparing,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            created_at: now,
        }
    }

    pub const fn status(&self) -> StoryStatus {
        self.state.status()
    }

    /// Whether generation has finished, successfully or not
    pub const fn is_settled(&self) -> bool {
        !matches!(self.state, StoryState::Preparing)
    }

    pub fn result_text(&self) -> Option<&str> {
        match &self.state {
            StoryState::Ready { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn narrated_markup(&self) -> Option<&str> {
        match &self.state {
            StoryState::Ready { narration, .. } => Some(narration),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            StoryState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Time since the entry was created, zero if `now` is earlier
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}
