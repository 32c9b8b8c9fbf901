//! Asynchronous story preparation
//!
//! A story turn records a `preparing` entry and starts generation on a
//! detached task. Later confirmation turns poll the entry: they deliver a
//! finished story, explain a failure, or phrase a wait message according to
//! how long the story has been pending.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod generator;
mod model;
mod narration;
mod service;
mod store;
#[cfg(test)]
mod testing;
mod tiers;

use std::sync::Arc;

use fabula_config::Config;
use fabula_llm::TextGenerator;

pub use generator::{RetryPolicy, StoryGenerator};
pub use model::{StoryRequest, StoryState, StoryStatus};
pub use narration::{Narration, Persona, narrate, strip_persona_tags};
pub use service::{PollState, Prompt, StoryReply, StoryService, StoryStarted};
pub use store::{MemoryStore, StoryStore};
pub use tiers::{WaitTier, WaitTiers};

/// Build the story service described by `config` on top of `llm`
pub fn build_service(config: &Config, llm: Arc<dyn TextGenerator>) -> anyhow::Result<Arc<StoryService>> {
    let service = StoryService::from_config(config, llm)?;
    Ok(Arc::new(service))
}
