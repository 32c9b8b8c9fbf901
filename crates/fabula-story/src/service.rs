use std::sync::Arc;

use fabula_config::{Config, parse_duration};
use fabula_llm::TextGenerator;
use fabula_telemetry::metrics::{self, Counter, KeyValue};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::generator::{RetryPolicy, StoryGenerator};
use crate::model::{StoryRequest, StoryState};
use crate::store::{MemoryStore, StoryStore};
use crate::tiers::WaitTiers;

const STARTED_SPEECH: &str = "I'm preparing your story. <break time='1s'/> Would you like to hear it when it's ready?";
const STARTED_REPROMPT: &str = "Would you like to hear the story when it's ready?";

const NOT_FOUND_SPEECH: &str =
    "I'm sorry, I couldn't find your story. Would you like to try asking for a different story?";
const NOT_FOUND_REPROMPT: &str = "Would you like to try asking for a different story?";

const DELIVERED_REPROMPT: &str = "Would you like to hear another story?";
const FAILED_REPROMPT: &str = "Would you like to try asking for a story again?";

const CANCELLED_SPEECH: &str = "No problem. You can ask for a different story or question whenever you're ready.";
const CANCELLED_REPROMPT: &str = "What would you like to do?";

/// Something to say, and what to say if the user stays silent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub speech: String,
    pub reprompt: String,
}

impl Prompt {
    fn new(speech: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            reprompt: reprompt.into(),
        }
    }
}

/// Acknowledgement for a story whose preparation has just begun
#[derive(Debug)]
pub struct StoryStarted {
    pub prompt: Prompt,
    /// Background generation task
    pub task: JoinHandle<()>,
}

/// Outcome class of a confirmation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Nothing is stored under the key
    NotFound,
    /// Still generating; `tier` indexes the wait tier used for phrasing
    Preparing { tier: usize },
    /// Story delivered and removed from the store
    Delivered,
    /// Generation failed; entry removed from the store
    Failed,
}

/// Reply to a confirmation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryReply {
    pub state: PollState,
    pub speech: String,
    pub reprompt: String,
    /// Plain story text for screen devices, only when delivered
    pub display: Option<String>,
    /// Whether the story is still pending and the next "yes" should poll again
    pub should_offer_more: bool,
}

impl StoryReply {
    fn new(state: PollState, prompt: Prompt) -> Self {
        Self {
            state,
            speech: prompt.speech,
            reprompt: prompt.reprompt,
            display: None,
            should_offer_more: matches!(state, PollState::Preparing { .. }),
        }
    }
}

/// Starts, polls and cancels stories for conversations
pub struct StoryService {
    store: Arc<dyn StoryStore>,
    generator: Arc<StoryGenerator>,
    tiers: WaitTiers,
    started: Counter<u64>,
    delivered: Counter<u64>,
    cancelled: Counter<u64>,
    evicted: Counter<u64>,
}

impl StoryService {
    pub fn new(store: Arc<dyn StoryStore>, generator: Arc<StoryGenerator>, tiers: WaitTiers) -> Self {
        Self {
            store,
            generator,
            tiers,
            started: metrics::counter(metrics::STORY_STARTED),
            delivered: metrics::counter(metrics::STORY_DELIVERED),
            cancelled: metrics::counter(metrics::STORY_CANCELLED),
            evicted: metrics::counter(metrics::STORY_EVICTED),
        }
    }

    /// Build the service with an in-memory store from configuration
    ///
    /// Pending stories are kept past `story.max_age` for as long as one
    /// generation may run with every retry at the full `llm.timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if a duration or wait tier is invalid
    pub fn from_config(config: &Config, llm: Arc<dyn TextGenerator>) -> anyhow::Result<Self> {
        let story = &config.story;
        let max_age = parse_duration("story.max_age", &story.max_age)?;
        let timeout = parse_duration("llm.timeout", &config.llm.timeout)?;
        let retry = RetryPolicy {
            attempts: story.retry.attempts,
            delay: parse_duration("story.retry.delay", &story.retry.delay)?,
        };
        let tiers = WaitTiers::from_config(&story.wait_tiers)?;

        let store: Arc<dyn StoryStore> = Arc::new(
            MemoryStore::new(story.capacity, max_age).with_generation_budget(retry.worst_case(timeout)),
        );
        let generator = StoryGenerator::new(
            llm,
            store.clone(),
            retry,
            story.system_instruction.clone(),
            config.llm.max_tokens,
        )
        .with_temperature(config.llm.temperature);

        Ok(Self::new(store, Arc::new(generator), tiers))
    }

    /// Record a new story under `key` and start generating it in the background
    ///
    /// Returns without waiting for generation. Any earlier entry under the
    /// same key is replaced.
    pub fn start_story(&self, subject: &str, key: &str) -> StoryStarted {
        let entry = StoryRequest::preparing(key, subject, Instant::now());
        let generation = entry.generation;
        self.store.put(entry);
        self.started.add(1, &[]);
        tracing::info!(key, subject, generation, "story preparation started");

        let task = self.generator.spawn(key.to_owned(), generation, subject.to_owned());

        StoryStarted {
            prompt: Prompt::new(STARTED_SPEECH, STARTED_REPROMPT),
            task,
        }
    }

    /// Report on the story stored under `key`
    pub fn poll_story(&self, key: &str) -> StoryReply {
        self.poll_story_at(key, Instant::now())
    }

    /// Report on the story stored under `key` as of `now`
    ///
    /// A settled story is removed from the store as it is reported.
    pub fn poll_story_at(&self, key: &str, now: Instant) -> StoryReply {
        let Some(entry) = self.store.take_settled(key) else {
            tracing::debug!(key, "no story found");
            return StoryReply::new(PollState::NotFound, Prompt::new(NOT_FOUND_SPEECH, NOT_FOUND_REPROMPT));
        };

        match entry.state {
            StoryState::Preparing => {
                let elapsed = entry.elapsed(now);
                let (index, tier) = self.tiers.select(elapsed);
                tracing::debug!(key, elapsed_secs = elapsed.as_secs(), tier = index, "story still preparing");
                StoryReply::new(
                    PollState::Preparing { tier: index },
                    Prompt::new(tier.phrases.pick(), tier.reprompt.clone()),
                )
            }
            StoryState::Ready { text, narration } => {
                self.delivered.add(1, &[]);
                tracing::info!(key, "story delivered");
                let mut reply = StoryReply::new(PollState::Delivered, Prompt::new(narration, DELIVERED_REPROMPT));
                reply.display = Some(text);
                reply
            }
            StoryState::Failed { message } => {
                tracing::info!(key, error = %message, "reporting failed story");
                StoryReply::new(
                    PollState::Failed,
                    Prompt::new(
                        format!(
                            "I'm sorry, there was a problem preparing {}. Would you like to try again?",
                            entry.subject
                        ),
                        FAILED_REPROMPT,
                    ),
                )
            }
        }
    }

    /// Discard the story stored under `key`, whatever its state
    pub fn cancel_story(&self, key: &str) -> Prompt {
        let existed = self.store.delete(key);
        self.cancelled.add(1, &[KeyValue::new("existed", existed)]);
        tracing::info!(key, existed, "story cancelled");

        Prompt::new(CANCELLED_SPEECH, CANCELLED_REPROMPT)
    }

    /// Apply the store's age and capacity bounds as of now
    pub fn evict(&self) -> usize {
        let evicted = self.store.evict(Instant::now());
        if evicted > 0 {
            self.evicted.add(evicted as u64, &[]);
        }
        evicted
    }
}
