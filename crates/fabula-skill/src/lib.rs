//! Voice skill endpoint
//!
//! Turns platform request envelopes into spoken and visual responses:
//! launch, questions answered synchronously, stories prepared in the
//! background and delivered on a later "yes".

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod apl;
mod attributes;
pub mod dispatch;
pub mod envelope;
mod error;
mod phrases;
mod request;
pub mod response;
mod skill;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use fabula_config::Config;
use fabula_llm::TextGenerator;

pub use attributes::SessionAttributes;
pub use error::{SkillError, TurnError};
pub use skill::Skill;

use request::ExtractEnvelope;
use response::ResponseEnvelope;

/// Build the skill and its story service from configuration
pub fn build_skill(config: &Config, llm: Arc<dyn TextGenerator>) -> anyhow::Result<Arc<Skill>> {
    let stories = fabula_story::build_service(config, llm.clone())?;
    let skill = Skill::new(config, llm, stories)
        .map_err(|e| anyhow::anyhow!("failed to initialize skill: {e}"))?;
    Ok(Arc::new(skill))
}

/// Create the endpoint router for the skill, mounted at `path`
pub fn endpoint_router(path: &str) -> Router<Arc<Skill>> {
    Router::new().route(path, post(handle_turn))
}

/// Handle one skill request
async fn handle_turn(
    State(skill): State<Arc<Skill>>,
    ExtractEnvelope(envelope): ExtractEnvelope,
) -> Json<ResponseEnvelope> {
    tracing::debug!(kind = envelope.request_kind(), "skill request received");

    Json(skill.handle(&envelope).await)
}
