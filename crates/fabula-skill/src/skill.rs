use std::sync::Arc;

use fabula_config::Config;
use fabula_llm::{GenerationRequest, TextGenerator};
use fabula_story::{PollState, StoryService};

use crate::apl::{Renderer, View};
use crate::attributes::SessionAttributes;
use crate::dispatch::Turn;
use crate::envelope::RequestEnvelope;
use crate::phrases::SkillPhrases;
use crate::response::{ResponseBuilder, ResponseEnvelope};

const TROUBLE: &str = "Sorry, I had trouble doing what you asked. Please try again.";
const ANOTHER_QUESTION: &str = "Do you want to ask another question?";
const ASK_ANOTHER: &str = "Ask me another question!";
const QUESTION_FAILED: &str = "Sorry, there was a problem getting the AI response.";
const HELP: &str = "Just ask me a question or anything really! I'll do my best to answer it. What do you want to know";
const HELP_REPROMPT: &str = "Are you still there? Ask me a question.";
const FALLBACK: &str = "Sorry, I don't know about that. Please try again.";

/// Handles skill requests one turn at a time
pub struct Skill {
    stories: Arc<StoryService>,
    llm: Arc<dyn TextGenerator>,
    renderer: Renderer,
    phrases: SkillPhrases,
    max_tokens: u32,
    temperature: Option<f64>,
}

impl Skill {
    pub fn new(config: &Config, llm: Arc<dyn TextGenerator>, stories: Arc<StoryService>) -> anyhow::Result<Self> {
        Ok(Self {
            stories,
            llm,
            renderer: Renderer::new(config.skill.title.clone(), config.skill.background_image_url.clone()),
            phrases: SkillPhrases::new()?,
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
        })
    }

    /// Answer one request
    ///
    /// Always produces a speakable response; a turn that cannot be handled
    /// gets a generic apology.
    pub async fn handle(&self, envelope: &RequestEnvelope) -> ResponseEnvelope {
        self.stories.evict();

        let mut attributes = envelope.attributes();

        let builder = match Turn::classify(envelope) {
            Ok(turn) => {
                tracing::info!(turn = turn.name(), request_id = envelope.request_id(), "handling turn");
                self.respond(turn, envelope.supports_apl(), &mut attributes).await
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    kind = envelope.request_kind(),
                    intent = envelope.intent_name(),
                    "turn could not be handled"
                );
                ResponseBuilder::new().speak(TROUBLE).reprompt(TROUBLE)
            }
        };

        builder.build(attributes)
    }

    async fn respond(&self, turn: Turn<'_>, apl: bool, attributes: &mut SessionAttributes) -> ResponseBuilder {
        match turn {
            Turn::Launch => self.launch(apl),
            Turn::Question { question } => self.answer(question, apl, attributes).await,
            Turn::Story { subject, key } => self.start_story(subject, key, attributes),
            Turn::Yes => self.confirm(apl, attributes),
            Turn::No => self.decline(apl, attributes),
            Turn::Help => ResponseBuilder::new()
                .speak(HELP)
                .reprompt(HELP_REPROMPT)
                .directive(self.renderer.render(apl, View::Response { text: HELP, speech: None })),
            Turn::CancelOrStop => self.goodbye(apl).end_session(),
            Turn::Fallback => ResponseBuilder::new().speak(FALLBACK).reprompt(FALLBACK),
            Turn::SessionEnded { reason, error } => {
                tracing::info!(reason, error = ?error, "session ended");
                ResponseBuilder::new()
            }
        }
    }

    fn launch(&self, apl: bool) -> ResponseBuilder {
        let intro = self.phrases.intro();
        let hint = self.phrases.launch_hint();

        ResponseBuilder::new()
            .speak(&format!(
                "<amazon:emotion name='excited' intensity='medium'>{intro}</amazon:emotion>"
            ))
            .reprompt(&hint)
            .directive(self.renderer.render(apl, View::Intro { text: intro, hint: &hint }))
    }

    async fn answer(&self, question: &str, apl: bool, attributes: &mut SessionAttributes) -> ResponseBuilder {
        let request = GenerationRequest::new(question, self.max_tokens)
            .with_temperature(self.temperature)
            .with_previous_response_id(attributes.previous_response_id.clone());

        match self.llm.generate(&request).await {
            Ok(generation) => {
                attributes.previous_response_id = generation.response_id;
                ResponseBuilder::new()
                    .speak(&generation.text)
                    .reprompt(ANOTHER_QUESTION)
                    .directive(self.renderer.render(
                        apl,
                        View::Response {
                            text: &generation.text,
                            speech: None,
                        },
                    ))
            }
            Err(e) => {
                tracing::error!(error = %e, provider = self.llm.name(), "question could not be answered");
                ResponseBuilder::new().speak(QUESTION_FAILED).directive(self.renderer.render(
                    apl,
                    View::Response {
                        text: QUESTION_FAILED,
                        speech: None,
                    },
                ))
            }
        }
    }

    fn start_story(&self, subject: &str, key: &str, attributes: &mut SessionAttributes) -> ResponseBuilder {
        let started = self.stories.start_story(subject, key);
        attributes.await_story(key);

        ResponseBuilder::new()
            .speak(&started.prompt.speech)
            .reprompt(&started.prompt.reprompt)
    }

    fn confirm(&self, apl: bool, attributes: &mut SessionAttributes) -> ResponseBuilder {
        let Some(key) = attributes.pending_story().map(str::to_owned) else {
            return ResponseBuilder::new()
                .speak(ASK_ANOTHER)
                .reprompt(ANOTHER_QUESTION)
                .directive(self.renderer.render(
                    apl,
                    View::Response {
                        text: ASK_ANOTHER,
                        speech: None,
                    },
                ));
        };

        let reply = self.stories.poll_story(&key);
        if !reply.should_offer_more {
            attributes.clear_story();
        }

        let mut builder = ResponseBuilder::new().speak(&reply.speech).reprompt(&reply.reprompt);

        if let (PollState::Delivered, Some(text)) = (reply.state, reply.display.as_deref()) {
            builder = builder.directive(self.renderer.render(
                apl,
                View::Response {
                    text,
                    speech: Some(&reply.speech),
                },
            ));
        }

        builder
    }

    fn decline(&self, apl: bool, attributes: &mut SessionAttributes) -> ResponseBuilder {
        let Some(key) = attributes.pending_story().map(str::to_owned) else {
            return self.goodbye(apl);
        };

        let prompt = self.stories.cancel_story(&key);
        attributes.clear_story();

        ResponseBuilder::new().speak(&prompt.speech).reprompt(&prompt.reprompt)
    }

    fn goodbye(&self, apl: bool) -> ResponseBuilder {
        let goodbye = self.phrases.goodbye();

        ResponseBuilder::new()
            .speak(goodbye)
            .directive(self.renderer.render(
                apl,
                View::Response {
                    text: goodbye,
                    speech: None,
                },
            ))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use fabula_llm::LlmError;
    use serde_json::{Value, json};

    use super::*;
    use crate::testing::CannedGenerator;

    fn skill(llm: CannedGenerator) -> (Arc<CannedGenerator>, Skill) {
        let config = Config::default();
        let llm = Arc::new(llm);
        let stories = fabula_story::build_service(&config, llm.clone()).unwrap();
        let skill = Skill::new(&config, llm.clone(), stories).unwrap();
        (llm, skill)
    }

    fn envelope(request: Value, attributes: &SessionAttributes, apl: bool) -> RequestEnvelope {
        let interfaces = if apl {
            json!({"Alexa.Presentation.APL": {}})
        } else {
            json!({})
        };

        serde_json::from_value(json!({
            "version": "1.0",
            "session": {"new": false, "sessionId": "s-1", "attributes": attributes},
            "context": {"System": {"device": {"supportedInterfaces": interfaces}}},
            "request": request
        }))
        .unwrap()
    }

    fn intent(name: &str, request_id: &str, slots: Value, attributes: &SessionAttributes) -> RequestEnvelope {
        envelope(
            json!({"type": "IntentRequest", "requestId": request_id, "intent": {"name": name, "slots": slots}}),
            attributes,
            true,
        )
    }

    fn speech(response: &ResponseEnvelope) -> &str {
        response
            .response
            .output_speech
            .as_ref()
            .map_or("", |speech| speech.ssml.as_str())
    }

    // Lets the detached generation task run under paused time
    async fn let_story_finish() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn launch_speaks_intro_and_hint() {
        let (_, skill) = skill(CannedGenerator::default());

        let response = skill
            .handle(&envelope(
                json!({"type": "LaunchRequest", "requestId": "req-1"}),
                &SessionAttributes::default(),
                true,
            ))
            .await;

        assert_eq!(
            speech(&response),
            "<speak><amazon:emotion name='excited' intensity='medium'>Listening...</amazon:emotion></speak>"
        );
        let reprompt = &response.response.reprompt.as_ref().unwrap().output_speech.ssml;
        assert!(reprompt.starts_with("<speak>Try, \"Tell me a story about "));
        assert_eq!(response.response.directives[0]["token"], "intro");
    }

    #[tokio::test(start_paused = true)]
    async fn story_is_prepared_then_delivered_on_yes() {
        let (llm, skill) = skill(CannedGenerator::default().reply("Amy: The owl flew home.", None));

        let started = skill
            .handle(&intent(
                "StoryIntent",
                "req-story",
                json!({"subject": {"value": "a story about an owl"}}),
                &SessionAttributes::default(),
            ))
            .await;

        assert!(speech(&started).contains("I'm preparing your story."));
        assert_eq!(started.session_attributes.pending_story(), Some("req-story"));

        let_story_finish().await;
        assert_eq!(llm.requests()[0].prompt, "Tell a story about an owl");

        let delivered = skill
            .handle(&intent("AMAZON.YesIntent", "req-yes", json!({}), &started.session_attributes))
            .await;

        assert_eq!(
            speech(&delivered),
            "<speak><voice name='Amy'>The owl flew home.</voice></speak>"
        );
        assert_eq!(delivered.session_attributes.pending_story(), None);
        let properties = &delivered.response.directives[0]["datasources"]["longTextTemplateData"]["properties"];
        assert_eq!(properties["textContent"]["primaryText"]["text"], "The owl flew home.");

        let again = skill
            .handle(&intent("AMAZON.YesIntent", "req-yes-2", json!({}), &delivered.session_attributes))
            .await;
        assert_eq!(speech(&again), "<speak>Ask me another question!</speak>");
    }

    #[tokio::test(start_paused = true)]
    async fn yes_while_preparing_keeps_waiting() {
        let (_, skill) = skill(CannedGenerator::default().reply("Amy: Soon.", None));

        let _started = skill.stories.start_story("a story about a snail", "req-pending");
        let mut attributes = SessionAttributes::default();
        attributes.await_story("req-pending");

        // The generation task has not run yet
        let waiting = skill
            .handle(&intent("AMAZON.YesIntent", "req-yes", json!({}), &attributes))
            .await;

        assert!(speech(&waiting).contains("story"));
        assert_eq!(waiting.session_attributes.pending_story(), Some("req-pending"));
        assert_eq!(waiting.response.should_end_session, Some(false));
        assert!(waiting.response.directives.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_story_apologizes_with_subject() {
        let (_, skill) = skill(CannedGenerator::default().fail(LlmError::InvalidRequest("bad".to_owned())));

        let started = skill
            .handle(&intent(
                "StoryIntent",
                "req-story",
                json!({"subject": {"value": "a story about a dragon"}}),
                &SessionAttributes::default(),
            ))
            .await;
        let_story_finish().await;

        let reply = skill
            .handle(&intent("AMAZON.YesIntent", "req-yes", json!({}), &started.session_attributes))
            .await;

        assert!(speech(&reply).contains("a story about a dragon"));
        assert_eq!(reply.session_attributes.pending_story(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_story_clears_the_pending_flag() {
        let (_, skill) = skill(CannedGenerator::default());
        let mut attributes = SessionAttributes::default();
        attributes.await_story("req-gone");

        let reply = skill
            .handle(&intent("AMAZON.YesIntent", "req-yes", json!({}), &attributes))
            .await;

        assert!(speech(&reply).contains("couldn't find your story"));
        assert_eq!(reply.session_attributes.pending_story(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn no_cancels_pending_story() {
        let (_, skill) = skill(CannedGenerator::default().reply("Amy: Unwanted.", None));

        let started = skill
            .handle(&intent(
                "StoryIntent",
                "req-story",
                json!({"subject": {"value": "a story about a moth"}}),
                &SessionAttributes::default(),
            ))
            .await;

        let declined = skill
            .handle(&intent("AMAZON.NoIntent", "req-no", json!({}), &started.session_attributes))
            .await;

        assert!(speech(&declined).contains("No problem."));
        assert_eq!(declined.session_attributes.story_request_id, None);
        assert!(!declined.session_attributes.awaiting_story_confirmation);

        let_story_finish().await;
        assert_eq!(skill.stories.poll_story("req-story").state, PollState::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn no_without_story_says_goodbye() {
        let (_, skill) = skill(CannedGenerator::default());

        let reply = skill
            .handle(&intent("AMAZON.NoIntent", "req-no", json!({}), &SessionAttributes::default()))
            .await;

        assert!(reply.response.reprompt.is_none());
        assert!(!speech(&reply).is_empty());
        assert_eq!(reply.response.directives.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_session() {
        let (_, skill) = skill(CannedGenerator::default());

        let reply = skill
            .handle(&intent("AMAZON.StopIntent", "req-stop", json!({}), &SessionAttributes::default()))
            .await;

        assert_eq!(reply.response.should_end_session, Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn questions_chain_previous_response() {
        let (llm, skill) = skill(
            CannedGenerator::default()
                .reply("Paris.", Some("resp-1"))
                .reply("About two million.", Some("resp-2")),
        );

        let first = skill
            .handle(&intent(
                "QuestionIntent",
                "req-q1",
                json!({"question": {"value": "What is the capital of France?"}}),
                &SessionAttributes::default(),
            ))
            .await;

        assert_eq!(speech(&first), "<speak>Paris.</speak>");
        assert_eq!(first.session_attributes.previous_response_id.as_deref(), Some("resp-1"));

        let second = skill
            .handle(&intent(
                "QuestionIntent",
                "req-q2",
                json!({"question": {"value": "How many people live there?"}}),
                &first.session_attributes,
            ))
            .await;

        assert_eq!(speech(&second), "<speak>About two million.</speak>");
        let requests = llm.requests();
        assert_eq!(requests[0].previous_response_id, None);
        assert_eq!(requests[1].previous_response_id.as_deref(), Some("resp-1"));
        assert_eq!(requests[1].prompt, "How many people live there?");
    }

    #[tokio::test(start_paused = true)]
    async fn question_failure_is_spoken() {
        let (_, skill) = skill(CannedGenerator::default().fail(LlmError::Timeout));

        let reply = skill
            .handle(&intent(
                "QuestionIntent",
                "req-q",
                json!({"question": {"value": "Why?"}}),
                &SessionAttributes::default(),
            ))
            .await;

        assert_eq!(speech(&reply), format!("<speak>{QUESTION_FAILED}</speak>"));
    }

    #[tokio::test(start_paused = true)]
    async fn unhandled_intent_gets_apology() {
        let (_, skill) = skill(CannedGenerator::default());

        for request in [
            intent("PizzaIntent", "req-1", json!({}), &SessionAttributes::default()),
            intent("QuestionIntent", "req-2", json!({}), &SessionAttributes::default()),
        ] {
            let reply = skill.handle(&request).await;
            assert_eq!(speech(&reply), format!("<speak>{TROUBLE}</speak>"));
            assert_eq!(reply.response.should_end_session, Some(false));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn session_end_is_silent() {
        let (_, skill) = skill(CannedGenerator::default());

        let reply = skill
            .handle(&envelope(
                json!({"type": "SessionEndedRequest", "requestId": "req-end", "reason": "USER_INITIATED"}),
                &SessionAttributes::default(),
                false,
            ))
            .await;

        assert!(reply.response.output_speech.is_none());
        assert!(reply.response.reprompt.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn help_without_screen_has_no_directive() {
        let (_, skill) = skill(CannedGenerator::default());

        let reply = skill
            .handle(&envelope(
                json!({"type": "IntentRequest", "requestId": "req-h", "intent": {"name": "AMAZON.HelpIntent"}}),
                &SessionAttributes::default(),
                false,
            ))
            .await;

        assert!(speech(&reply).contains("Just ask me a question"));
        assert!(reply.response.directives.is_empty());
    }
}
