use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use fabula_llm::{Generation, GenerationRequest, LlmError, TextGenerator};

/// Text generator that replays a fixed script of outcomes
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    delay: Duration,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Reply with `text`; `{prompt}` is replaced by the prompt of the request being answered
    pub fn then_text(self, text: &str) -> Self {
        self.script.lock().unwrap().push_back(Ok(text.to_owned()));
        self
    }

    pub fn then_error(self, error: LlmError) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(Generation {
                text: text.replace("{prompt}", &request.prompt),
                response_id: None,
            }),
            Some(Err(e)) => Err(e),
            None => Err(LlmError::EmptyResponse),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
