use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use fabula_llm::{Generation, GenerationRequest, LlmError, TextGenerator};

/// Generator answering from a queue of canned results
#[derive(Default)]
pub struct CannedGenerator {
    replies: Mutex<VecDeque<Result<Generation, LlmError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl CannedGenerator {
    pub fn reply(self, text: &str, response_id: Option<&str>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(Generation {
            text: text.to_owned(),
            response_id: response_id.map(str::to_owned),
        }));
        self
    }

    pub fn fail(self, error: LlmError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse))
    }

    fn name(&self) -> &str {
        "canned"
    }
}
