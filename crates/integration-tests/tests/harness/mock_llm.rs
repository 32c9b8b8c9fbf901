//! Mock LLM backend server for integration tests
//!
//! Implements the Chat Completions and Responses endpoints of an
//! OpenAI-compatible API and returns canned text

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

const DEFAULT_CONTENT: &str = "Amy: Hello from mock LLM";

/// Mock LLM backend that returns predictable responses
pub struct MockLlm {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockLlmState>,
}

struct MockLlmState {
    request_count: AtomicU32,
    /// Number of requests to fail before succeeding
    fail_count: AtomicU32,
    /// Status used for failed requests
    fail_status: StatusCode,
    content: String,
    delay: Duration,
    requests: Mutex<Vec<Value>>,
}

/// Options for a mock backend
pub struct MockLlmBuilder {
    fail_count: u32,
    fail_status: StatusCode,
    content: String,
    delay: Duration,
}

impl MockLlmBuilder {
    /// Fail the first `n` requests with `status`
    pub fn failing(mut self, n: u32, status: StatusCode) -> Self {
        self.fail_count = n;
        self.fail_status = status;
        self
    }

    /// Answer with `content` instead of the default text
    pub fn content(mut self, content: &str) -> Self {
        content.clone_into(&mut self.content);
        self
    }

    /// Wait before answering each request
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn start(self) -> anyhow::Result<MockLlm> {
        let state = Arc::new(MockLlmState {
            request_count: AtomicU32::new(0),
            fail_count: AtomicU32::new(self.fail_count),
            fail_status: self.fail_status,
            content: self.content,
            delay: self.delay,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/v1/responses", routing::post(handle_responses))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(MockLlm { addr, shutdown, state })
    }
}

impl MockLlm {
    pub fn builder() -> MockLlmBuilder {
        MockLlmBuilder {
            fail_count: 0,
            fail_status: StatusCode::INTERNAL_SERVER_ERROR,
            content: DEFAULT_CONTENT.to_owned(),
            delay: Duration::ZERO,
        }
    }

    /// Start a mock server answering every request with the default text
    pub async fn start() -> anyhow::Result<Self> {
        Self::builder().start().await
    }

    /// Start a mock server with a custom response content
    pub async fn start_with_response(content: &str) -> anyhow::Result<Self> {
        Self::builder().content(content).start().await
    }

    /// Base URL for configuring the mock as a provider
    ///
    /// Includes `/v1` since the providers append paths like `/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of generation requests received, failed ones included
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Bodies of every request received, in order
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockLlm {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Record the request and decide whether it should fail
async fn admit(state: &MockLlmState, body: Value) -> Result<u32, Response> {
    let count = state.request_count.fetch_add(1, Ordering::Relaxed) + 1;
    state.requests.lock().unwrap().push(body);

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    let should_fail = state
        .fail_count
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
        .is_ok();

    if should_fail {
        let error = json!({"error": {"message": "mock failure", "type": "server_error"}});
        return Err((state.fail_status, Json(error)).into_response());
    }

    Ok(count)
}

async fn handle_chat_completions(State(state): State<Arc<MockLlmState>>, Json(body): Json<Value>) -> Response {
    let count = match admit(&state, body).await {
        Ok(count) => count,
        Err(response) => return response,
    };

    Json(json!({
        "id": format!("chatcmpl-mock-{count}"),
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "mock-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": state.content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
    .into_response()
}

async fn handle_responses(State(state): State<Arc<MockLlmState>>, Json(body): Json<Value>) -> Response {
    let count = match admit(&state, body).await {
        Ok(count) => count,
        Err(response) => return response,
    };

    // No top-level output_text, so clients must assemble text from output blocks
    Json(json!({
        "id": format!("resp_mock_{count}"),
        "object": "response",
        "status": "completed",
        "output": [
            {"type": "reasoning", "id": "rs_1", "summary": []},
            {
                "type": "message",
                "id": format!("msg_{count}"),
                "role": "assistant",
                "content": [{"type": "output_text", "text": state.content, "annotations": []}]
            }
        ]
    }))
    .into_response()
}
