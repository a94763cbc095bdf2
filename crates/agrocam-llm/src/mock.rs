//! Scripted LLM provider
//!
//! Used by tests and by the offline demo. Responses are queued globally or per
//! "script key"; a request whose system prompt contains a script key consumes
//! from that key's queue first, so concurrently running agents stay
//! deterministic.

use crate::completion::{
    CompletionRequest, CompletionResponse, ToolCompletionRequest, ToolCompletionResponse,
};
use crate::error::{Error, Result};
use crate::message::MessageRole;
use crate::provider::LlmProvider;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const MOCK_MODEL: &str = "mock-model";

/// Failure injected in place of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// 429 from upstream
    RateLimit,
    /// 5xx from upstream
    Server,
    /// Rejected credentials
    Auth,
}

impl MockFailure {
    fn into_error(self) -> Error {
        match self {
            Self::RateLimit => Error::RateLimit,
            Self::Server => Error::ServerError("service unavailable".to_string()),
            Self::Auth => Error::Api("authentication failed".to_string()),
        }
    }
}

type Scripted = std::result::Result<ToolCompletionResponse, MockFailure>;

/// Summary of a request seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Requested model
    pub model: String,
    /// System prompt, if any
    pub system: Option<String>,
    /// Last user message, if any
    pub last_user: Option<String>,
    /// Names of the tools offered
    pub tool_names: Vec<String>,
    /// Temperature
    pub temperature: Option<f32>,
}

#[derive(Default)]
struct MockState {
    global: VecDeque<Scripted>,
    keyed: HashMap<String, VecDeque<Scripted>>,
    delays: HashMap<String, Duration>,
    requests: Vec<RecordedRequest>,
}

/// A mock LLM provider that returns queued responses or a default one
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new mock provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for any request
    pub fn add_tool_response(&self, response: ToolCompletionResponse) {
        self.lock().global.push_back(Ok(response));
    }

    /// Queue a response for requests whose system prompt contains `key`
    pub fn add_scripted_response(&self, key: impl Into<String>, response: ToolCompletionResponse) {
        self.lock()
            .keyed
            .entry(key.into())
            .or_default()
            .push_back(Ok(response));
    }

    /// Queue a failure for requests whose system prompt contains `key`
    pub fn add_scripted_failure(&self, key: impl Into<String>, failure: MockFailure) {
        self.lock()
            .keyed
            .entry(key.into())
            .or_default()
            .push_back(Err(failure));
    }

    /// Queue a failure for any request
    pub fn add_failure(&self, failure: MockFailure) {
        self.lock().global.push_back(Err(failure));
    }

    /// Hold every request whose system prompt contains `key` for `delay`
    pub fn add_delay(&self, key: impl Into<String>, delay: Duration) {
        self.lock().delays.insert(key.into(), delay);
    }

    /// Requests seen so far
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn delay_for(&self, request: &CompletionRequest) -> Option<Duration> {
        let system = request
            .messages
            .iter()
            .find(|m| m.role == MessageRole::System)?;
        self.lock()
            .delays
            .iter()
            .find(|(key, _)| system.content.contains(key.as_str()))
            .map(|(_, delay)| *delay)
    }

    fn next_for(&self, request: &CompletionRequest, tool_names: Vec<String>) -> Option<Scripted> {
        let system = request
            .messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.clone());
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone());

        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            model: request.model.clone(),
            system: system.clone(),
            last_user,
            tool_names,
            temperature: request.temperature,
        });

        if let Some(system) = system.as_deref() {
            let key = state
                .keyed
                .iter()
                .filter(|(k, q)| !q.is_empty() && system.contains(k.as_str()))
                .map(|(k, _)| k.clone())
                .max_by_key(String::len);
            if let Some(key) = key {
                return state.keyed.get_mut(&key).and_then(VecDeque::pop_front);
            }
        }
        state.global.pop_front()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn supports_tools(&self) -> bool {
        true
    }

    fn available_models(&self) -> Vec<String> {
        vec![MOCK_MODEL.to_string()]
    }

    fn default_model(&self) -> &str {
        MOCK_MODEL
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        match self.next_for(&request, Vec::new()) {
            Some(Ok(resp)) => Ok(CompletionResponse {
                content: resp.content.unwrap_or_default(),
                usage: resp.usage,
                finish_reason: resp.finish_reason,
                model: resp.model,
            }),
            Some(Err(failure)) => Err(failure.into_error()),
            None => Ok(CompletionResponse {
                content: "mock response".to_string(),
                usage: None,
                finish_reason: Some("stop".to_string()),
                model: MOCK_MODEL.to_string(),
            }),
        }
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        if let Some(delay) = self.delay_for(&request.request) {
            tokio::time::sleep(delay).await;
        }
        let names = request.tools.iter().map(|t| t.name.clone()).collect();
        match self.next_for(&request.request, names) {
            Some(Ok(resp)) => Ok(resp),
            Some(Err(failure)) => Err(failure.into_error()),
            None => Ok(ToolCompletionResponse::text("mock response", MOCK_MODEL)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    fn request(system: &str) -> ToolCompletionRequest {
        ToolCompletionRequest::new(
            CompletionRequest::new("m")
                .with_message(Message::system(system))
                .with_message(Message::user("question")),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_default_response_when_queue_empty() {
        let mock = MockProvider::new();
        let resp = mock.complete_with_tools(request("x")).await.unwrap();
        assert_eq!(resp.content.as_deref(), Some("mock response"));
    }

    #[tokio::test]
    async fn test_keyed_queue_takes_priority() {
        let mock = MockProvider::new();
        mock.add_tool_response(ToolCompletionResponse::text("global", "m"));
        mock.add_scripted_response("météo", ToolCompletionResponse::text("keyed", "m"));

        let first = mock
            .complete_with_tools(request("Agent météo du Cameroun"))
            .await
            .unwrap();
        assert_eq!(first.content.as_deref(), Some("keyed"));

        let second = mock
            .complete_with_tools(request("Agent météo du Cameroun"))
            .await
            .unwrap();
        assert_eq!(second.content.as_deref(), Some("global"));
        assert_eq!(mock.requests().len(), 2);
        assert_eq!(mock.requests()[0].last_user.as_deref(), Some("question"));
    }

    #[tokio::test]
    async fn test_delay_applies_to_matching_prompt() {
        let mock = MockProvider::new();
        mock.add_delay("lent", Duration::from_millis(50));

        let start = std::time::Instant::now();
        mock.complete_with_tools(request("agent lent")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(mock.delay_for(&request("rapide").request).is_none());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let mock = MockProvider::new();
        mock.add_failure(MockFailure::RateLimit);
        let err = mock.complete_with_tools(request("x")).await.unwrap_err();
        assert!(matches!(err, Error::RateLimit));
    }
}
