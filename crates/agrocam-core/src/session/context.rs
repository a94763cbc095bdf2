//! Conversation history and shared state of one farmer's session

use crate::agents::{AgentResponse, SubAgentKind};
use agrocam_llm::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Messages kept per session
const DEFAULT_MAX_MESSAGES: usize = 20;

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

/// One conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Session ID
    pub id: Uuid,
    /// `channel:id:user`
    pub session_key: String,
    /// User and assistant turns, oldest first
    pub messages: Vec<Message>,
    /// Values shared between turns (`weather_response`, ...)
    #[serde(default)]
    pub state: HashMap<String, serde_json::Value>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update
    pub last_activity: DateTime<Utc>,
    /// History length cap
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

impl SessionContext {
    /// Empty session
    #[must_use]
    pub fn new(session_key: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            session_key: session_key.into(),
            messages: Vec::new(),
            state: HashMap::new(),
            created_at: now,
            last_activity: now,
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }

    /// Build a session key
    #[must_use]
    pub fn make_key(channel_type: &str, channel_id: &str, user_id: &str) -> String {
        format!("{}:{}:{}", channel_type, channel_id, user_id)
    }

    /// Add a user turn
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Add an assistant turn
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        if self.messages.len() > self.max_messages {
            let excess = self.messages.len() - self.max_messages;
            self.messages.drain(..excess);
        }
        self.touch();
    }

    /// History, oldest first
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    /// Number of stored turns
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Store a state value
    pub fn set_state(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.state.insert(key.into(), value);
        self.touch();
    }

    /// Read a state value
    #[must_use]
    pub fn get_state(&self, key: &str) -> Option<&serde_json::Value> {
        self.state.get(key)
    }

    /// Record the latest answer of a sub-agent under `<domain>_response`
    pub fn record_agent_response(&mut self, kind: SubAgentKind, response: &AgentResponse) {
        if let Ok(value) = serde_json::to_value(response) {
            self.set_state(kind.state_key(), value);
        }
    }

    /// Latest answer of a sub-agent
    #[must_use]
    pub fn agent_response(&self, kind: SubAgentKind) -> Option<AgentResponse> {
        self.get_state(&kind.state_key())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Drop history and state
    pub fn clear(&mut self) {
        self.messages.clear();
        self.state.clear();
        self.touch();
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_key() {
        assert_eq!(SessionContext::make_key("api", "web", "amina"), "api:web:amina");
    }

    #[test]
    fn test_history_is_capped() {
        let mut session = SessionContext::new("k");
        session.max_messages = 4;
        for i in 0..6 {
            session.add_user_message(format!("q{i}"));
        }
        assert_eq!(session.message_count(), 4);
        assert_eq!(session.history()[0].content, "q2");
    }

    #[test]
    fn test_agent_response_state() {
        let mut session = SessionContext::new("k");
        let response = AgentResponse {
            agent_name: "weather_agent".into(),
            response_text: "Pluies attendues".into(),
            confidence_score: 0.8,
            recommendations: vec!["Semer".into()],
            metadata: serde_json::Map::new(),
            processing_time_seconds: Some(0.2),
        };
        session.record_agent_response(SubAgentKind::Weather, &response);

        assert!(session.get_state("weather_response").is_some());
        assert_eq!(session.agent_response(SubAgentKind::Weather), Some(response));
        assert!(session.agent_response(SubAgentKind::Health).is_none());

        session.clear();
        assert!(session.state.is_empty());
    }
}
