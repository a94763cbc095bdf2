//! Orchestrator types
//!
//! - `ExecutionStatus`, `FailureKind`, `ExecutionResult` for execution results
//! - `ToolCallRecord` for delegation tracking

use crate::agents::{AgentResponse, MultiAgentResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// The coordinator answered and every delegation succeeded
    Completed,
    /// An answer was produced but some sub-agents failed or a limit was hit
    PartialSuccess,
    /// No usable answer
    Failed,
    /// Cancelled through [`Orchestrator::cancel_execution`](super::Orchestrator::cancel_execution)
    Cancelled,
}

/// Why an execution failed, for mapping to HTTP status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Upstream rate limit
    RateLimit,
    /// No API key
    NotConfigured,
    /// Rejected credentials
    Authentication,
    /// Upstream 5xx or network failure
    Upstream,
    /// Execution time limit
    Timeout,
    /// Too many failed delegations
    AgentFailures,
    /// Iteration limit reached without an answer
    IterationLimit,
    /// Anything else
    Internal,
}

impl FailureKind {
    /// Classify a provider error
    #[must_use]
    pub fn from_llm(error: &agrocam_llm::Error) -> Self {
        use agrocam_llm::Error as Llm;
        match error {
            Llm::RateLimit => Self::RateLimit,
            Llm::NotConfigured(_) => Self::NotConfigured,
            Llm::Api(msg) if crate::error::is_auth_failure(msg) => Self::Authentication,
            Llm::ServerError(_) | Llm::Network(_) => Self::Upstream,
            Llm::Timeout(_) => Self::Timeout,
            Llm::Api(_) | Llm::InvalidResponse(_) => Self::Internal,
        }
    }
}

/// Record of one delegation tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool name (`call_health_agent`, ...)
    pub tool_name: String,
    /// Arguments sent by the coordinator
    pub input: serde_json::Value,
    /// Whether the sub-agent answered
    pub success: bool,
    /// Error shown to the coordinator, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Sub-agent that ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

/// Result of an orchestrated execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Execution ID
    pub execution_id: Uuid,
    /// Final status
    pub status: ExecutionStatus,
    /// Response text, in French
    pub response: String,
    /// Answers of the sub-agents consulted, in call order
    pub agent_responses: Vec<AgentResponse>,
    /// Delegations made
    pub tool_calls: Vec<ToolCallRecord>,
    /// Coordinator iterations
    pub iterations: usize,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
    /// Model used by the coordinator
    pub model: Option<String>,
    /// Failure classification when `status` is `Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Served from the response cache
    #[serde(default)]
    pub cached: bool,
}

impl ExecutionResult {
    /// Combined view over the sub-agent answers
    #[must_use]
    pub fn summary(&self) -> MultiAgentResponse {
        MultiAgentResponse::new(
            self.agent_responses.clone(),
            self.response.clone(),
            self.duration_ms as f64 / 1000.0,
        )
    }

    /// Names of the sub-agents consulted
    #[must_use]
    pub fn agents_consulted(&self) -> Vec<String> {
        self.agent_responses
            .iter()
            .map(|r| r.agent_name.clone())
            .collect()
    }
}
