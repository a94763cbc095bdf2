//! agrocam core - coordination engine
//!
//! This crate provides the coordinator that answers farmers' questions by
//! delegating to five specialised sub-agents, including:
//! - Agents: weather, crops, plant health, economics and resources
//! - Orchestrator: the coordinator loop, its limits and cancellation
//! - Session: conversation history and shared agent state
//! - Cache: short-lived answers to repeated questions
//! - Router: keyword routing for offline use
//! - Retry: exponential backoff on transient upstream failures

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agents;
pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod router;
pub mod session;

pub use agents::{
    extract_recommendations, AgentContext, AgentResponse, MultiAgentResponse, SubAgent,
    SubAgentKind,
};
pub use cache::ResponseCache;
pub use config::{AgentModels, AgricultureConfig, Units, DEFAULT_AGENT_MODEL};
pub use error::{format_error_for_chat, Error, Result, UserFriendlyError};
pub use orchestrator::{
    ExecutionResult, ExecutionStatus, FailureKind, Orchestrator, OrchestratorConfig,
    OrchestratorInput, ToolCallRecord,
};
pub use retry::{complete_with_retry, RetryPolicy};
pub use router::{route, Route, UNROUTED_REPLY};
pub use session::{MemoryStore, RedisStore, SessionContext, SessionStore};
