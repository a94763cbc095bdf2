//! Orchestrator - coordinator loop over the sub-agents
//!
//! The coordinator model sees one delegation tool per sub-agent. Each round,
//! the delegations it asks for run concurrently and their answers are fed
//! back until it replies in text or a limit is reached.

mod config;
mod delegation;
mod process;
mod prompt;
mod types;

#[cfg(test)]
mod tests;

pub use config::{OrchestratorConfig, OrchestratorInput};
pub use types::{ExecutionResult, ExecutionStatus, FailureKind, ToolCallRecord};

use crate::agents::{SubAgent, SubAgentKind};
use crate::cache::ResponseCache;
use crate::config::AgricultureConfig;
use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::session::{MemoryStore, SessionContext, SessionStore};
use agrocam_llm::{SharedProvider, ToolDefinition};
use agrocam_tools::ToolRunner;
use dashmap::DashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// The coordinator
pub struct Orchestrator {
    provider: SharedProvider,
    runner: ToolRunner,
    config: OrchestratorConfig,
    agriculture: AgricultureConfig,
    retry: RetryPolicy,
    sessions: Arc<dyn SessionStore>,
    cache: Option<Arc<ResponseCache<ExecutionResult>>>,
    active_executions: Arc<DashMap<Uuid, CancellationToken>>,
}

impl Orchestrator {
    /// Create an orchestrator with an in-memory session store
    #[must_use]
    pub fn new(provider: SharedProvider, runner: ToolRunner, agriculture: AgricultureConfig) -> Self {
        let config = OrchestratorConfig::default();
        Self {
            provider,
            runner,
            retry: RetryPolicy::from_config(&agriculture),
            cache: Some(Arc::new(ResponseCache::new(config.cache_ttl()))),
            config,
            agriculture,
            sessions: Arc::new(MemoryStore::new()),
            active_executions: Arc::new(DashMap::new()),
        }
    }

    /// Replace the loop configuration
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.cache = config
            .cache_enabled
            .then(|| Arc::new(ResponseCache::new(config.cache_ttl())));
        self.config = config;
        self
    }

    /// Use another session backend
    #[must_use]
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = store;
        self
    }

    /// Set the retry policy for every model call
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Loop configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Advisory configuration
    #[must_use]
    pub fn agriculture(&self) -> &AgricultureConfig {
        &self.agriculture
    }

    /// Provider name
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Domain tool runner
    #[must_use]
    pub fn runner(&self) -> &ToolRunner {
        &self.runner
    }

    /// Delegation tools offered to the coordinator model
    #[must_use]
    pub fn delegation_tools(&self) -> Vec<ToolDefinition> {
        delegation::tool_definitions()
    }

    /// Sub-agent of `kind`, configured like the coordinator's own
    #[must_use]
    pub fn sub_agent(&self, kind: SubAgentKind) -> SubAgent {
        SubAgent::new(
            kind,
            self.provider.clone(),
            self.runner.clone(),
            self.agriculture.models.for_agent(kind),
        )
        .with_retry(self.retry.clone())
        .with_max_tool_rounds(self.config.max_agent_tool_rounds)
    }

    /// Cancel a running execution
    pub fn cancel_execution(&self, execution_id: Uuid) -> bool {
        if let Some(token) = self.active_executions.get(&execution_id) {
            token.cancel();
            info!(execution_id = %execution_id, "Execution cancelled");
            true
        } else {
            false
        }
    }

    /// Executions currently running
    #[must_use]
    pub fn active_execution_ids(&self) -> Vec<Uuid> {
        self.active_executions.iter().map(|e| *e.key()).collect()
    }

    /// Stored session for `session_key`
    pub async fn session(&self, session_key: &str) -> Result<Option<SessionContext>> {
        self.sessions.get(session_key).await
    }

    /// Forget a conversation
    pub async fn clear_session(&self, session_key: &str) -> Result<bool> {
        self.sessions.delete(session_key).await
    }

    /// Drop expired sessions and cache entries
    pub async fn cleanup(&self) -> Result<usize> {
        let sessions = self.sessions.cleanup_expired().await?;
        let cached = self.cache.as_ref().map_or(0, |c| c.purge_expired());
        Ok(sessions + cached)
    }
}
