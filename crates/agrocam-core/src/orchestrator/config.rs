//! Orchestrator configuration
//!
//! Contains configuration types for the orchestrator:
//! - `OrchestratorConfig` for loop limits and caching
//! - `OrchestratorInput` for execution input

use crate::session::SessionContext;
use agrocam_data::Region;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Input for orchestration
#[derive(Debug, Clone)]
pub struct OrchestratorInput {
    /// Channel type (e.g., "cli", "http")
    pub channel_type: String,
    /// Channel ID
    pub channel_id: String,
    /// User ID
    pub user_id: String,
    /// Question text
    pub text: String,
    /// Region the farmer is in, when known
    pub region: Option<Region>,
    /// Answer language, when not the configured default
    pub language: Option<String>,
}

impl OrchestratorInput {
    /// Create a new input
    #[must_use]
    pub fn new(
        channel_type: impl Into<String>,
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel_type: channel_type.into(),
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            text: text.into(),
            region: None,
            language: None,
        }
    }

    /// Set the region
    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Set the answer language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Get the session key
    #[must_use]
    pub fn session_key(&self) -> String {
        SessionContext::make_key(&self.channel_type, &self.channel_id, &self.user_id)
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Maximum coordinator iterations
    pub max_iterations: usize,
    /// Maximum execution time in seconds
    pub max_execution_secs: u64,
    /// Rounds in a row where every delegation failed before giving up
    pub max_consecutive_failures: usize,
    /// Failed delegations in total before giving up
    pub max_total_failures: usize,
    /// Tool rounds allowed to each sub-agent
    pub max_agent_tool_rounds: usize,
    /// Past messages replayed to the coordinator
    pub history_messages: usize,
    /// Coordinator sampling temperature
    pub root_temperature: f32,
    /// Serve repeated questions from the response cache
    pub cache_enabled: bool,
    /// Cache time-to-live in seconds
    pub cache_ttl_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            max_execution_secs: 180,
            max_consecutive_failures: 3,
            max_total_failures: 6,
            max_agent_tool_rounds: 4,
            history_messages: 10,
            root_temperature: 0.7,
            cache_enabled: true,
            cache_ttl_secs: 300,
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations
    #[must_use]
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set maximum execution time
    #[must_use]
    pub fn with_max_execution_secs(mut self, secs: u64) -> Self {
        self.max_execution_secs = secs;
        self
    }

    /// Set the delegation failure limits
    #[must_use]
    pub fn with_failure_limits(mut self, consecutive: usize, total: usize) -> Self {
        self.max_consecutive_failures = consecutive;
        self.max_total_failures = total;
        self
    }

    /// Enable or disable the response cache
    #[must_use]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Execution time limit
    #[must_use]
    pub fn max_execution_time(&self) -> Duration {
        Duration::from_secs(self.max_execution_secs)
    }

    /// Cache time-to-live
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
