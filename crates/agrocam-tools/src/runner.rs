//! Runner - Tool execution engine
//!
//! Looks tools up in the registry, rejects disabled ones, validates input
//! against the declared schema and bounds every execution with a timeout.

use crate::error::{Error, Result};
use crate::registry::{ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Configuration for the tool runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Default timeout for tool execution
    pub default_timeout: Duration,
    /// Maximum timeout allowed
    pub max_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(10),
            max_timeout: Duration::from_secs(60),
        }
    }
}

impl RunnerConfig {
    /// Create a new configuration with default timeout
    #[must_use]
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            ..Default::default()
        }
    }

    /// Set the maximum timeout
    #[must_use]
    pub fn with_max_timeout(mut self, max_timeout: Duration) -> Self {
        self.max_timeout = max_timeout;
        self
    }
}

/// Options for a single tool execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionOptions {
    /// Custom timeout for this execution, capped by `RunnerConfig::max_timeout`
    pub timeout: Option<Duration>,
}

impl ExecutionOptions {
    /// Create options with a specific timeout
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Tool execution result with additional metadata
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The tool result
    pub result: ToolResult,
    /// Tool name
    pub tool_name: String,
}

/// Tool runner shared by the sub-agents
#[derive(Clone)]
pub struct ToolRunner {
    registry: Arc<ToolRegistry>,
    config: RunnerConfig,
}

impl ToolRunner {
    /// Create a new tool runner
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>, config: RunnerConfig) -> Self {
        Self { registry, config }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults(registry: Arc<ToolRegistry>) -> Self {
        Self::new(registry, RunnerConfig::default())
    }

    /// Get the registry
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute a tool by name
    #[instrument(skip(self, input), fields(tool = %tool_name))]
    pub async fn execute(
        &self,
        tool_name: &str,
        input: serde_json::Value,
    ) -> Result<ExecutionResult> {
        self.execute_with_options(tool_name, input, ExecutionOptions::default())
            .await
    }

    /// Execute a tool with custom options
    #[instrument(skip(self, input, options), fields(tool = %tool_name))]
    pub async fn execute_with_options(
        &self,
        tool_name: &str,
        input: serde_json::Value,
        options: ExecutionOptions,
    ) -> Result<ExecutionResult> {
        let tool = self
            .registry
            .get(tool_name)
            .ok_or_else(|| Error::NotFound(tool_name.to_string()))?;

        // The registry keeps the mutable copy of the definition
        let enabled = self
            .registry
            .get_definition(tool_name)
            .map_or(false, |d| d.enabled);
        if !enabled {
            return Err(Error::PermissionDenied(format!(
                "Tool '{}' is disabled",
                tool_name
            )));
        }

        tool.validate_input(&input)?;

        let execution_timeout = options
            .timeout
            .unwrap_or(self.config.default_timeout)
            .min(self.config.max_timeout);

        let start = Instant::now();
        debug!(tool = %tool_name, timeout_ms = %execution_timeout.as_millis(), "Executing tool");

        let result = match timeout(execution_timeout, tool.execute(input)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                let duration = start.elapsed().as_millis() as u64;
                warn!(tool = %tool_name, error = %e, "Tool execution failed");
                ToolResult::failure(e.to_string(), duration)
            }
            Err(_) => {
                let duration = start.elapsed().as_millis() as u64;
                warn!(tool = %tool_name, timeout_ms = %execution_timeout.as_millis(), "Tool execution timed out");
                return Err(Error::Timeout(duration));
            }
        };

        debug!(
            tool = %tool_name,
            success = %result.success,
            duration_ms = %result.duration_ms,
            "Tool execution completed"
        );

        Ok(ExecutionResult {
            result,
            tool_name: tool_name.to_string(),
        })
    }

    /// Execute multiple tools concurrently, results in call order
    #[instrument(skip(self, calls), fields(count = calls.len()))]
    pub async fn execute_parallel(
        &self,
        calls: Vec<(String, serde_json::Value)>,
    ) -> Vec<Result<ExecutionResult>> {
        let futures: Vec<_> = calls
            .into_iter()
            .map(|(tool_name, input)| {
                let runner = self.clone();
                async move { runner.execute(&tool_name, input).await }
            })
            .collect();

        futures::future::join_all(futures).await
    }

    /// Check if a tool can be executed (without actually executing)
    pub fn can_execute(&self, tool_name: &str) -> Result<bool> {
        let definition = self
            .registry
            .get_definition(tool_name)
            .ok_or_else(|| Error::NotFound(tool_name.to_string()))?;
        Ok(definition.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{register_domain_tools, ToolEnv};
    use serde_json::json;

    fn runner() -> ToolRunner {
        let mut registry = ToolRegistry::new();
        register_domain_tools(&mut registry, &ToolEnv::seeded(3));
        ToolRunner::with_defaults(Arc::new(registry))
    }

    #[test]
    fn test_runner_config() {
        let config = RunnerConfig::new(Duration::from_secs(5))
            .with_max_timeout(Duration::from_secs(20));
        assert_eq!(config.default_timeout, Duration::from_secs(5));
        assert_eq!(config.max_timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_execution_options() {
        let opts = ExecutionOptions::with_timeout(Duration::from_secs(10));
        assert_eq!(opts.timeout, Some(Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_execute_known_tool() {
        let runner = runner();
        let exec = runner
            .execute("get_market_prices", json!({"crop": "cacao"}))
            .await
            .unwrap();
        assert!(exec.result.success);
        assert_eq!(exec.result.output["crop"], "cacao");
    }

    #[tokio::test]
    async fn test_unknown_and_disabled_tools() {
        let runner = runner();
        assert!(matches!(
            runner.execute("launch_rocket", json!({})).await,
            Err(Error::NotFound(_))
        ));

        let mut registry = ToolRegistry::new();
        register_domain_tools(&mut registry, &ToolEnv::seeded(3));
        registry.disable("get_market_prices");
        let runner = ToolRunner::with_defaults(Arc::new(registry));
        assert!(!runner.can_execute("get_market_prices").unwrap());
        assert!(matches!(
            runner.execute("get_market_prices", json!({"crop": "cacao"})).await,
            Err(Error::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_argument_is_rejected_before_execution() {
        let runner = runner();
        let err = runner
            .execute("analyze_profitability", json!({"crop": "maïs"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_bad_value_becomes_failed_result() {
        let runner = runner();
        let exec = runner
            .execute("get_market_prices", json!({"crop": "banane rose"}))
            .await
            .unwrap();
        assert!(!exec.result.success);
        assert!(exec.result.error.unwrap().contains("banane rose"));
    }

    #[tokio::test]
    async fn test_parallel_keeps_call_order() {
        let runner = runner();
        let results = runner
            .execute_parallel(vec![
                ("get_climate_alerts".into(), json!({"region": "Nord"})),
                ("get_market_prices".into(), json!({"crop": "maïs"})),
            ])
            .await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().tool_name, "get_climate_alerts");
        assert!(results.iter().all(|r| r.as_ref().unwrap().result.success));
    }
}
