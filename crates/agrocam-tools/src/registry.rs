//! Registry - Tool registration and discovery
//!
//! Tools are registered with their metadata and queried by name or by the
//! advisory domain they serve. Each sub-agent sees only its own category.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Advisory domain a tool belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    /// Forecasts, irrigation, alerts, rainfall
    Weather,
    /// Calendars, rotation, varieties, techniques
    Crops,
    /// Diagnosis, treatment, pests, prevention
    Health,
    /// Prices, profitability, sales
    Economic,
    /// Soil, fertilizers, water, land
    Resources,
}

impl ToolCategory {
    /// All categories
    pub const ALL: [ToolCategory; 5] = [
        Self::Weather,
        Self::Crops,
        Self::Health,
        Self::Economic,
        Self::Resources,
    ];

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Crops => "crops",
            Self::Health => "health",
            Self::Economic => "economic",
            Self::Resources => "resources",
        }
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tool metadata and schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Description shown to the model
    pub description: String,
    /// JSON schema for parameters
    pub parameters: serde_json::Value,
    /// Advisory domain
    pub category: ToolCategory,
    /// Whether the tool is enabled
    pub enabled: bool,
}

impl ToolDefinition {
    /// Create a new tool definition with an empty parameter schema
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: ToolCategory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            category,
            enabled: true,
        }
    }

    /// Set the parameters schema
    #[must_use]
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set enabled status
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Names of the required parameters
    #[must_use]
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(|r| r.as_array())
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether execution succeeded
    pub success: bool,
    /// Output data
    pub output: serde_json::Value,
    /// Error message if failed
    pub error: Option<String>,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl ToolResult {
    /// Create a successful result
    #[must_use]
    pub fn success(output: serde_json::Value, duration_ms: u64) -> Self {
        Self {
            success: true,
            output,
            error: None,
            duration_ms,
        }
    }

    /// Create a failed result
    #[must_use]
    pub fn failure(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            output: serde_json::Value::Null,
            error: Some(error.into()),
            duration_ms,
        }
    }

    /// Payload sent back to the model: the output, or `{"error": ..}`
    #[must_use]
    pub fn to_model_payload(&self) -> serde_json::Value {
        if self.success {
            self.output.clone()
        } else {
            serde_json::json!({ "error": self.error.clone().unwrap_or_default() })
        }
    }
}

/// Trait for tool implementations
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with given input
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult>;

    /// Validate input before execution: an object carrying every required field
    fn validate_input(&self, input: &serde_json::Value) -> Result<()> {
        let Some(object) = input.as_object() else {
            return Err(Error::InvalidInput("Input must be an object".to_string()));
        };
        let missing: Vec<&str> = self
            .definition()
            .required_parameters()
            .into_iter()
            .filter(|name| object.get(*name).map_or(true, serde_json::Value::is_null))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "paramètres manquants: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Registry for managing tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
    definitions: BTreeMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let def = tool.definition();
        let name = def.name.clone();
        debug!(tool = %name, category = %def.category, "Registering tool");
        self.definitions.insert(name.clone(), def.clone());
        self.tools.insert(name, tool);
    }

    /// Get a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Get a tool definition by name
    #[must_use]
    pub fn get_definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.get(name)
    }

    /// Check if a tool exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names, sorted
    #[must_use]
    pub fn list_names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// List all tool definitions
    #[must_use]
    pub fn list_definitions(&self) -> Vec<&ToolDefinition> {
        self.definitions.values().collect()
    }

    /// List enabled tool definitions
    #[must_use]
    pub fn list_enabled(&self) -> Vec<&ToolDefinition> {
        self.definitions.values().filter(|d| d.enabled).collect()
    }

    /// List tools by category
    #[must_use]
    pub fn list_by_category(&self, category: ToolCategory) -> Vec<&ToolDefinition> {
        self.definitions
            .values()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Enable a tool
    pub fn enable(&mut self, name: &str) -> bool {
        if let Some(def) = self.definitions.get_mut(name) {
            def.enabled = true;
            true
        } else {
            false
        }
    }

    /// Disable a tool
    pub fn disable(&mut self, name: &str) -> bool {
        if let Some(def) = self.definitions.get_mut(name) {
            def.enabled = false;
            true
        } else {
            false
        }
    }

    /// Get tool count
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Enabled tools of one category in LLM tool format
    #[must_use]
    pub fn to_llm_tools(&self, category: ToolCategory) -> Vec<agrocam_llm::ToolDefinition> {
        self.list_enabled()
            .into_iter()
            .filter(|def| def.category == category)
            .map(|def| {
                agrocam_llm::ToolDefinition::new(&def.name, &def.description, def.parameters.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool {
        definition: ToolDefinition,
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
            Ok(ToolResult::success(input, 0))
        }
    }

    fn echo(name: &str, category: ToolCategory) -> Arc<dyn Tool> {
        Arc::new(EchoTool {
            definition: ToolDefinition::new(name, "echo", category).with_parameters(json!({
                "type": "object",
                "properties": {"crop": {"type": "string"}},
                "required": ["crop"]
            })),
        })
    }

    #[test]
    fn test_tool_definition_builder() {
        let def = ToolDefinition::new("get_market_prices", "Prix", ToolCategory::Economic)
            .with_enabled(false);
        assert_eq!(def.category, ToolCategory::Economic);
        assert!(!def.enabled);
        assert!(def.required_parameters().is_empty());
    }

    #[test]
    fn test_tool_result_payload() {
        let success = ToolResult::success(json!({"data": "test"}), 100);
        assert!(success.success);
        assert_eq!(success.to_model_payload(), json!({"data": "test"}));

        let failure = ToolResult::failure("culture inconnue", 50);
        assert!(!failure.success);
        assert_eq!(failure.to_model_payload(), json!({"error": "culture inconnue"}));
    }

    #[test]
    fn test_validate_input_reports_missing_fields() {
        let tool = echo("t", ToolCategory::Crops);
        assert!(tool.validate_input(&json!({"crop": "maïs"})).is_ok());
        let err = tool.validate_input(&json!({"crop": null})).unwrap_err();
        assert!(err.to_string().contains("crop"));
        assert!(tool.validate_input(&json!("maïs")).is_err());
    }

    #[test]
    fn test_registry_by_category() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(echo("b_tool", ToolCategory::Weather));
        registry.register(echo("a_tool", ToolCategory::Weather));
        registry.register(echo("c_tool", ToolCategory::Health));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.list_names(), vec!["a_tool", "b_tool", "c_tool"]);
        assert_eq!(registry.list_by_category(ToolCategory::Weather).len(), 2);

        assert!(registry.disable("a_tool"));
        assert!(!registry.disable("missing"));
        let llm = registry.to_llm_tools(ToolCategory::Weather);
        assert_eq!(llm.len(), 1);
        assert_eq!(llm[0].name, "b_tool");
        assert!(registry.enable("a_tool"));
        assert_eq!(registry.to_llm_tools(ToolCategory::Weather).len(), 2);
    }
}
