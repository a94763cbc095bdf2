//! Tool types for LLM function calling

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tool definition for function calling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON schema for parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool call requested by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool call
    pub id: String,
    /// Tool name
    pub name: String,
    /// Arguments as JSON string
    pub arguments: String,
}

impl ToolCall {
    /// Create a tool call from a JSON argument value
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: args.to_string(),
        }
    }

    /// Parse arguments as a typed value
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.arguments).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

/// Tool choice strategy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide
    #[default]
    Auto,
    /// Don't use tools
    None,
    /// Force some tool call
    Required,
    /// Use a specific tool by name
    Tool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_parse_arguments() {
        let call = ToolCall::new(
            "call_1",
            "get_weather_forecast",
            serde_json::json!({"region": "Centre", "days": 3}),
        );

        #[derive(Deserialize)]
        struct Args {
            region: String,
            days: u32,
        }

        let args: Args = call.parse_arguments().unwrap();
        assert_eq!(args.region, "Centre");
        assert_eq!(args.days, 3);
    }

    #[test]
    fn test_parse_arguments_rejects_garbage() {
        let call = ToolCall {
            id: "x".into(),
            name: "y".into(),
            arguments: "not json".into(),
        };
        let parsed: Result<serde_json::Value> = call.parse_arguments();
        assert!(matches!(parsed, Err(Error::InvalidResponse(_))));
    }

    #[test]
    fn test_tool_choice_default() {
        assert_eq!(ToolChoice::default(), ToolChoice::Auto);
    }
}
