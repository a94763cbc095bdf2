//! Message and tool conversion for the Gemini API

use super::types::*;
use crate::message::{Message, MessageRole};
use crate::tools::{ToolChoice, ToolDefinition};

/// Schema keywords rejected by Gemini's OpenAPI subset
const UNSUPPORTED_SCHEMA_FIELDS: &[&str] = &["default", "additionalProperties"];

/// Recursively strip JSON Schema fields Gemini answers with INVALID_ARGUMENT
pub(crate) fn strip_unsupported_schema_fields(value: &mut serde_json::Value) {
    if let Some(obj) = value.as_object_mut() {
        for field in UNSUPPORTED_SCHEMA_FIELDS {
            obj.remove(*field);
        }
        for (_, v) in obj.iter_mut() {
            strip_unsupported_schema_fields(v);
        }
    } else if let Some(arr) = value.as_array_mut() {
        for v in arr.iter_mut() {
            strip_unsupported_schema_fields(v);
        }
    }
}

fn text_part(text: &str) -> GeminiPart {
    GeminiPart::Text {
        text: text.to_string(),
    }
}

/// Convert messages to Gemini format, returning the system instruction separately
pub(crate) fn convert_messages(
    messages: &[Message],
) -> (Option<GeminiContent>, Vec<GeminiContent>) {
    let mut system_instruction = None;
    let mut contents: Vec<GeminiContent> = Vec::new();

    for msg in messages {
        match msg.role {
            MessageRole::System => {
                system_instruction = Some(GeminiContent {
                    role: None,
                    parts: vec![text_part(&msg.content)],
                });
            }
            MessageRole::User => {
                if !msg.content.is_empty() {
                    contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts: vec![text_part(&msg.content)],
                    });
                }
            }
            MessageRole::Assistant => {
                let mut parts = Vec::new();
                if !msg.content.is_empty() {
                    parts.push(text_part(&msg.content));
                }
                for call in &msg.tool_calls {
                    let args = serde_json::from_str(&call.arguments)
                        .unwrap_or_else(|_| serde_json::json!({}));
                    parts.push(GeminiPart::FunctionCall {
                        function_call: FunctionCall {
                            name: call.name.clone(),
                            args,
                        },
                    });
                }
                if !parts.is_empty() {
                    contents.push(GeminiContent {
                        role: Some("model".to_string()),
                        parts,
                    });
                }
            }
            MessageRole::Tool => {
                let Some(tool_name) = &msg.name else {
                    tracing::warn!(
                        tool_call_id = ?msg.tool_call_id,
                        "Dropping tool response without a tool name"
                    );
                    continue;
                };
                let response = serde_json::from_str::<serde_json::Value>(&msg.content)
                    .ok()
                    .filter(serde_json::Value::is_object)
                    .unwrap_or_else(|| serde_json::json!({"result": msg.content}));
                let part = GeminiPart::FunctionResponse {
                    function_response: FunctionResponse {
                        name: tool_name.clone(),
                        response,
                    },
                };

                // All responses to one model turn go into a single user turn
                match contents.last_mut() {
                    Some(last)
                        if last.role.as_deref() == Some("user")
                            && last
                                .parts
                                .iter()
                                .all(|p| matches!(p, GeminiPart::FunctionResponse { .. })) =>
                    {
                        last.parts.push(part);
                    }
                    _ => contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts: vec![part],
                    }),
                }
            }
        }
    }

    (system_instruction, contents)
}

/// Convert tool definitions to Gemini format
pub(crate) fn convert_tools(tools: &[ToolDefinition]) -> Vec<GeminiTool> {
    let function_declarations = tools
        .iter()
        .map(|tool| {
            let mut parameters = tool.parameters.clone();
            strip_unsupported_schema_fields(&mut parameters);
            FunctionDeclaration {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters,
            }
        })
        .collect();

    vec![GeminiTool {
        function_declarations,
    }]
}

/// Convert tool choice to Gemini format
pub(crate) fn convert_tool_choice(choice: &ToolChoice) -> ToolConfig {
    let (mode, allowed_function_names) = match choice {
        ToolChoice::Auto => ("AUTO", None),
        ToolChoice::None => ("NONE", None),
        ToolChoice::Required => ("ANY", None),
        ToolChoice::Tool(name) => ("ANY", Some(vec![name.clone()])),
    };
    ToolConfig {
        function_calling_config: FunctionCallingConfig {
            mode: mode.to_string(),
            allowed_function_names,
        },
    }
}
