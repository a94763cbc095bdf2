//! agrocam LLM - hosted model access for the advisory agents
//!
//! This crate provides:
//! - Provider trait shared by every agent
//! - Message, tool and completion types
//! - Gemini: Google Gemini 2.x family over the public REST API
//! - Mock: scripted provider for offline runs and tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod gemini;
pub mod message;
pub mod mock;
pub mod provider;
pub mod tools;
pub mod util;

pub use completion::{
    CompletionRequest, CompletionResponse, TokenUsage, ToolCompletionRequest,
    ToolCompletionResponse,
};
pub use error::{Error, Result};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use provider::{LlmProvider, SharedProvider};
pub use tools::{ToolCall, ToolChoice, ToolDefinition};
