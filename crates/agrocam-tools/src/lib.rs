//! agrocam Tools - advisory tools the sub-agents call
//!
//! This crate provides:
//! - Registry: tool registration and discovery by domain
//! - Runner: execution with timeouts and validation
//! - Domain tools: weather, crops, plant health, economics and resources
//!
//! The tools are deterministic calculators over the reference tables; the
//! simulated series (forecasts, price history) draw from the RNG held in
//! [`ToolEnv`] so a seeded environment gives reproducible output.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod crops;
pub mod domain;
pub mod economic;
pub mod env;
pub mod error;
pub mod health;
mod input;
pub mod registry;
pub mod resources;
pub mod runner;
pub mod weather;

pub use domain::{register_domain_tools, DomainTool};
pub use env::ToolEnv;
pub use error::{Error, Result};
pub use registry::{Tool, ToolCategory, ToolDefinition, ToolRegistry, ToolResult};
pub use runner::{ExecutionOptions, ExecutionResult, RunnerConfig, ToolRunner};
