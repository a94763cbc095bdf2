//! Adapter turning a pure calculator into a registered [`Tool`]

use crate::env::ToolEnv;
use crate::error::Result;
use crate::registry::{Tool, ToolDefinition, ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::Instant;

/// Calculator behind a domain tool
pub type Handler = fn(&ToolEnv, serde_json::Value) -> Result<serde_json::Value>;

/// Tool backed by a synchronous calculator over the reference tables
pub struct DomainTool {
    definition: ToolDefinition,
    env: ToolEnv,
    handler: Handler,
}

impl DomainTool {
    /// Wrap a handler
    #[must_use]
    pub fn new(definition: ToolDefinition, env: ToolEnv, handler: Handler) -> Self {
        Self {
            definition,
            env,
            handler,
        }
    }
}

#[async_trait::async_trait]
impl Tool for DomainTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let output = (self.handler)(&self.env, input)?;
        Ok(ToolResult::success(
            output,
            start.elapsed().as_millis() as u64,
        ))
    }
}

/// Register the 24 advisory tools
pub fn register_domain_tools(registry: &mut ToolRegistry, env: &ToolEnv) {
    let tools = crate::weather::tools(env)
        .into_iter()
        .chain(crate::crops::tools(env))
        .chain(crate::health::tools(env))
        .chain(crate::economic::tools(env))
        .chain(crate::resources::tools(env));
    for tool in tools {
        registry.register(Arc::new(tool));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolCategory;

    #[test]
    fn test_every_domain_has_its_tools() {
        let mut registry = ToolRegistry::new();
        register_domain_tools(&mut registry, &ToolEnv::seeded(1));
        assert_eq!(registry.len(), 24);
        for category in ToolCategory::ALL {
            let count = registry.list_by_category(category).len();
            assert!((4..=6).contains(&count), "{category}: {count}");
        }
    }

    #[test]
    fn test_schemas_are_objects_with_known_required_fields() {
        let mut registry = ToolRegistry::new();
        register_domain_tools(&mut registry, &ToolEnv::seeded(1));
        for def in registry.list_definitions() {
            assert_eq!(def.parameters["type"], "object", "{}", def.name);
            let props = def.parameters["properties"].as_object().unwrap();
            for required in def.required_parameters() {
                assert!(props.contains_key(required), "{}: {required}", def.name);
            }
        }
    }
}
