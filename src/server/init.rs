//! Service construction
//!
//! Builds the tool runner, the Gemini provider and the orchestrator from the
//! loaded configuration.

use super::config::{AppConfig, RedisConfig};
use agrocam_core::session::DEFAULT_PREFIX;
use agrocam_core::{
    format_error_for_chat, AgricultureConfig, MemoryStore, Orchestrator, RedisStore, SessionStore,
};
use agrocam_llm::{GeminiConfig, GeminiProvider, SharedProvider};
use agrocam_tools::{register_domain_tools, ToolEnv, ToolRegistry, ToolRunner};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::info;

/// Runner over the 24 domain tools
pub fn build_runner(agriculture: &AgricultureConfig) -> ToolRunner {
    let mut registry = ToolRegistry::new();
    register_domain_tools(&mut registry, &ToolEnv::new(agriculture.default_region));
    info!(tools = registry.len(), "Registered domain tools");
    ToolRunner::with_defaults(Arc::new(registry))
}

/// Gemini API key from the environment
pub fn api_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .or_else(|_| std::env::var("GOOGLE_API_KEY"))
        .ok()
}

/// Orchestrator backed by Gemini; fails when no API key is configured
pub fn build_orchestrator(config: &AppConfig, runner: ToolRunner) -> Result<Orchestrator> {
    config
        .agriculture
        .validate(api_key().as_deref())
        .map_err(|e| anyhow!(format_error_for_chat(&e)))?;

    let mut gemini = GeminiConfig::from_env().context("Failed to configure Gemini")?;
    gemini.default_model = config.agriculture.models.root.clone();
    gemini.timeout = config.agriculture.timeout();
    let provider: SharedProvider =
        Arc::new(GeminiProvider::new(gemini).context("Failed to create Gemini client")?);

    let sessions = session_store(&config.redis)?;
    info!(
        model = %config.agriculture.models.root,
        region = %config.agriculture.default_region,
        redis = config.redis.enabled,
        "Orchestrator ready"
    );

    Ok(
        Orchestrator::new(provider, runner, config.agriculture.clone())
            .with_config(config.orchestrator.clone())
            .with_session_store(sessions),
    )
}

fn session_store(redis: &RedisConfig) -> Result<Arc<dyn SessionStore>> {
    if redis.enabled {
        let store = RedisStore::with_options(&redis.url, DEFAULT_PREFIX, redis.session_ttl_hours * 3600)
            .context("Failed to configure Redis session store")?;
        Ok(Arc::new(store))
    } else {
        let ttl = i64::try_from(redis.session_ttl_hours).unwrap_or(24);
        Ok(Arc::new(MemoryStore::new().with_ttl_hours(ttl)))
    }
}
