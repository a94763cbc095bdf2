//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let env_name = std::env::var("AGROCAM_ENV").unwrap_or_else(|_| "development".to_string());
    let config = Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{env_name}")).required(false))
        .add_source(File::with_name("config/local").required(false))
        // AGROCAM_SERVER__PORT: single `_` after the prefix, `__` between keys
        .add_source(
            Environment::with_prefix("AGROCAM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut app: AppConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Historical variables (ROOT_AGENT_MODEL, DEFAULT_REGION, ...) win over files
    let agriculture = std::mem::take(&mut app.agriculture);
    app.agriculture = agriculture.with_env_overrides(|key| std::env::var(key).ok());
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_deserialize() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.bind_address(), "127.0.0.1:8000");
        assert!(!config.redis.enabled);
        assert_eq!(config.agriculture.default_region, agrocam_data::Region::Centre);
        assert_eq!(config.agriculture.models.root, agrocam_core::DEFAULT_AGENT_MODEL);
        assert_eq!(config.orchestrator.max_iterations, 20);
        assert_eq!(config.orchestrator.cache_ttl_secs, 300);
    }
}
