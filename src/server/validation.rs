//! Production configuration validation
//!
//! Security checks for production deployments.

use super::config::AppConfig;
use tracing::warn;

/// Warn about risky settings when `AGROCAM_ENV=production`
pub fn validate_production_config(config: &AppConfig) {
    let is_production = std::env::var("AGROCAM_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    if !is_production {
        return;
    }

    for warning in production_warnings(config) {
        warn!("SECURITY WARNING: {}", warning);
    }
}

fn production_warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if config.server.host == "0.0.0.0" {
        warnings.push(
            "Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 and using a reverse proxy.",
        );
    }
    if config.redis.enabled
        && config.redis.url.starts_with("redis://")
        && !config.redis.url.contains('@')
    {
        warnings.push(
            "Redis connection appears to have no authentication in production. \
             Consider enabling Redis AUTH.",
        );
    }
    if config.server.cors_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows any origin in production.");
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_raise_no_warning() {
        assert!(production_warnings(&AppConfig::default()).is_empty());
    }

    #[test]
    fn test_open_binding_and_unauthenticated_redis() {
        let mut config = AppConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.redis.enabled = true;
        assert_eq!(production_warnings(&config).len(), 2);

        config.redis.url = "redis://:secret@redis:6379".to_string();
        assert_eq!(production_warnings(&config).len(), 1);
    }
}
