//! Agricultural settings shared by the coordinator and the sub-agents
//!
//! Values come from the `[agriculture]` table of the layered configuration and
//! may be overridden by the historical environment variables
//! (`ROOT_AGENT_MODEL`, `WEATHER_AGENT_MODEL`, ..., `DEFAULT_REGION`).

use crate::agents::SubAgentKind;
use crate::error::{Error, Result};
use agrocam_data::Region;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Model used by every agent unless configured otherwise
pub const DEFAULT_AGENT_MODEL: &str = "gemini-2.0-flash-001";

fn default_region() -> Region {
    Region::Centre
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_currency() -> String {
    agrocam_data::CURRENCY.to_string()
}

fn default_model() -> String {
    DEFAULT_AGENT_MODEL.to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

/// Measurement units used in answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Units {
    /// Temperature unit
    pub temperature: String,
    /// Distance unit
    pub distance: String,
    /// Area unit
    pub area: String,
    /// Weight unit
    pub weight: String,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            temperature: "celsius".to_string(),
            distance: "km".to_string(),
            area: "hectare".to_string(),
            weight: "kg".to_string(),
        }
    }
}

/// Model per agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentModels {
    /// Coordinator
    #[serde(default = "default_model")]
    pub root: String,
    /// Weather sub-agent
    #[serde(default = "default_model")]
    pub weather: String,
    /// Crops sub-agent
    #[serde(default = "default_model")]
    pub crops: String,
    /// Plant health sub-agent
    #[serde(default = "default_model")]
    pub health: String,
    /// Economic sub-agent
    #[serde(default = "default_model")]
    pub economic: String,
    /// Resources sub-agent
    #[serde(default = "default_model")]
    pub resources: String,
}

impl Default for AgentModels {
    fn default() -> Self {
        Self {
            root: default_model(),
            weather: default_model(),
            crops: default_model(),
            health: default_model(),
            economic: default_model(),
            resources: default_model(),
        }
    }
}

impl AgentModels {
    /// Model configured for a sub-agent
    #[must_use]
    pub fn for_agent(&self, kind: SubAgentKind) -> &str {
        match kind {
            SubAgentKind::Weather => &self.weather,
            SubAgentKind::Crops => &self.crops,
            SubAgentKind::Health => &self.health,
            SubAgentKind::Economic => &self.economic,
            SubAgentKind::Resources => &self.resources,
        }
    }
}

/// Agricultural context and agent settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgricultureConfig {
    /// Region assumed when a question names none
    #[serde(default = "default_region")]
    pub default_region: Region,
    /// Answer language
    #[serde(default = "default_language")]
    pub language: String,
    /// Currency of every amount
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Measurement units
    #[serde(default)]
    pub units: Units,
    /// Model per agent
    #[serde(default)]
    pub models: AgentModels,
    /// Retries of a transient upstream failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AgricultureConfig {
    fn default() -> Self {
        Self {
            default_region: default_region(),
            language: default_language(),
            currency: default_currency(),
            units: Units::default(),
            models: AgentModels::default(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AgricultureConfig {
    /// Defaults plus process environment overrides
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `ROOT_AGENT_MODEL`, `<DOMAIN>_AGENT_MODEL` and `DEFAULT_REGION`
    /// read through `lookup`
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = non_empty("ROOT_AGENT_MODEL") {
            self.models.root = model;
        }
        for (key, slot) in [
            ("WEATHER_AGENT_MODEL", &mut self.models.weather),
            ("CROPS_AGENT_MODEL", &mut self.models.crops),
            ("HEALTH_AGENT_MODEL", &mut self.models.health),
            ("ECONOMIC_AGENT_MODEL", &mut self.models.economic),
            ("RESOURCES_AGENT_MODEL", &mut self.models.resources),
        ] {
            if let Some(model) = non_empty(key) {
                *slot = model;
            }
        }
        if let Some(region) = non_empty("DEFAULT_REGION") {
            match region.parse() {
                Ok(parsed) => self.default_region = parsed,
                Err(e) => warn!(error = %e, "Ignoring DEFAULT_REGION"),
            }
        }
        if let Some(language) = non_empty("DEFAULT_LANGUAGE") {
            self.language = language;
        }
        self
    }

    /// Per-call timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the settings; `api_key` is the Gemini key, if any
    pub fn validate(&self, api_key: Option<&str>) -> Result<()> {
        if api_key.map_or(true, |k| k.trim().is_empty()) {
            return Err(Error::InvalidConfig {
                field: "GEMINI_API_KEY".to_string(),
                message: "GEMINI_API_KEY est requis".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig {
                field: "timeout_secs".to_string(),
                message: "le délai doit être supérieur à zéro".to_string(),
            });
        }
        if self.models.root.trim().is_empty() {
            return Err(Error::InvalidConfig {
                field: "models.root".to_string(),
                message: "modèle manquant".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AgricultureConfig::default();
        assert_eq!(config.default_region, Region::Centre);
        assert_eq!(config.currency, "FCFA");
        assert_eq!(config.units.area, "hectare");
        assert_eq!(config.models.health, DEFAULT_AGENT_MODEL);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let config = AgricultureConfig::default().with_env_overrides(lookup(&[
            ("ROOT_AGENT_MODEL", "gemini-2.5-pro"),
            ("HEALTH_AGENT_MODEL", "gemini-2.5-flash"),
            ("DEFAULT_REGION", "extreme-nord"),
            ("ECONOMIC_AGENT_MODEL", "  "),
        ]));
        assert_eq!(config.models.root, "gemini-2.5-pro");
        assert_eq!(config.models.for_agent(SubAgentKind::Health), "gemini-2.5-flash");
        assert_eq!(config.models.economic, DEFAULT_AGENT_MODEL);
        assert_eq!(config.default_region, Region::ExtremeNord);
    }

    #[test]
    fn test_unknown_default_region_is_ignored() {
        let config = AgricultureConfig::default()
            .with_env_overrides(lookup(&[("DEFAULT_REGION", "Lagos")]));
        assert_eq!(config.default_region, Region::Centre);
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = AgricultureConfig::default();
        let err = config.validate(None).unwrap_err();
        match err {
            Error::InvalidConfig { message, .. } => assert_eq!(message, "GEMINI_API_KEY est requis"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(config.validate(Some("")).is_err());
        assert!(config.validate(Some("AIzaSyTestKey123456")).is_ok());
    }

    #[test]
    fn test_deserialize_partial_table() {
        let config: AgricultureConfig = serde_json::from_value(serde_json::json!({
            "default_region": "Ouest",
            "models": { "weather": "gemini-2.0-flash-lite-001" }
        }))
        .unwrap();
        assert_eq!(config.default_region, Region::Ouest);
        assert_eq!(config.models.weather, "gemini-2.0-flash-lite-001");
        assert_eq!(config.models.root, DEFAULT_AGENT_MODEL);
        assert_eq!(config.language, "fr");
    }
}
