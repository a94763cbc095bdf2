//! Sub-agents: one advisory domain each
//!
//! A sub-agent is a French system prompt bound to a model, a temperature and
//! the tools of its domain. The coordinator reaches them through the
//! `call_<domain>_agent` delegation tools.

mod prompts;
mod response;
mod sub_agent;

pub use response::{extract_recommendations, AgentResponse, MultiAgentResponse};
pub use sub_agent::{AgentContext, SubAgent};

use agrocam_tools::ToolCategory;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five advisory domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubAgentKind {
    /// Forecasts, irrigation timing, climate alerts
    Weather,
    /// Calendars, rotations, varieties, techniques
    Crops,
    /// Diseases, pests, treatments
    Health,
    /// Prices, profitability, sales
    Economic,
    /// Soil, fertilizers, water
    Resources,
}

impl SubAgentKind {
    /// All sub-agents, in dispatch order
    pub const ALL: [SubAgentKind; 5] = [
        Self::Weather,
        Self::Crops,
        Self::Health,
        Self::Economic,
        Self::Resources,
    ];

    /// Domain key (`weather`, `crops`, ...)
    #[must_use]
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Crops => "crops",
            Self::Health => "health",
            Self::Economic => "economic",
            Self::Resources => "resources",
        }
    }

    /// Agent name reported in responses
    #[must_use]
    pub fn agent_name(&self) -> String {
        format!("{}_agent", self.domain())
    }

    /// French label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Weather => "Agent Météo",
            Self::Crops => "Agent Cultures",
            Self::Health => "Agent Santé des Plantes",
            Self::Economic => "Agent Économique",
            Self::Resources => "Agent Ressources",
        }
    }

    /// Name of the coordinator tool that runs this agent
    #[must_use]
    pub fn delegation_tool(&self) -> String {
        format!("call_{}_agent", self.domain())
    }

    /// Inverse of [`delegation_tool`](Self::delegation_tool)
    #[must_use]
    pub fn from_delegation_tool(name: &str) -> Option<Self> {
        let domain = name.strip_prefix("call_")?.strip_suffix("_agent")?;
        domain.parse().ok()
    }

    /// Session state key holding the latest answer
    #[must_use]
    pub fn state_key(&self) -> String {
        format!("{}_response", self.domain())
    }

    /// System prompt
    #[must_use]
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Weather => prompts::WEATHER,
            Self::Crops => prompts::CROPS,
            Self::Health => prompts::HEALTH,
            Self::Economic => prompts::ECONOMIC,
            Self::Resources => prompts::RESOURCES,
        }
    }

    /// Phrase that only this agent's prompt contains
    #[must_use]
    pub fn identity(&self) -> &'static str {
        match self {
            Self::Weather => "expert météorologue",
            Self::Crops => "agronome expert",
            Self::Health => "phytopathologiste expert",
            Self::Economic => "expert économiste agricole",
            Self::Resources => "pédologue et spécialiste",
        }
    }

    /// Sampling temperature
    #[must_use]
    pub fn temperature(&self) -> f32 {
        match self {
            Self::Weather => 0.5,
            Self::Crops => 0.6,
            Self::Health => 0.5,
            Self::Economic => 0.3,
            Self::Resources => 0.4,
        }
    }

    /// Tools this agent may call
    #[must_use]
    pub fn category(&self) -> ToolCategory {
        match self {
            Self::Weather => ToolCategory::Weather,
            Self::Crops => ToolCategory::Crops,
            Self::Health => ToolCategory::Health,
            Self::Economic => ToolCategory::Economic,
            Self::Resources => ToolCategory::Resources,
        }
    }
}

impl fmt::Display for SubAgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.domain())
    }
}

impl FromStr for SubAgentKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.domain() == s.trim().to_lowercase())
            .ok_or_else(|| crate::error::Error::InvalidInput(format!("agent inconnu: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegation_tool_round_trip() {
        for kind in SubAgentKind::ALL {
            let tool = kind.delegation_tool();
            assert_eq!(SubAgentKind::from_delegation_tool(&tool), Some(kind));
        }
        assert_eq!(SubAgentKind::from_delegation_tool("call_market_agent"), None);
        assert_eq!(SubAgentKind::from_delegation_tool("get_market_prices"), None);
    }

    #[test]
    fn test_identity_is_unique_to_each_prompt() {
        for kind in SubAgentKind::ALL {
            for other in SubAgentKind::ALL {
                assert_eq!(
                    other.prompt().contains(kind.identity()),
                    kind == other,
                    "{kind} identity found in {other} prompt"
                );
            }
        }
    }

    #[test]
    fn test_temperatures() {
        let temps: Vec<f32> = SubAgentKind::ALL.iter().map(|k| k.temperature()).collect();
        assert_eq!(temps, vec![0.5, 0.6, 0.5, 0.3, 0.4]);
    }

    #[test]
    fn test_prompts_name_their_tools() {
        assert!(SubAgentKind::Health.prompt().contains("diagnose_plant_disease"));
        assert!(SubAgentKind::Resources.prompt().contains("suggest_soil_amendments"));
        assert_eq!(SubAgentKind::Economic.state_key(), "economic_response");
        assert_eq!(SubAgentKind::Crops.agent_name(), "crops_agent");
    }
}
