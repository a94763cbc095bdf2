//! Keyword router for offline use
//!
//! Without a model the coordinator cannot decide which sub-agent to consult,
//! so the demo falls back on keyword matching. The first domain in dispatch
//! order whose keywords appear wins; the others are reported as secondary.

use crate::agents::SubAgentKind;
use agrocam_data::text::normalize_key;
use agrocam_data::{Crop, Region};
use serde::Serialize;
use serde_json::json;

const KEYWORDS: [(SubAgentKind, &[&str]); 5] = [
    (SubAgentKind::Weather, &["meteo", "temps", "pluie", "temperature"]),
    (SubAgentKind::Crops, &["planter", "culture", "variete", "semis"]),
    (
        SubAgentKind::Health,
        &["maladie", "jaune", "tache", "fletrissement", "parasite"],
    ),
    (
        SubAgentKind::Economic,
        &["prix", "rentabilite", "vendre", "economique"],
    ),
    (
        SubAgentKind::Resources,
        &["formation", "apprendre", "expert", "aide", "subvention"],
    ),
];

/// Outcome of routing a question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Sub-agent to consult, if any keyword matched
    pub primary: Option<SubAgentKind>,
    /// Other domains whose keywords matched
    pub secondary: Vec<SubAgentKind>,
    /// Region or major town named in the question
    pub region: Option<Region>,
    /// Crop named in the question
    pub crop: Option<Crop>,
}

impl Route {
    /// Domain tool and arguments that answer the question without a model
    #[must_use]
    pub fn offline_tool_call(&self, default_region: Region) -> Option<(&'static str, serde_json::Value)> {
        let region = self.region.unwrap_or(default_region);
        let call = match self.primary? {
            SubAgentKind::Weather => (
                "get_weather_forecast",
                json!({ "region": region, "days": 3 }),
            ),
            SubAgentKind::Crops => (
                "get_planting_calendar",
                json!({ "crop": self.crop.unwrap_or(Crop::Mais), "region": region }),
            ),
            SubAgentKind::Health => (
                "get_prevention_strategies",
                json!({ "crop": self.crop.unwrap_or(Crop::Cacao), "region": region }),
            ),
            SubAgentKind::Economic => (
                "get_market_prices",
                json!({ "crop": self.crop.unwrap_or(Crop::Cacao), "region": region }),
            ),
            SubAgentKind::Resources => (
                "analyze_soil_requirements",
                json!({ "crop": self.crop.unwrap_or(Crop::Mais), "region": region }),
            ),
        };
        Some(call)
    }
}

/// Route `query` by keywords
#[must_use]
pub fn route(query: &str) -> Route {
    let text = normalize_key(query);
    let mut matched = KEYWORDS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(kind, _)| *kind);

    Route {
        primary: matched.next(),
        secondary: matched.collect(),
        region: Region::find_in_text(query),
        crop: Crop::find_in_text(query),
    }
}

/// Reply used when nothing matched
pub const UNROUTED_REPLY: &str = "🤖 Question intéressante ! Pour une réponse précise, précisez le type de conseil souhaité (météo, culture, santé, économie, ressources).";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_question_with_town() {
        let route = route("Quel temps fera-t-il à Yaoundé demain ?");
        assert_eq!(route.primary, Some(SubAgentKind::Weather));
        assert_eq!(route.region, Some(Region::Centre));
    }

    #[test]
    fn test_accents_are_folded() {
        assert_eq!(route("Quelle variété de café ?").primary, Some(SubAgentKind::Crops));
        assert_eq!(route("Flétrissement des plants").primary, Some(SubAgentKind::Health));
        assert_eq!(route("RENTABILITÉ du cacao").primary, Some(SubAgentKind::Economic));
    }

    #[test]
    fn test_dispatch_order_and_secondary_domains() {
        let route = route("Prix du maïs après la pluie");
        assert_eq!(route.primary, Some(SubAgentKind::Weather));
        assert_eq!(route.secondary, vec![SubAgentKind::Economic]);
        assert_eq!(route.crop, Some(Crop::Mais));
    }

    #[test]
    fn test_compound_region_names() {
        assert_eq!(route("subvention au Nord-Ouest").region, Some(Region::NordOuest));
        assert_eq!(route("taches jaunes à Bamenda").region, Some(Region::NordOuest));
        assert_eq!(route("formation à Garoua").region, Some(Region::Nord));
    }

    #[test]
    fn test_unmatched_question() {
        let route = route("Bonjour");
        assert!(route.primary.is_none());
        assert!(route.offline_tool_call(Region::Centre).is_none());
    }

    #[test]
    fn test_offline_tool_call_uses_defaults() {
        let (tool, args) = route("Quand planter ?")
            .offline_tool_call(Region::Ouest)
            .unwrap();
        assert_eq!(tool, "get_planting_calendar");
        assert_eq!(args["region"], "Ouest");
        assert_eq!(args["crop"], "maïs");
    }
}
