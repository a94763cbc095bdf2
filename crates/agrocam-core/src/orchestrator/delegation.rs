//! Delegation tools offered to the coordinator
//!
//! Each sub-agent is exposed to the coordinator model as one
//! `call_<domain>_agent` tool. Arguments are turned into an [`AgentContext`].

use crate::agents::{AgentContext, SubAgentKind};
use agrocam_data::Region;
use agrocam_llm::ToolDefinition;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

/// Definitions of the five delegation tools, in dispatch order
pub(crate) fn tool_definitions() -> Vec<ToolDefinition> {
    SubAgentKind::ALL
        .iter()
        .map(|kind| definition(*kind))
        .collect()
}

fn definition(kind: SubAgentKind) -> ToolDefinition {
    let question = json!({
        "type": "string",
        "description": "Question précise à transmettre à l'agent"
    });
    let (description, properties) = match kind {
        SubAgentKind::Weather => (
            "Consulter l'agent météo: prévisions, alertes climatiques, calendrier saisonnier",
            json!({
                "question": question,
                "region": { "type": "string", "description": "Région du Cameroun" }
            }),
        ),
        SubAgentKind::Crops => (
            "Consulter l'agent cultures: variétés, calendrier de plantation, rotations, rendements",
            json!({
                "question": question,
                "crop": { "type": "string", "description": "Culture concernée" },
                "region": { "type": "string", "description": "Région du Cameroun" }
            }),
        ),
        SubAgentKind::Health => (
            "Consulter l'agent santé des plantes: diagnostic de maladies, ravageurs, traitements",
            json!({
                "question": question,
                "symptoms": { "type": "string", "description": "Symptômes observés" },
                "crop": { "type": "string", "description": "Culture atteinte" }
            }),
        ),
        SubAgentKind::Economic => (
            "Consulter l'agent économique: prix du marché, rentabilité, financement, commercialisation",
            json!({
                "question": question,
                "crop": { "type": "string", "description": "Culture concernée" },
                "quantity": { "type": "number", "description": "Quantité en kg" }
            }),
        ),
        SubAgentKind::Resources => (
            "Consulter l'agent ressources: sols, engrais, irrigation, intrants, formations",
            json!({
                "question": question,
                "resource_type": {
                    "type": "string",
                    "description": "Type de ressource (sol, engrais, eau, formation)"
                },
                "crop": { "type": "string", "description": "Culture concernée" }
            }),
        ),
    };

    ToolDefinition::new(
        kind.delegation_tool(),
        description,
        json!({
            "type": "object",
            "properties": properties,
            "required": ["question"]
        }),
    )
}

/// Arguments of any delegation tool
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DelegationArgs {
    pub question: String,
    pub region: Option<String>,
    pub crop: Option<String>,
    pub symptoms: Option<Value>,
    pub quantity: Option<f64>,
    pub resource_type: Option<String>,
}

impl DelegationArgs {
    /// Question for the sub-agent, falling back on the farmer's own words
    pub fn question_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        let question = self.question.trim();
        if question.is_empty() {
            fallback
        } else {
            question
        }
    }

    /// Build the sub-agent context; an unknown region keeps the request's
    pub fn context(&self, region: Region, language: &str) -> AgentContext {
        let region = match self.region.as_deref().map(str::parse::<Region>) {
            Some(Ok(named)) => named,
            Some(Err(e)) => {
                warn!(error = %e, "Coordinator named an unknown region");
                region
            }
            None => region,
        };

        let mut context = AgentContext::new(region).with_language(language);
        if let Some(crop) = non_empty(self.crop.as_deref()) {
            context = context.with_detail("Culture", crop);
        }
        if let Some(symptoms) = self.symptoms.as_ref().and_then(render_symptoms) {
            context = context.with_detail("Symptômes", symptoms);
        }
        if let Some(quantity) = self.quantity.filter(|q| *q > 0.0) {
            context = context.with_detail("Quantité (kg)", quantity.to_string());
        }
        if let Some(resource) = non_empty(self.resource_type.as_deref()) {
            context = context.with_detail("Type de ressource", resource);
        }
        context
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn render_symptoms(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_tool_per_agent() {
        let names: Vec<String> = tool_definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "call_weather_agent",
                "call_crops_agent",
                "call_health_agent",
                "call_economic_agent",
                "call_resources_agent"
            ]
        );
    }

    #[test]
    fn test_question_is_required() {
        for tool in tool_definitions() {
            assert_eq!(tool.parameters["required"], json!(["question"]));
            assert!(tool.parameters["properties"]["question"].is_object());
        }
    }

    #[test]
    fn test_context_from_arguments() {
        let args: DelegationArgs = serde_json::from_value(json!({
            "question": "Que faire ?",
            "crop": "cacao",
            "symptoms": ["taches brunes", "cabosses noires"],
            "region": "Sud-Ouest"
        }))
        .unwrap();
        let context = args.context(Region::Centre, "fr");
        assert_eq!(context.region, Region::SudOuest);
        assert!(context
            .details
            .contains(&("Symptômes".to_string(), "taches brunes, cabosses noires".to_string())));
        assert!(context
            .details
            .contains(&("Culture".to_string(), "cacao".to_string())));
    }

    #[test]
    fn test_unknown_region_keeps_request_region() {
        let args = DelegationArgs {
            region: Some("Lagos".into()),
            ..Default::default()
        };
        assert_eq!(args.context(Region::Est, "fr").region, Region::Est);
    }

    #[test]
    fn test_empty_question_falls_back() {
        let args = DelegationArgs::default();
        assert_eq!(args.question_or("Prix du cacao ?"), "Prix du cacao ?");
    }
}
