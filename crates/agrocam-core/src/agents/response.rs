//! Answers of the sub-agents and their combined summary

use serde::{Deserialize, Serialize};

const MAX_RECOMMENDATIONS: usize = 5;

/// Answer of one sub-agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Agent name (`weather_agent`, ...)
    pub agent_name: String,
    /// Text returned by the model
    pub response_text: String,
    /// Confidence in `[0, 1]`
    pub confidence_score: f64,
    /// Bulleted advice extracted from the text
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Model, tools used, token usage
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Wall time spent answering
    #[serde(default)]
    pub processing_time_seconds: Option<f64>,
}

/// Combined view over the sub-agents consulted for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiAgentResponse {
    /// Agent with the highest confidence
    pub primary_agent: Option<String>,
    /// Every answer, in call order
    pub agent_responses: Vec<AgentResponse>,
    /// Final text given to the farmer
    pub final_recommendation: String,
    /// Total wall time
    pub total_processing_time: f64,
    /// Mean confidence of the answers, in `[0, 1]`
    pub correlation_score: f64,
}

impl MultiAgentResponse {
    /// Summarise `responses`
    #[must_use]
    pub fn new(
        agent_responses: Vec<AgentResponse>,
        final_recommendation: impl Into<String>,
        total_processing_time: f64,
    ) -> Self {
        // First of the most confident wins
        let primary_agent = agent_responses
            .iter()
            .fold(None::<&AgentResponse>, |best, r| match best {
                Some(b) if b.confidence_score >= r.confidence_score => Some(b),
                _ => Some(r),
            })
            .map(|r| r.agent_name.clone());

        let correlation_score = if agent_responses.is_empty() {
            0.0
        } else {
            let sum: f64 = agent_responses.iter().map(|r| r.confidence_score).sum();
            (sum / agent_responses.len() as f64).clamp(0.0, 1.0)
        };

        Self {
            primary_agent,
            agent_responses,
            final_recommendation: final_recommendation.into(),
            total_processing_time,
            correlation_score,
        }
    }
}

/// Pull list items out of a Markdown answer
#[must_use]
pub fn extract_recommendations(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| list_item(line.trim()))
        .map(|item| item.replace("**", "").trim().to_string())
        .filter(|item| !item.is_empty() && !item.ends_with(':'))
        .take(MAX_RECOMMENDATIONS)
        .collect()
}

fn list_item(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest);
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(name: &str, confidence: f64) -> AgentResponse {
        AgentResponse {
            agent_name: name.to_string(),
            response_text: String::new(),
            confidence_score: confidence,
            recommendations: Vec::new(),
            metadata: serde_json::Map::new(),
            processing_time_seconds: None,
        }
    }

    #[test]
    fn test_extract_recommendations() {
        let text = "**Résultat:** pluie attendue\n\n**Recommandations:**\n\
                    - Semer après la première pluie utile\n\
                    2. **Buttez** les plants\n\
                    * Conseils:\n\
                    • Surveiller les mirides\n\
                    10) Récolter en saison sèche\n\
                    Texte libre";
        assert_eq!(
            extract_recommendations(text),
            vec![
                "Semer après la première pluie utile",
                "Buttez les plants",
                "Surveiller les mirides",
                "Récolter en saison sèche",
            ]
        );
    }

    #[test]
    fn test_extract_caps_the_list() {
        let text = (1..=8).map(|i| format!("- conseil {i}\n")).collect::<String>();
        assert_eq!(extract_recommendations(&text).len(), MAX_RECOMMENDATIONS);
    }

    #[test]
    fn test_multi_agent_summary() {
        let summary = MultiAgentResponse::new(
            vec![
                response("weather_agent", 0.6),
                response("health_agent", 0.9),
                response("crops_agent", 0.9),
            ],
            "synthèse",
            1.5,
        );
        assert_eq!(summary.primary_agent.as_deref(), Some("health_agent"));
        assert!((summary.correlation_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = MultiAgentResponse::new(Vec::new(), "", 0.0);
        assert!(summary.primary_agent.is_none());
        assert_eq!(summary.correlation_score, 0.0);
    }
}
