//! Bounded tool loop of a single sub-agent

use super::response::{extract_recommendations, AgentResponse};
use super::SubAgentKind;
use crate::error::Result;
use crate::retry::{complete_with_retry, RetryPolicy};
use agrocam_data::Region;
use agrocam_llm::{
    CompletionRequest, Message, SharedProvider, TokenUsage, ToolCompletionRequest,
};
use agrocam_tools::ToolRunner;
use chrono::Local;
use serde_json::json;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Tool rounds before the agent must answer in text
const DEFAULT_MAX_TOOL_ROUNDS: usize = 4;

const EMPTY_ANSWER: &str =
    "Je n'ai pas pu formuler de réponse à cette question. Pouvez-vous la préciser ?";

/// What the coordinator knows about the question
#[derive(Debug, Clone, PartialEq)]
pub struct AgentContext {
    /// Region the question is about
    pub region: Region,
    /// Answer language
    pub language: String,
    /// Labelled details passed by the coordinator (`Culture` → `cacao`)
    pub details: Vec<(String, String)>,
}

impl AgentContext {
    /// Context for a region, in French
    #[must_use]
    pub fn new(region: Region) -> Self {
        Self {
            region,
            language: "fr".to_string(),
            details: Vec::new(),
        }
    }

    /// Set the answer language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Add a labelled detail
    #[must_use]
    pub fn with_detail(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((label.into(), value.into()));
        self
    }

    fn render_question(&self, question: &str) -> String {
        let mut text = format!("{question}\n\nContexte:\n- Région: {}", self.region);
        for (label, value) in &self.details {
            text.push_str(&format!("\n- {label}: {value}"));
        }
        text
    }
}

/// A sub-agent bound to a provider and to its domain tools
#[derive(Clone)]
pub struct SubAgent {
    kind: SubAgentKind,
    provider: SharedProvider,
    runner: ToolRunner,
    model: String,
    retry: RetryPolicy,
    max_tool_rounds: usize,
}

impl SubAgent {
    /// Create a sub-agent
    #[must_use]
    pub fn new(
        kind: SubAgentKind,
        provider: SharedProvider,
        runner: ToolRunner,
        model: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            provider,
            runner,
            model: model.into(),
            retry: RetryPolicy::default(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Set the retry policy for model calls
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set how many tool rounds are allowed
    #[must_use]
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Domain of this agent
    #[must_use]
    pub fn kind(&self) -> SubAgentKind {
        self.kind
    }

    /// Configured model
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self, context: &AgentContext) -> String {
        let info = context.region.info();
        format!(
            "{}\n\nContexte actuel:\n- Date: {}\n- Région: {} ({}, {}-{} mm/an)\n- Langue: {}",
            self.kind.prompt(),
            Local::now().date_naive(),
            context.region,
            info.climate,
            info.rainfall_mm.min,
            info.rainfall_mm.max,
            context.language,
        )
    }

    /// Answer `question`, calling domain tools as the model asks
    #[instrument(skip(self, question, context), fields(agent = %self.kind))]
    pub async fn answer(&self, question: &str, context: &AgentContext) -> Result<AgentResponse> {
        let start = Instant::now();
        let tools = self.runner.registry().to_llm_tools(self.kind.category());
        let mut messages = vec![
            Message::system(self.system_prompt(context)),
            Message::user(context.render_question(question)),
        ];

        let mut usage = TokenUsage::default();
        let mut tools_used: Vec<String> = Vec::new();
        let mut tool_failures = 0_usize;
        let mut rounds = 0_usize;

        let (text, model_used) = loop {
            let offer_tools = rounds < self.max_tool_rounds;
            let request = ToolCompletionRequest::new(
                CompletionRequest::new(&self.model)
                    .with_messages(messages.clone())
                    .with_temperature(self.kind.temperature()),
                if offer_tools { tools.clone() } else { Vec::new() },
            );
            let response = complete_with_retry(&self.provider, request, &self.retry).await?;
            if let Some(u) = &response.usage {
                usage.add(u);
            }
            if !offer_tools || !response.has_tool_calls() {
                break (response.content, response.model);
            }
            rounds += 1;

            let in_domain = |name: &str| tools.iter().any(|t| t.name == name);
            let calls: Vec<(String, serde_json::Value)> = response
                .tool_calls
                .iter()
                .filter(|call| in_domain(&call.name))
                .map(|call| {
                    let args = call
                        .parse_arguments::<serde_json::Value>()
                        .unwrap_or_else(|_| json!({}));
                    (call.name.clone(), args)
                })
                .collect();
            debug!(agent = %self.kind, round = rounds, calls = calls.len(), "Running domain tools");
            let mut results = self.runner.execute_parallel(calls).await.into_iter();

            messages.push(Message::assistant_with_tool_calls(
                response.content.clone().unwrap_or_default(),
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let result = if in_domain(&call.name) {
                    results.next()
                } else {
                    None
                };
                let payload = match result {
                    Some(Ok(exec)) => {
                        if !exec.result.success {
                            tool_failures += 1;
                        }
                        exec.result.to_model_payload()
                    }
                    Some(Err(e)) => {
                        tool_failures += 1;
                        json!({ "error": e.to_string() })
                    }
                    None => {
                        tool_failures += 1;
                        json!({ "error": format!("outil indisponible pour cet agent: {}", call.name) })
                    }
                };
                tools_used.push(call.name.clone());
                messages.push(Message::tool_response_named(
                    &call.id,
                    &call.name,
                    payload.to_string(),
                ));
            }
        };

        let answered = text.as_deref().is_some_and(|t| !t.trim().is_empty());
        let response_text = match text {
            Some(t) if answered => t,
            _ => EMPTY_ANSWER.to_string(),
        };
        let confidence = confidence_score(answered, tools_used.len(), tool_failures);
        let elapsed = start.elapsed().as_secs_f64();

        info!(
            agent = %self.kind,
            tools = tools_used.len(),
            tool_failures,
            confidence,
            duration_ms = (elapsed * 1000.0) as u64,
            "Sub-agent answered"
        );

        let mut metadata = serde_json::Map::new();
        metadata.insert("model".into(), json!(model_used));
        metadata.insert("region".into(), json!(context.region));
        metadata.insert("tools_used".into(), json!(tools_used));
        metadata.insert("tool_failures".into(), json!(tool_failures));
        metadata.insert("tool_rounds".into(), json!(rounds));
        metadata.insert("usage".into(), json!(usage));

        Ok(AgentResponse {
            agent_name: self.kind.agent_name(),
            recommendations: extract_recommendations(&response_text),
            response_text,
            confidence_score: confidence,
            metadata,
            processing_time_seconds: Some(elapsed),
        })
    }
}

/// Grounded answers score higher; failed tools pull the score down
fn confidence_score(answered: bool, tool_calls: usize, tool_failures: usize) -> f64 {
    if !answered {
        return 0.1;
    }
    if tool_calls == 0 {
        return 0.6;
    }
    let succeeded = tool_calls.saturating_sub(tool_failures) as f64;
    0.5 + 0.45 * succeeded / tool_calls as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrocam_llm::{MockProvider, ToolCall, ToolCompletionResponse};
    use agrocam_tools::{register_domain_tools, ToolEnv, ToolRegistry};
    use std::sync::Arc;

    fn runner() -> ToolRunner {
        let mut registry = ToolRegistry::new();
        register_domain_tools(&mut registry, &ToolEnv::seeded(7));
        ToolRunner::with_defaults(Arc::new(registry))
    }

    fn agent(kind: SubAgentKind, mock: &MockProvider) -> SubAgent {
        SubAgent::new(kind, Arc::new(mock.clone()), runner(), "gemini-2.0-flash-001")
            .with_retry(RetryPolicy::none())
    }

    #[test]
    fn test_confidence_score() {
        assert_eq!(confidence_score(false, 3, 0), 0.1);
        assert_eq!(confidence_score(true, 0, 0), 0.6);
        assert!((confidence_score(true, 2, 0) - 0.95).abs() < 1e-9);
        assert!((confidence_score(true, 2, 2) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_question_carries_context() {
        let context = AgentContext::new(Region::Ouest).with_detail("Culture", "café");
        let text = context.render_question("Quand planter ?");
        assert!(text.starts_with("Quand planter ?"));
        assert!(text.contains("- Région: Ouest"));
        assert!(text.contains("- Culture: café"));
    }

    #[tokio::test]
    async fn test_answer_runs_domain_tool_then_replies() {
        let mock = MockProvider::new();
        mock.add_tool_response(ToolCompletionResponse::calls(
            vec![ToolCall::new(
                "c1",
                "diagnose_plant_disease",
                json!({"crop": "cacao", "symptoms": ["taches brunes sur cabosses"]}),
            )],
            "gemini-2.0-flash-001",
        ));
        mock.add_tool_response(ToolCompletionResponse::text(
            "Pourriture brune probable.\n- Récolter les cabosses atteintes\n- Traiter au cuivre",
            "gemini-2.0-flash-001",
        ));

        let response = agent(SubAgentKind::Health, &mock)
            .answer("Mes cabosses ont des taches brunes", &AgentContext::new(Region::Sud))
            .await
            .unwrap();

        assert_eq!(response.agent_name, "health_agent");
        assert!((response.confidence_score - 0.95).abs() < 1e-9);
        assert_eq!(
            response.recommendations,
            vec!["Récolter les cabosses atteintes", "Traiter au cuivre"]
        );
        assert_eq!(response.metadata["tools_used"], json!(["diagnose_plant_disease"]));

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].temperature, Some(0.5));
        assert_eq!(requests[0].tool_names.len(), 4);
        assert!(requests[0].tool_names.contains(&"get_pest_identification".to_string()));
        assert!(requests[0]
            .system
            .as_deref()
            .unwrap()
            .contains(SubAgentKind::Health.identity()));
    }

    #[tokio::test]
    async fn test_tools_outside_the_domain_fail() {
        let mock = MockProvider::new();
        mock.add_tool_response(ToolCompletionResponse::calls(
            vec![ToolCall::new("c1", "get_market_prices", json!({"crop": "cacao"}))],
            "m",
        ));
        mock.add_tool_response(ToolCompletionResponse::text("Réponse générale.", "m"));

        let response = agent(SubAgentKind::Weather, &mock)
            .answer("Va-t-il pleuvoir ?", &AgentContext::new(Region::Centre))
            .await
            .unwrap();
        assert_eq!(response.metadata["tool_failures"], json!(1));
        assert!((response.confidence_score - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_tool_rounds_are_bounded() {
        let mock = MockProvider::new();
        for i in 0..3 {
            mock.add_tool_response(ToolCompletionResponse::calls(
                vec![ToolCall::new(
                    format!("c{i}"),
                    "get_market_prices",
                    json!({"crop": "cacao"}),
                )],
                "m",
            ));
        }

        let response = agent(SubAgentKind::Economic, &mock)
            .with_max_tool_rounds(2)
            .answer("Prix du cacao ?", &AgentContext::new(Region::Littoral))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].tool_names.is_empty());
        assert_eq!(response.response_text, EMPTY_ANSWER);
        assert_eq!(response.confidence_score, 0.1);
    }

    #[tokio::test]
    async fn test_model_comes_from_final_response() {
        let mock = MockProvider::new();
        mock.add_tool_response(ToolCompletionResponse::calls(
            vec![ToolCall::new("c1", "get_market_prices", json!({"crop": "cacao"}))],
            "gemini-2.0-flash-001",
        ));
        mock.add_tool_response(ToolCompletionResponse::text(
            "Le cacao se vend bien.",
            "gemini-2.0-flash-lite-001",
        ));

        let response = agent(SubAgentKind::Economic, &mock)
            .answer("Prix du cacao ?", &AgentContext::new(Region::Sud))
            .await
            .unwrap();
        assert_eq!(response.metadata["model"], json!("gemini-2.0-flash-lite-001"));
    }

    #[tokio::test]
    async fn test_blocked_reply_falls_back_to_empty_answer() {
        let mock = MockProvider::new();
        mock.add_tool_response(ToolCompletionResponse {
            content: None,
            tool_calls: Vec::new(),
            usage: None,
            finish_reason: Some("SAFETY".to_string()),
            model: "m".to_string(),
        });

        let response = agent(SubAgentKind::Health, &mock)
            .answer("Quel produit ?", &AgentContext::new(Region::Est))
            .await
            .unwrap();
        assert_eq!(response.response_text, EMPTY_ANSWER);
        assert_eq!(response.confidence_score, 0.1);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mock = MockProvider::new();
        mock.add_failure(agrocam_llm::mock::MockFailure::Auth);
        let err = agent(SubAgentKind::Crops, &mock)
            .answer("Quand planter le maïs ?", &AgentContext::new(Region::Centre))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::Llm(_)));
    }
}
