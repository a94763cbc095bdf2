//! Integration tests for AgroCam
//!
//! These tests verify the integration between different crates:
//! - agrocam-data: reference tables behind the tools
//! - agrocam-tools: tool registry and execution
//! - agrocam-llm: scripted provider
//! - agrocam-core: coordinator, sessions and keyword routing

use std::sync::Arc;

use agrocam_core::{
    route, AgricultureConfig, ExecutionStatus, Orchestrator, OrchestratorConfig,
    OrchestratorInput, RetryPolicy, SubAgentKind,
};
use agrocam_data::{market_price, Crop, Region};
use agrocam_llm::{MockProvider, ToolCall, ToolCompletionResponse};
use agrocam_tools::{register_domain_tools, ToolCategory, ToolEnv, ToolRegistry, ToolRunner};
use serde_json::json;

const ROOT_KEY: &str = "coordonner un système multi-agents";

fn runner() -> ToolRunner {
    let mut registry = ToolRegistry::new();
    register_domain_tools(&mut registry, &ToolEnv::seeded(7));
    ToolRunner::with_defaults(Arc::new(registry))
}

fn orchestrator(mock: &MockProvider) -> Orchestrator {
    Orchestrator::new(Arc::new(mock.clone()), runner(), AgricultureConfig::default())
        .with_retry(RetryPolicy::none())
}

// ============================================================================
// Tool Registry Integration Tests
// ============================================================================

#[test]
fn test_every_domain_has_tools() {
    let runner = runner();
    let registry = runner.registry();

    assert_eq!(registry.len(), 24);
    for category in [
        ToolCategory::Weather,
        ToolCategory::Crops,
        ToolCategory::Health,
        ToolCategory::Economic,
        ToolCategory::Resources,
    ] {
        assert!(
            !registry.list_by_category(category).is_empty(),
            "no tools for {}",
            category.as_str()
        );
    }
}

#[tokio::test]
async fn test_market_price_tool_runs() {
    let execution = runner()
        .execute("get_market_prices", json!({"crop": "cacao"}))
        .await
        .unwrap();

    assert!(execution.result.success);
    assert_eq!(execution.tool_name, "get_market_prices");
}

#[tokio::test]
async fn test_unknown_tool_is_an_error() {
    assert!(runner().execute("launch_rocket", json!({})).await.is_err());
}

#[tokio::test]
async fn test_missing_required_argument_is_rejected() {
    assert!(runner()
        .execute("get_market_prices", json!({}))
        .await
        .is_err());
}

// ============================================================================
// Offline Routing Tests
// ============================================================================

#[tokio::test]
async fn test_routed_question_answers_offline() {
    let runner = runner();
    for question in [
        "Va-t-il y avoir de la pluie à Garoua ?",
        "Quand planter le maïs ?",
        "Mes feuilles de manioc sont jaunes",
        "Quel est le prix du cacao ?",
        "Je cherche une formation en compostage",
    ] {
        let (tool, input) = route(question)
            .offline_tool_call(Region::Centre)
            .unwrap_or_else(|| panic!("not routed: {question}"));
        let execution = runner.execute(tool, input).await.unwrap();
        assert!(execution.result.success, "{tool} failed for {question}");
    }
}

#[test]
fn test_unrelated_question_is_not_routed() {
    assert!(route("Bonjour")
        .offline_tool_call(Region::Centre)
        .is_none());
}

// ============================================================================
// Coordinator Integration Tests
// ============================================================================

#[tokio::test]
async fn test_coordinator_delegates_to_crops_agent() {
    let mock = MockProvider::new();
    mock.add_scripted_response(
        ROOT_KEY,
        ToolCompletionResponse::calls(
            vec![ToolCall::new(
                "c1",
                SubAgentKind::Crops.delegation_tool(),
                json!({"question": "Quand semer le maïs ?", "region": "Ouest", "crop": "maïs"}),
            )],
            "m",
        ),
    );
    mock.add_scripted_response(
        SubAgentKind::Crops.identity(),
        ToolCompletionResponse::text("Semez en mars.\n- Utiliser des semences certifiées", "m"),
    );
    mock.add_scripted_response(
        ROOT_KEY,
        ToolCompletionResponse::text("Dans l'Ouest, semez le maïs en mars.", "m"),
    );

    let orchestrator = orchestrator(&mock);
    let input = OrchestratorInput::new("cli", "local", "amina", "Quand semer le maïs ?");
    let session_key = input.session_key();
    let result = orchestrator.process(input).await.unwrap();

    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.agents_consulted(), vec!["crops_agent"]);
    assert_eq!(
        result.summary().agent_responses[0].recommendations,
        vec!["Utiliser des semences certifiées".to_string()]
    );

    let crops_request = mock
        .requests()
        .into_iter()
        .find(|r| {
            r.system
                .as_deref()
                .is_some_and(|s| s.contains(SubAgentKind::Crops.identity()))
        })
        .unwrap();
    assert!(crops_request.system.unwrap().contains("Région: Ouest"));

    let session = orchestrator.session(&session_key).await.unwrap().unwrap();
    assert_eq!(session.message_count(), 2);
    assert!(orchestrator.clear_session(&session_key).await.unwrap());
}

#[tokio::test]
async fn test_conversation_history_is_replayed() {
    let mock = MockProvider::new();
    mock.add_scripted_response(ROOT_KEY, ToolCompletionResponse::text("Bonjour Amina.", "m"));
    mock.add_scripted_response(ROOT_KEY, ToolCompletionResponse::text("Oui, en mars.", "m"));

    let orchestrator = orchestrator(&mock)
        .with_config(OrchestratorConfig::default().with_cache(false));
    orchestrator
        .process(OrchestratorInput::new("cli", "local", "amina", "Bonjour"))
        .await
        .unwrap();
    orchestrator
        .process(OrchestratorInput::new("cli", "local", "amina", "Et pour le maïs ?"))
        .await
        .unwrap();

    let session = orchestrator.session("cli:local:amina").await.unwrap().unwrap();
    assert_eq!(session.message_count(), 4);
    assert_eq!(mock.requests().len(), 2);
}

// ============================================================================
// Configuration and Reference Data
// ============================================================================

#[test]
fn test_agriculture_defaults() {
    let config = AgricultureConfig::default();
    assert_eq!(config.default_region, Region::Centre);
    assert_eq!(config.language, "fr");
    assert_eq!(config.currency, "FCFA");
    assert!(config.validate(None).is_err());
    assert!(config.validate(Some("key")).is_ok());
}

#[test]
fn test_orchestrator_defaults() {
    let config = OrchestratorConfig::default();
    assert_eq!(config.max_iterations, 20);
    assert_eq!(config.max_consecutive_failures, 3);
    assert!(config.cache_enabled);
}

#[test]
fn test_prices_are_in_fcfa() {
    let price = market_price(Crop::Cacao);
    assert_eq!(price.currency, "FCFA");
    assert!(price.min <= price.avg && price.avg <= price.max);
}
