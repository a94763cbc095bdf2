use super::*;
use crate::agents::SubAgentKind;
use crate::error::Error;
use agrocam_data::Region;
use agrocam_llm::mock::MockFailure;
use agrocam_llm::{MockProvider, ToolCall, ToolCompletionResponse};
use agrocam_tools::{register_domain_tools, ToolEnv, ToolRegistry};
use serde_json::json;
use std::time::Duration;

const ROOT_KEY: &str = "coordonner un système multi-agents";

fn orchestrator(mock: &MockProvider) -> Orchestrator {
    let mut registry = ToolRegistry::new();
    register_domain_tools(&mut registry, &ToolEnv::seeded(42));
    Orchestrator::new(
        Arc::new(mock.clone()),
        ToolRunner::with_defaults(Arc::new(registry)),
        AgricultureConfig::default(),
    )
    .with_retry(RetryPolicy::none())
}

fn input(text: &str) -> OrchestratorInput {
    OrchestratorInput::new("test", "chan", "user", text)
}

fn delegate(id: &str, kind: SubAgentKind, args: serde_json::Value) -> ToolCall {
    ToolCall::new(id, kind.delegation_tool(), args)
}

#[tokio::test]
async fn test_greeting_is_answered_directly() {
    let mock = MockProvider::new();
    mock.add_scripted_response(
        ROOT_KEY,
        ToolCompletionResponse::text("Bonjour ! Comment puis-je vous aider ?", "m"),
    );

    let result = orchestrator(&mock).process(input("Bonjour")).await.unwrap();

    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.response, "Bonjour ! Comment puis-je vous aider ?");
    assert_eq!(result.iterations, 1);
    assert!(result.agent_responses.is_empty());

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].tool_names.len(), 5);
    assert_eq!(requests[0].temperature, Some(0.7));
}

#[tokio::test]
async fn test_delegations_run_and_are_recorded() {
    let mock = MockProvider::new();
    mock.add_scripted_response(
        ROOT_KEY,
        ToolCompletionResponse::calls(
            vec![
                delegate("c1", SubAgentKind::Weather, json!({"question": "Pluie cette semaine ?"})),
                delegate(
                    "c2",
                    SubAgentKind::Economic,
                    json!({"question": "Prix du cacao ?", "crop": "cacao"}),
                ),
            ],
            "m",
        ),
    );
    mock.add_scripted_response(
        SubAgentKind::Weather.identity(),
        ToolCompletionResponse::text("Fortes pluies attendues jeudi.", "m"),
    );
    mock.add_scripted_response(
        SubAgentKind::Economic.identity(),
        ToolCompletionResponse::text(
            "Le cacao se vend bien.\n- Vendre en coopérative\n- Sécher les fèves",
            "m",
        ),
    );
    mock.add_scripted_response(
        ROOT_KEY,
        ToolCompletionResponse::text("Récoltez avant jeudi et vendez en coopérative.", "m"),
    );

    let orchestrator = orchestrator(&mock);
    let result = orchestrator
        .process(input("Dois-je récolter mon cacao avant la pluie ?").with_region(Region::Sud))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.iterations, 2);
    assert_eq!(result.agents_consulted(), vec!["weather_agent", "economic_agent"]);
    assert!(result.tool_calls.iter().all(|c| c.success));
    assert_eq!(result.tool_calls[1].input["crop"], "cacao");

    let summary = result.summary();
    assert_eq!(summary.primary_agent.as_deref(), Some("weather_agent"));
    assert_eq!(summary.agent_responses[1].recommendations.len(), 2);

    let session = orchestrator.session("test:chan:user").await.unwrap().unwrap();
    assert_eq!(session.message_count(), 2);
    assert!(session.agent_response(SubAgentKind::Weather).is_some());
    assert!(session.agent_response(SubAgentKind::Economic).is_some());
    assert!(session.agent_response(SubAgentKind::Health).is_none());

    let economic = mock
        .requests()
        .into_iter()
        .find(|r| {
            r.system
                .as_deref()
                .is_some_and(|s| s.contains(SubAgentKind::Economic.identity()))
        })
        .unwrap();
    assert!(economic.system.unwrap().contains("Région: Sud"));
    assert!(economic.last_user.unwrap().contains("- Culture: cacao"));
}

#[tokio::test]
async fn test_failed_sub_agent_gives_partial_success() {
    let mock = MockProvider::new();
    mock.add_scripted_response(
        ROOT_KEY,
        ToolCompletionResponse::calls(
            vec![delegate("c1", SubAgentKind::Health, json!({"question": "Taches jaunes ?"}))],
            "m",
        ),
    );
    mock.add_scripted_failure(SubAgentKind::Health.identity(), MockFailure::Auth);
    mock.add_scripted_response(
        ROOT_KEY,
        ToolCompletionResponse::text("Je ne peux pas diagnostiquer pour le moment.", "m"),
    );

    let result = orchestrator(&mock)
        .process(input("Mes feuilles de manioc jaunissent"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::PartialSuccess);
    assert!(result.agent_responses.is_empty());
    let record = &result.tool_calls[0];
    assert!(!record.success);
    assert_eq!(record.agent.as_deref(), Some("health_agent"));
    assert!(record.error.as_deref().unwrap().contains("authentification"));
}

#[tokio::test]
async fn test_coordinator_rate_limit_fails_with_french_message() {
    let mock = MockProvider::new();
    mock.add_scripted_failure(ROOT_KEY, MockFailure::RateLimit);

    let result = orchestrator(&mock)
        .process(input("Quel engrais pour le maïs ?"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.failure, Some(FailureKind::RateLimit));
    assert!(result.response.contains("trop de demandes"));
}

#[tokio::test]
async fn test_consecutive_failures_stop_the_loop() {
    let mock = MockProvider::new();
    for i in 0..3 {
        mock.add_scripted_response(
            ROOT_KEY,
            ToolCompletionResponse::calls(
                vec![delegate(&format!("c{i}"), SubAgentKind::Health, json!({"question": "?"}))],
                "m",
            ),
        );
        mock.add_scripted_failure(SubAgentKind::Health.identity(), MockFailure::Auth);
    }

    let result = orchestrator(&mock)
        .with_config(OrchestratorConfig::default().with_failure_limits(2, 6))
        .process(input("Maladie du cacao"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.failure, Some(FailureKind::AgentFailures));
    assert_eq!(result.tool_calls.len(), 2);
}

#[tokio::test]
async fn test_iteration_limit_merges_agent_answers() {
    let mock = MockProvider::new();
    for i in 0..3 {
        mock.add_scripted_response(
            ROOT_KEY,
            ToolCompletionResponse::calls(
                vec![delegate(&format!("c{i}"), SubAgentKind::Weather, json!({"question": "Météo ?"}))],
                "m",
            ),
        );
    }

    let result = orchestrator(&mock)
        .with_config(OrchestratorConfig::default().with_max_iterations(2))
        .process(input("Quel temps demain ?"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::PartialSuccess);
    assert_eq!(result.agent_responses.len(), 2);
    assert!(result.response.contains("**Agent Météo**"));
    assert!(result.response.contains("mock response"));
}

#[tokio::test]
async fn test_unknown_delegation_tool_is_reported() {
    let mock = MockProvider::new();
    mock.add_scripted_response(
        ROOT_KEY,
        ToolCompletionResponse::calls(
            vec![ToolCall::new("c1", "call_market_agent", json!({"question": "?"}))],
            "m",
        ),
    );
    mock.add_scripted_response(ROOT_KEY, ToolCompletionResponse::text("Réponse.", "m"));

    let result = orchestrator(&mock).process(input("Prix ?")).await.unwrap();

    assert_eq!(result.status, ExecutionStatus::PartialSuccess);
    assert!(result.tool_calls[0].agent.is_none());
    assert!(result.tool_calls[0]
        .error
        .as_deref()
        .unwrap()
        .contains("outil inconnu"));
}

#[tokio::test]
async fn test_repeated_question_is_served_from_cache() {
    let mock = MockProvider::new();
    mock.add_scripted_response(ROOT_KEY, ToolCompletionResponse::text("Semez en mars.", "m"));
    let orchestrator = orchestrator(&mock);

    let first = orchestrator
        .process(OrchestratorInput::new("test", "chan", "alice", "Quand semer ?"))
        .await
        .unwrap();
    let second = orchestrator
        .process(OrchestratorInput::new("test", "chan", "bob", "  quand semer ? "))
        .await
        .unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.execution_id, second.execution_id);
    assert_eq!(mock.requests().len(), 1);

    // The cached turn still lands in the asker's history
    let session = orchestrator.session("test:chan:bob").await.unwrap().unwrap();
    assert_eq!(session.message_count(), 2);
    assert_eq!(session.history()[1].content, "Semez en mars.");
}

#[tokio::test]
async fn test_follow_up_question_bypasses_cache() {
    let mock = MockProvider::new();
    mock.add_scripted_response(ROOT_KEY, ToolCompletionResponse::text("Le cacao se récolte en octobre.", "m"));
    mock.add_scripted_response(ROOT_KEY, ToolCompletionResponse::text("Bonjour Bob.", "m"));
    mock.add_scripted_response(ROOT_KEY, ToolCompletionResponse::text("Pour votre cacao de l'Est : fin septembre.", "m"));
    let orchestrator = orchestrator(&mock);

    orchestrator
        .process(OrchestratorInput::new("test", "chan", "alice", "Quand récolter ?"))
        .await
        .unwrap();
    orchestrator
        .process(OrchestratorInput::new("test", "chan", "bob", "Bonjour, j'ai du cacao dans l'Est"))
        .await
        .unwrap();
    let follow_up = orchestrator
        .process(OrchestratorInput::new("test", "chan", "bob", "Quand récolter ?"))
        .await
        .unwrap();

    assert!(!follow_up.cached);
    assert_eq!(follow_up.response, "Pour votre cacao de l'Est : fin septembre.");
    assert_eq!(mock.requests().len(), 3);
    let session = orchestrator.session("test:chan:bob").await.unwrap().unwrap();
    assert_eq!(session.message_count(), 4);
}

#[tokio::test]
async fn test_cache_can_be_disabled() {
    let mock = MockProvider::new();
    let orchestrator = orchestrator(&mock).with_config(OrchestratorConfig::default().with_cache(false));

    orchestrator.process(input("Quand semer ?")).await.unwrap();
    let second = orchestrator.process(input("Quand semer ?")).await.unwrap();

    assert!(!second.cached);
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn test_empty_input_is_rejected() {
    let mock = MockProvider::new();
    let err = orchestrator(&mock).process(input("  <> ")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_cancel_unknown_execution() {
    let mock = MockProvider::new();
    let orchestrator = orchestrator(&mock);
    assert!(!orchestrator.cancel_execution(uuid::Uuid::new_v4()));
    assert!(orchestrator.active_execution_ids().is_empty());
}

#[tokio::test]
async fn test_slow_delegation_is_bounded_by_execution_time() {
    let mock = MockProvider::new();
    mock.add_scripted_response(
        ROOT_KEY,
        ToolCompletionResponse::calls(
            vec![delegate("c1", SubAgentKind::Weather, json!({"question": "Pluie ?"}))],
            "m",
        ),
    );
    mock.add_delay(SubAgentKind::Weather.identity(), Duration::from_secs(5));
    let orchestrator = orchestrator(&mock)
        .with_config(OrchestratorConfig::default().with_max_execution_secs(1));

    let started = std::time::Instant::now();
    let result = orchestrator.process(input("Va-t-il pleuvoir ?")).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.failure, Some(FailureKind::Timeout));
    assert!(result.agent_responses.is_empty());
}

#[tokio::test]
async fn test_running_execution_can_be_cancelled() {
    let mock = MockProvider::new();
    mock.add_scripted_response(
        ROOT_KEY,
        ToolCompletionResponse::calls(
            vec![delegate("c1", SubAgentKind::Crops, json!({"question": "Quelle variété ?"}))],
            "m",
        ),
    );
    mock.add_delay(SubAgentKind::Crops.identity(), Duration::from_secs(5));
    let orchestrator = orchestrator(&mock);

    let canceller = async {
        for _ in 0..100 {
            if let Some(id) = orchestrator.active_execution_ids().first() {
                return orchestrator.cancel_execution(*id);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    };
    let started = std::time::Instant::now();
    let (result, cancelled) = tokio::join!(orchestrator.process(input("Quel maïs planter ?")), canceller);
    let result = result.unwrap();

    assert!(cancelled);
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(result.status, ExecutionStatus::Cancelled);
    assert_eq!(result.response, "La demande a été annulée.");
    assert!(orchestrator.active_execution_ids().is_empty());
}

#[tokio::test]
async fn test_session_store_failure_does_not_block_answers() {
    use crate::session::MockSessionStore;

    let mut store = MockSessionStore::new();
    store
        .expect_get()
        .returning(|_| Err(Error::Session("redis down".into())));
    store
        .expect_save()
        .times(1)
        .returning(|_| Err(Error::Session("redis down".into())));

    let mock = MockProvider::new();
    mock.add_scripted_response(ROOT_KEY, ToolCompletionResponse::text("Bonjour !", "m"));

    let result = orchestrator(&mock)
        .with_session_store(Arc::new(store))
        .process(input("Bonjour"))
        .await
        .unwrap();
    assert_eq!(result.status, ExecutionStatus::Completed);
}
