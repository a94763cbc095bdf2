//! Advisory endpoint
//!
//! POST /api/v1/query - Ask the coordinator a question

use super::{failure_status, ApiError, ApiResponse, AppState};
use agrocam_core::{ExecutionResult, ExecutionStatus, OrchestratorInput};
use agrocam_data::Region;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

/// Question sent by a client
#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryRequest {
    /// Free-text question, in French
    pub query: String,
    /// Region name ("Centre", "Nord-Ouest", ...)
    #[serde(default)]
    pub region: Option<String>,
    /// Answer language
    #[serde(default)]
    pub language: Option<String>,
    /// Conversation identifier; a new one is issued when absent
    #[serde(default)]
    pub session_id: Option<String>,
}

/// One sub-agent answer
#[derive(Debug, Serialize, ToSchema)]
pub struct AgentAnswer {
    pub agent_name: String,
    pub response_text: String,
    pub confidence_score: f64,
    pub recommendations: Vec<String>,
}

/// Coordinator answer
#[derive(Debug, Serialize, ToSchema)]
pub struct QueryResponse {
    pub execution_id: Uuid,
    /// completed, partial_success, failed or cancelled
    pub status: String,
    pub response: String,
    pub primary_agent: Option<String>,
    pub agents: Vec<AgentAnswer>,
    /// Mean confidence of the sub-agents consulted
    pub correlation_score: f64,
    pub iterations: usize,
    pub duration_ms: u64,
    pub cached: bool,
    pub session_id: String,
}

impl QueryResponse {
    fn from_result(result: &ExecutionResult, session_id: String) -> Self {
        let summary = result.summary();
        Self {
            execution_id: result.execution_id,
            status: status_label(result.status).to_string(),
            response: result.response.clone(),
            primary_agent: summary.primary_agent,
            agents: result
                .agent_responses
                .iter()
                .map(|r| AgentAnswer {
                    agent_name: r.agent_name.clone(),
                    response_text: r.response_text.clone(),
                    confidence_score: r.confidence_score,
                    recommendations: r.recommendations.clone(),
                })
                .collect(),
            correlation_score: summary.correlation_score,
            iterations: result.iterations,
            duration_ms: result.duration_ms,
            cached: result.cached,
            session_id,
        }
    }
}

fn status_label(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Completed => "completed",
        ExecutionStatus::PartialSuccess => "partial_success",
        ExecutionStatus::Failed => "failed",
        ExecutionStatus::Cancelled => "cancelled",
    }
}

/// Ask the coordinator
#[utoipa::path(
    post,
    path = "/api/v1/query",
    tag = "advisory",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Answer, wrapped in the API envelope", body = QueryResponse),
        (status = 400, description = "Empty question"),
        (status = 404, description = "Unknown region"),
        (status = 429, description = "Upstream rate limit"),
        (status = 500, description = "Sub-agents failed"),
        (status = 503, description = "LLM not configured or unavailable")
    )
)]
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ApiResponse<QueryResponse>>, ApiError> {
    let orchestrator = state.orchestrator.as_ref().ok_or_else(ApiError::unavailable)?;

    let region = request
        .region
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::parse::<Region>)
        .transpose()?;
    let session_id = request
        .session_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut input = OrchestratorInput::new("http", "api", &session_id, &request.query);
    if let Some(region) = region {
        input = input.with_region(region);
    }
    if let Some(language) = request.language {
        input = input.with_language(language);
    }

    let result = orchestrator.process(input).await?;
    info!(
        execution_id = %result.execution_id,
        status = status_label(result.status),
        cached = result.cached,
        "Query answered"
    );
    if result.status == ExecutionStatus::Failed {
        return Err(ApiError::new(failure_status(result.failure), result.response));
    }

    Ok(Json(ApiResponse::success(QueryResponse::from_result(
        &result, session_id,
    ))))
}

/// Advisory routes
pub fn query_routes() -> Router<AppState> {
    Router::new().route("/api/v1/query", post(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::api_router;
    use crate::api::test_support::{post_json, send, state};
    use agrocam_llm::mock::MockFailure;
    use agrocam_llm::{MockProvider, ToolCompletionResponse};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_query_returns_answer() {
        let mock = MockProvider::new();
        mock.add_tool_response(ToolCompletionResponse::text("Semez après les premières pluies.", "m"));

        let (status, body) = send(
            api_router(state(Some(&mock))),
            post_json(
                "/api/v1/query",
                json!({"query": "Quand semer le maïs ?", "region": "Ouest", "session_id": "s1"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "completed");
        assert_eq!(body["data"]["response"], "Semez après les premières pluies.");
        assert_eq!(body["data"]["session_id"], "s1");
    }

    #[tokio::test]
    async fn test_query_without_llm_is_unavailable() {
        let (status, body) = send(
            api_router(state(None)),
            post_json("/api/v1/query", json!({"query": "Bonjour"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_query_rejects_unknown_region_and_empty_text() {
        let mock = MockProvider::new();
        let router = api_router(state(Some(&mock)));

        let (status, body) = send(
            router.clone(),
            post_json("/api/v1/query", json!({"query": "Bonjour", "region": "Lagos"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("Lagos"));

        let (status, _) = send(router, post_json("/api/v1/query", json!({"query": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_429() {
        let mock = MockProvider::new();
        mock.add_failure(MockFailure::RateLimit);

        let (status, body) = send(
            api_router(state(Some(&mock))),
            post_json("/api/v1/query", json!({"query": "Prix du cacao ?"})),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"].as_str().unwrap().contains("trop de demandes"));
    }
}
