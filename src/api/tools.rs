//! Tools API endpoints
//!
//! GET /api/v1/tools - List the domain tools the sub-agents can call

use super::{ApiResponse, AppState};
use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

/// Tool information for API response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToolInfo {
    /// Tool name (identifier)
    pub name: String,
    /// Description shown to the model
    pub description: String,
    /// Advisory domain (weather, crops, health, economic, resources)
    pub category: String,
    /// Parameter schema (JSON Schema)
    #[schema(value_type = Object)]
    pub parameters: serde_json::Value,
}

/// List every enabled domain tool, grouped by domain
#[utoipa::path(
    get,
    path = "/api/v1/tools",
    tag = "tools",
    responses((status = 200, description = "Domain tools", body = Vec<ToolInfo>))
)]
pub async fn list_tools(State(state): State<AppState>) -> Json<ApiResponse<Vec<ToolInfo>>> {
    let mut tools: Vec<ToolInfo> = state
        .runner
        .registry()
        .list_enabled()
        .into_iter()
        .map(|def| ToolInfo {
            name: def.name.clone(),
            description: def.description.clone(),
            category: def.category.as_str().to_string(),
            parameters: def.parameters.clone(),
        })
        .collect();
    tools.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));

    Json(ApiResponse::success(tools))
}

/// Tools routes
pub fn tools_routes() -> Router<AppState> {
    Router::new().route("/api/v1/tools", get(list_tools))
}

#[cfg(test)]
mod tests {
    use crate::api::api_router;
    use crate::api::test_support::{get, send, state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_list_tools() {
        let (status, body) = send(api_router(state(None)), get("/api/v1/tools")).await;
        assert_eq!(status, StatusCode::OK);

        let tools = body["data"].as_array().unwrap();
        assert_eq!(tools.len(), 24);
        assert!(tools
            .iter()
            .any(|t| t["name"] == "diagnose_plant_disease" && t["category"] == "health"));
    }
}
