//! Web API module for AgroCam
//!
//! Provides REST API endpoints for:
//! - Advisory questions routed through the coordinator
//! - Reference data (regions, crops, prices)
//! - Tool listing
//! - Health checks and OpenAPI documentation

pub mod docs;
pub mod health;
pub mod query;
pub mod reference;
pub mod tools;

use agrocam_core::{FailureKind, Orchestrator, UserFriendlyError};
use agrocam_tools::ToolRunner;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

pub use docs::docs_routes;
pub use health::health_routes;

/// Shared state of the API handlers
#[derive(Clone)]
pub struct AppState {
    /// `None` when no Gemini key is configured
    pub orchestrator: Option<Arc<Orchestrator>>,
    pub runner: ToolRunner,
}

/// Standard API envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error returned by handlers, rendered as an `ApiResponse` envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "🔑 Le service d'IA n'est pas configuré (GEMINI_API_KEY est requis).",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

impl From<agrocam_core::Error> for ApiError {
    fn from(error: agrocam_core::Error) -> Self {
        use agrocam_core::Error;
        let status = match &error {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Data(agrocam_data::Error::UnknownRegion(_))
            | Error::Data(agrocam_data::Error::UnknownCrop(_)) => StatusCode::NOT_FOUND,
            Error::Data(_) => StatusCode::BAD_REQUEST,
            Error::ApiKeyMissing { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::Llm(agrocam_llm::Error::RateLimit) => StatusCode::TOO_MANY_REQUESTS,
            Error::Llm(agrocam_llm::Error::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.user_message())
    }
}

impl From<agrocam_data::Error> for ApiError {
    fn from(error: agrocam_data::Error) -> Self {
        agrocam_core::Error::from(error).into()
    }
}

/// HTTP status for a failed execution
pub fn failure_status(failure: Option<FailureKind>) -> StatusCode {
    match failure {
        Some(FailureKind::RateLimit) => StatusCode::TOO_MANY_REQUESTS,
        Some(FailureKind::NotConfigured)
        | Some(FailureKind::Authentication)
        | Some(FailureKind::Upstream)
        | Some(FailureKind::Timeout) => StatusCode::SERVICE_UNAVAILABLE,
        Some(FailureKind::AgentFailures)
        | Some(FailureKind::IterationLimit)
        | Some(FailureKind::Internal)
        | None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Create the API router with all endpoints
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(query::query_routes())
        .merge(reference::reference_routes())
        .merge(tools::tools_routes())
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_status_mapping() {
        assert_eq!(
            failure_status(Some(FailureKind::RateLimit)),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            failure_status(Some(FailureKind::NotConfigured)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            failure_status(Some(FailureKind::AgentFailures)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_core_errors_map_to_status() {
        let error: ApiError = agrocam_core::Error::InvalidInput("vide".into()).into();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);

        let error: ApiError = agrocam_data::Error::UnknownRegion("Lagos".into()).into();
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert!(error.message.contains("Lagos"));
    }
}
