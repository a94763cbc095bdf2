//! API Documentation - Swagger UI
//!
//! Serves the OpenAPI document at /api/v1/openapi.json and Swagger UI at /docs

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::{
    query::{AgentAnswer, QueryRequest, QueryResponse},
    reference::{CropView, PriceView, RegionDetail, RegionView},
    tools::ToolInfo,
};

/// AgroCam API OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AgroCam API",
        version = "1.0.0",
        description = "Conseil agricole multi-agents pour les agriculteurs du Cameroun.

## Overview
- **Advisory**: questions answered by the coordinator and its five sub-agents
  (météo, cultures, santé des plantes, économie, ressources)
- **Reference**: regions, crops and market prices (FCFA)
- **Tools**: the domain tools available to the sub-agents

Every response is wrapped in `{success, data?, error?}`.
",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Advisory
        crate::api::query::query,
        // Reference
        crate::api::reference::list_regions,
        crate::api::reference::get_region,
        crate::api::reference::list_crops,
        crate::api::reference::get_crop,
        crate::api::reference::get_price,
        // Tools
        crate::api::tools::list_tools,
    ),
    components(
        schemas(
            QueryRequest,
            QueryResponse,
            AgentAnswer,
            RegionView,
            RegionDetail,
            CropView,
            PriceView,
            ToolInfo,
        )
    ),
    tags(
        (name = "advisory", description = "Multi-agent advisory"),
        (name = "reference", description = "Reference tables"),
        (name = "tools", description = "Domain tools"),
    )
)]
pub struct ApiDoc;

/// Create documentation routes
pub fn docs_routes() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api/v1/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_endpoint() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/api/v1/query",
            "/api/v1/regions",
            "/api/v1/regions/{name}",
            "/api/v1/crops/{name}",
            "/api/v1/prices/{crop}",
            "/api/v1/tools",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}
