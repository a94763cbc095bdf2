//! Reference data endpoints
//!
//! GET /api/v1/regions - All regions
//! GET /api/v1/regions/{name} - One region with suitable crops and the current season
//! GET /api/v1/crops - All crops
//! GET /api/v1/crops/{name} - One crop
//! GET /api/v1/prices/{crop} - Market price band

use super::{ApiError, ApiResponse, AppState};
use agrocam_data::crop::suitable_crops;
use agrocam_data::utils::{format_fcfa, season_for};
use agrocam_data::{market_price, Crop, Region};
use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, Local};
use serde::Serialize;
use utoipa::ToSchema;

/// Region summary
#[derive(Debug, Serialize, ToSchema)]
pub struct RegionView {
    pub name: String,
    pub capital: String,
    pub climate: String,
    pub main_crops: Vec<String>,
    pub rainfall_mm_min: u32,
    pub rainfall_mm_max: u32,
    pub temperature_c_min: f64,
    pub temperature_c_max: f64,
    pub wet_months: Vec<u32>,
    pub zones: Vec<String>,
}

impl From<Region> for RegionView {
    fn from(region: Region) -> Self {
        let info = region.info();
        Self {
            name: region.name().to_string(),
            capital: info.capital.0.to_string(),
            climate: info.climate.to_string(),
            main_crops: info.main_crops.iter().map(|c| c.to_string()).collect(),
            rainfall_mm_min: info.rainfall_mm.min,
            rainfall_mm_max: info.rainfall_mm.max,
            temperature_c_min: info.temperature_c.min,
            temperature_c_max: info.temperature_c.max,
            wet_months: info.wet_months.to_vec(),
            zones: info.zones.iter().map(|z| z.to_string()).collect(),
        }
    }
}

/// Region with the crops recommended there
#[derive(Debug, Serialize, ToSchema)]
pub struct RegionDetail {
    pub region: RegionView,
    pub suitable_crops: Vec<String>,
    /// Season of the current month
    pub current_season: String,
}

/// Market price band
#[derive(Debug, Serialize, ToSchema)]
pub struct PriceView {
    pub crop: String,
    pub min: u32,
    pub max: u32,
    pub avg: u32,
    pub currency: String,
    pub unit: String,
    /// Average formatted with thousands separators ("1 500 FCFA")
    pub formatted_avg: String,
    /// False when the band is the generic fallback
    pub tabulated: bool,
}

impl From<Crop> for PriceView {
    fn from(crop: Crop) -> Self {
        let price = market_price(crop);
        Self {
            crop: crop.label().to_string(),
            min: price.min,
            max: price.max,
            avg: price.avg,
            currency: price.currency.to_string(),
            unit: price.unit.to_string(),
            formatted_avg: format_fcfa(f64::from(price.avg)),
            tabulated: price.tabulated,
        }
    }
}

/// Crop summary
#[derive(Debug, Serialize, ToSchema)]
pub struct CropView {
    pub key: String,
    pub label: String,
    pub family: String,
    pub cycle_days: u32,
    pub legume: bool,
    /// Detailed agronomic record, when tabulated
    #[schema(value_type = Option<Object>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub price: PriceView,
}

impl From<Crop> for CropView {
    fn from(crop: Crop) -> Self {
        Self {
            key: crop.key().to_string(),
            label: crop.label().to_string(),
            family: crop.family().to_string(),
            cycle_days: crop.cycle_days(),
            legume: crop.is_legume(),
            details: crop.info().and_then(|i| serde_json::to_value(i).ok()),
            price: crop.into(),
        }
    }
}

/// List regions
#[utoipa::path(
    get,
    path = "/api/v1/regions",
    tag = "reference",
    responses((status = 200, description = "All ten regions", body = Vec<RegionView>))
)]
pub async fn list_regions() -> Json<ApiResponse<Vec<RegionView>>> {
    Json(ApiResponse::success(
        Region::ALL.iter().map(|r| RegionView::from(*r)).collect(),
    ))
}

/// Get one region
#[utoipa::path(
    get,
    path = "/api/v1/regions/{name}",
    tag = "reference",
    params(("name" = String, Path, description = "Region name, accents optional")),
    responses(
        (status = 200, description = "Region details", body = RegionDetail),
        (status = 404, description = "Unknown region")
    )
)]
pub async fn get_region(
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<RegionDetail>>, ApiError> {
    let region: Region = name.parse()?;
    let month = Local::now().month();
    Ok(Json(ApiResponse::success(RegionDetail {
        region: region.into(),
        suitable_crops: suitable_crops(region)
            .into_iter()
            .map(|c| c.crop.label().to_string())
            .collect(),
        current_season: season_for(region, month).label().to_string(),
    })))
}

/// List crops
#[utoipa::path(
    get,
    path = "/api/v1/crops",
    tag = "reference",
    responses((status = 200, description = "All crops", body = Vec<CropView>))
)]
pub async fn list_crops() -> Json<ApiResponse<Vec<CropView>>> {
    Json(ApiResponse::success(
        Crop::ALL.iter().map(|c| CropView::from(*c)).collect(),
    ))
}

/// Get one crop
#[utoipa::path(
    get,
    path = "/api/v1/crops/{name}",
    tag = "reference",
    params(("name" = String, Path, description = "Crop name (French or English)")),
    responses(
        (status = 200, description = "Crop details", body = CropView),
        (status = 404, description = "Unknown crop")
    )
)]
pub async fn get_crop(Path(name): Path<String>) -> Result<Json<ApiResponse<CropView>>, ApiError> {
    let crop: Crop = name.parse()?;
    Ok(Json(ApiResponse::success(crop.into())))
}

/// Get the market price band of a crop
#[utoipa::path(
    get,
    path = "/api/v1/prices/{crop}",
    tag = "reference",
    params(("crop" = String, Path, description = "Crop name")),
    responses(
        (status = 200, description = "Price band in FCFA", body = PriceView),
        (status = 404, description = "Unknown crop")
    )
)]
pub async fn get_price(Path(crop): Path<String>) -> Result<Json<ApiResponse<PriceView>>, ApiError> {
    let crop: Crop = crop.parse()?;
    Ok(Json(ApiResponse::success(crop.into())))
}

/// Reference data routes
pub fn reference_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/regions", get(list_regions))
        .route("/api/v1/regions/:name", get(get_region))
        .route("/api/v1/crops", get(list_crops))
        .route("/api/v1/crops/:name", get(get_crop))
        .route("/api/v1/prices/:crop", get(get_price))
}

#[cfg(test)]
mod tests {
    use crate::api::api_router;
    use crate::api::test_support::{get, send, state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_list_regions() {
        let (status, body) = send(api_router(state(None)), get("/api/v1/regions")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_region_lookup_folds_accents() {
        let (status, body) =
            send(api_router(state(None)), get("/api/v1/regions/extreme-nord")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["region"]["name"], "Extrême-Nord");
        assert!(body["data"]["current_season"].is_string());
    }

    #[tokio::test]
    async fn test_centre_has_a_climate() {
        let (_, body) = send(api_router(state(None)), get("/api/v1/regions/Centre")).await;
        assert!(!body["data"]["region"]["climate"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_region_is_404() {
        let (status, body) = send(api_router(state(None)), get("/api/v1/regions/Lagos")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_crop_and_price_lookup() {
        let (status, body) = send(api_router(state(None)), get("/api/v1/crops/cocoa")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["key"], "cacao");
        assert_eq!(body["data"]["price"]["currency"], "FCFA");

        let (status, body) = send(api_router(state(None)), get("/api/v1/prices/mais")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["crop"], "maïs");
    }

    #[tokio::test]
    async fn test_unknown_crop_is_404() {
        let (status, _) = send(api_router(state(None)), get("/api/v1/prices/quinoa")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
