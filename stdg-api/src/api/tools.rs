//! Tool directory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use stdg_common::db::{PricingType, Tool, MAX_RATING};
use stdg_common::time::now;
use tracing::info;

use super::{page, required};
use crate::content::pipeline::truncate_chars;
use crate::db::tools::{self, ToolFilter};
use crate::{ApiError, ApiResult, AppState};

const DEFAULT_PAGE_SIZE: i64 = 20;
const SHORT_DESCRIPTION_CHARS: usize = 150;

#[derive(Debug, Deserialize)]
pub struct ToolListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub pricing_type: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// GET /api/tools
pub async fn list_tools(
    State(state): State<AppState>,
    Query(query): Query<ToolListQuery>,
) -> ApiResult<Json<Vec<Tool>>> {
    let (limit, skip) = page(query.limit, query.skip, DEFAULT_PAGE_SIZE)?;

    let pricing_type = query
        .pricing_type
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(str::parse::<PricingType>)
        .transpose()?;

    let filter = ToolFilter {
        category: query.category.filter(|c| !c.trim().is_empty()),
        search: query.search,
        pricing_type,
    };

    Ok(Json(tools::list_tools(&state.db, &filter, limit, skip).await?))
}

/// GET /api/tools/:id
pub async fn get_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Tool>> {
    tools::get_tool(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Tool {}", id)))
}

/// Request body of POST /api/tools
#[derive(Debug, Deserialize)]
pub struct CreateToolRequest {
    pub name: String,
    pub category: String,
    pub description: String,
    pub short_description: Option<String>,
    pub pricing_type: PricingType,
    pub pricing_details: Option<String>,
    pub starting_price: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    pub affiliate_link: Option<String>,
    pub website_url: Option<String>,
}

/// POST /api/tools
///
/// Stores the tool with a generated review (static sentence when generation
/// is unavailable or fails).
pub async fn create_tool(
    State(state): State<AppState>,
    Json(payload): Json<CreateToolRequest>,
) -> ApiResult<(StatusCode, Json<Tool>)> {
    let name = required("name", &payload.name)?;
    let category = required("category", &payload.category)?;

    if !payload.rating.is_finite() || !(0.0..=MAX_RATING).contains(&payload.rating) {
        return Err(ApiError::BadRequest(format!(
            "rating must be between 0 and {}",
            MAX_RATING
        )));
    }
    if let Some(price) = payload.starting_price {
        if !price.is_finite() || price < 0.0 {
            return Err(ApiError::BadRequest(
                "starting_price must not be negative".to_string(),
            ));
        }
    }

    let review = state
        .pipeline
        .tool_review(&name, &category, &payload.description)
        .await;

    let timestamp = now();
    let tool = Tool {
        id: uuid::Uuid::new_v4().to_string(),
        short_description: payload
            .short_description
            .unwrap_or_else(|| truncate_chars(&payload.description, SHORT_DESCRIPTION_CHARS)),
        name,
        category,
        description: payload.description,
        pricing_type: payload.pricing_type,
        pricing_details: payload.pricing_details,
        starting_price: payload.starting_price,
        features: payload.features,
        pros: payload.pros,
        cons: payload.cons,
        rating: payload.rating,
        affiliate_link: payload.affiliate_link,
        website_url: payload.website_url,
        review,
        created_at: timestamp,
        updated_at: timestamp,
    };

    tools::insert_tool(&state.db, &tool).await?;
    info!(id = %tool.id, name = %tool.name, "Created tool");

    Ok((StatusCode::CREATED, Json(tool)))
}

pub fn tool_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tools", get(list_tools).post(create_tool))
        .route("/api/tools/:id", get(get_tool))
}
