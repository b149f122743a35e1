//! Site-wide counters

use axum::{extract::State, routing::get, Json, Router};

use crate::db::{self, SiteCounts};
use crate::{ApiResult, AppState};

/// GET /api/stats
pub async fn site_stats(State(state): State<AppState>) -> ApiResult<Json<SiteCounts>> {
    Ok(Json(db::site_counts(&state.db).await?))
}

pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/api/stats", get(site_stats))
}
