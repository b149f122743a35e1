//! Service banner and operational status

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

/// GET /api/
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "SaaS Tools Blog API" }))
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<Value> {
    let schedule = state.publisher.schedule();
    Json(json!({
        "status": "operational",
        "system": "stdg",
        "remote_generation": state.pipeline.remote_enabled(),
        "mailing_list": state.mailing_list.is_some(),
        "affiliate_catalog_version": state.pipeline.catalog().version(),
        "auto_publish": {
            "enabled": schedule.enabled,
            "time_utc": format!("{:02}:{:02}", schedule.hour, schedule.minute),
        },
    }))
}

/// POST /api/status
pub async fn post_status() -> Json<Value> {
    Json(json!({ "message": "Status check - content service operational" }))
}

pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/api/", get(root))
        .route("/api/status", get(get_status).post(post_status))
}
