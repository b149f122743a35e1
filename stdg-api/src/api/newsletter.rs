//! Newsletter endpoints
//!
//! The local record is authoritative; forwarding to the mailing list happens
//! afterwards and its failures are logged, never returned.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::newsletter::{self, SubscribeOutcome};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub message: String,
    pub status: SubscribeOutcome,
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub email: String,
}

/// Normalized email, or 400
pub(crate) fn normalize_email(raw: &str) -> ApiResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ApiError::BadRequest(format!("Invalid email address: {}", raw.trim())));
    }
    Ok(email)
}

/// POST /api/newsletter/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> ApiResult<Json<SubscribeResponse>> {
    let email = normalize_email(&payload.email)?;
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let outcome = newsletter::subscribe(&state.db, &email, name).await?;

    if outcome != SubscribeOutcome::AlreadySubscribed {
        info!(email = %email, outcome = ?outcome, "Newsletter subscription stored");
        if let Some(list) = &state.mailing_list {
            if let Err(e) = list.add_member(&email, name).await {
                warn!(email = %email, error = %e, "Mailing list forwarding failed");
            }
        }
    }

    let message = match outcome {
        SubscribeOutcome::AlreadySubscribed => "Already subscribed",
        SubscribeOutcome::Created | SubscribeOutcome::Reactivated => "Successfully subscribed",
    };

    Ok(Json(SubscribeResponse {
        message: message.to_string(),
        status: outcome,
    }))
}

/// POST /api/newsletter/unsubscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<UnsubscribeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let email = normalize_email(&payload.email)?;
    if !newsletter::unsubscribe(&state.db, &email).await? {
        return Err(ApiError::NotFound(format!("Subscription {}", email)));
    }
    info!(email = %email, "Newsletter subscription deactivated");
    Ok(Json(serde_json::json!({ "message": "Unsubscribed" })))
}

pub fn newsletter_routes() -> Router<AppState> {
    Router::new()
        .route("/api/newsletter/subscribe", post(subscribe))
        .route("/api/newsletter/unsubscribe", post(unsubscribe))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@Example.COM ").unwrap(), "ann@example.com");
        for bad in ["", "ann", "@example.com", "ann@", "ann@example", "a b@example.com", "a@b@c.com", "a@.com"] {
            assert!(normalize_email(bad).is_err(), "{} accepted", bad);
        }
    }
}
