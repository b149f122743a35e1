//! stdg-api library interface
//!
//! Exposes the router, application state and content pipeline for the binary
//! and for integration tests.

pub mod api;
pub mod content;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::content::ContentPipeline;
use crate::services::{AutoPublisher, MailingList};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Article generation (remote or template)
    pub pipeline: Arc<ContentPipeline>,
    /// Optional third-party mailing list
    pub mailing_list: Option<Arc<dyn MailingList>>,
    /// Daily publisher, also triggered by `POST /api/blog/auto-publish`
    pub publisher: Arc<AutoPublisher>,
    /// Pause between articles in bulk operations
    pub bulk_delay: Duration,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        pipeline: Arc<ContentPipeline>,
        publisher: Arc<AutoPublisher>,
        bulk_delay: Duration,
    ) -> Self {
        Self {
            db,
            pipeline,
            mailing_list: None,
            publisher,
            bulk_delay,
            startup_time: Utc::now(),
        }
    }

    pub fn with_mailing_list(mut self, mailing_list: Arc<dyn MailingList>) -> Self {
        self.mailing_list = Some(mailing_list);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::status_routes())
        .merge(api::blog_routes())
        .merge(api::tool_routes())
        .merge(api::newsletter_routes())
        .merge(api::stats_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
