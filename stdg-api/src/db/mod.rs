//! Database access for stdg-api
//!
//! One module per table. All functions take the shared pool and return
//! `stdg_common::Result` so callers can tell constraint violations apart.

pub mod articles;
pub mod newsletter;
pub mod tools;

use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use stdg_common::{Error, Result};

pub use stdg_common::db::{create_schema, init_database};

/// Encode a list field for a JSON text column
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Internal(format!("JSON encode failed: {}", e)))
}

/// Decode a JSON text column
pub(crate) fn from_json<T: DeserializeOwned>(column: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| Error::Internal(format!("Corrupt JSON in column {}: {}", column, e)))
}

/// Row counts reported by `GET /api/stats`
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct SiteCounts {
    pub tools: i64,
    pub articles: i64,
    pub subscribers: i64,
}

/// Counts of tools, articles and active subscriptions
pub async fn site_counts(pool: &SqlitePool) -> Result<SiteCounts> {
    Ok(SiteCounts {
        tools: tools::count_tools(pool).await?,
        articles: articles::count_articles(pool).await?,
        subscribers: newsletter::count_active(pool).await?,
    })
}
