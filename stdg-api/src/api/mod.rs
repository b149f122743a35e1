//! HTTP API handlers for stdg-api

pub mod blog;
pub mod health;
pub mod newsletter;
pub mod stats;
pub mod status;
pub mod tools;

pub use blog::blog_routes;
pub use health::health_routes;
pub use newsletter::newsletter_routes;
pub use stats::stats_routes;
pub use status::status_routes;
pub use tools::tool_routes;

use crate::{ApiError, ApiResult};

/// Largest page size accepted by list endpoints
pub const MAX_PAGE_SIZE: i64 = 100;

/// Validate `limit`/`skip` query parameters
pub(crate) fn page(limit: Option<i64>, skip: Option<i64>, default_limit: i64) -> ApiResult<(i64, i64)> {
    let limit = limit.unwrap_or(default_limit);
    let skip = skip.unwrap_or(0);

    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    if skip < 0 {
        return Err(ApiError::BadRequest("skip must not be negative".to_string()));
    }
    Ok((limit, skip))
}

/// Trimmed, non-empty text field
pub(crate) fn required(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_bounds() {
        assert_eq!(page(None, None, 10).unwrap(), (10, 0));
        assert_eq!(page(Some(100), Some(5), 10).unwrap(), (100, 5));
        assert!(page(Some(0), None, 10).is_err());
        assert!(page(Some(101), None, 10).is_err());
        assert!(page(None, Some(-1), 10).is_err());
    }

    #[test]
    fn test_required() {
        assert_eq!(required("title", "  Hi ").unwrap(), "Hi");
        assert!(required("title", "   ").is_err());
    }
}
