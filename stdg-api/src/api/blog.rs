//! Blog endpoints
//!
//! Reading, creating, generating and maintaining articles. Every creation path
//! goes through the slug-unique inserts in `db::articles`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use stdg_common::db::Article;
use stdg_common::slug::slugify;
use tracing::{error, info, warn};

use super::{page, required};
use crate::content::pipeline::{
    excerpt_from_body, truncate_chars, DEFAULT_TARGET_WORDS, META_DESCRIPTION_CHARS,
};
use crate::content::seo::seo_score;
use crate::content::topics::{keywords_for_topic, tags_from_keywords, BULK_TOPICS, SAAS_CATEGORIES};
use crate::content::GenerationRequest;
use crate::db::articles::{self, BlogStats};
use crate::{ApiError, ApiResult, AppState};

const DEFAULT_PAGE_SIZE: i64 = 10;
const DEFAULT_BULK_COUNT: usize = 20;
const DEFAULT_REFRESH_COUNT: i64 = 5;
const MAX_REFRESH_COUNT: i64 = 50;
const MIN_TARGET_WORDS: u32 = 300;
const MAX_TARGET_WORDS: u32 = 10_000;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    pub category: Option<String>,
}

/// GET /api/blog
///
/// Published articles, newest first.
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Article>>> {
    let (limit, skip) = page(query.limit, query.skip, DEFAULT_PAGE_SIZE)?;
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let list = articles::list_published(&state.db, category, limit, skip).await?;
    Ok(Json(list))
}

/// GET /api/blog/:slug
///
/// Counts a view. Unknown slugs return 404 and count nothing.
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Article>> {
    match articles::record_view(&state.db, &slug).await? {
        Some(article) => Ok(Json(article)),
        None => Err(ApiError::NotFound(format!("Article '{}'", slug))),
    }
}

/// Request body of POST /api/blog
#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Generated by the pipeline when absent
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub meta_description: Option<String>,
    pub featured_image: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

/// POST /api/blog
pub async fn create_article(
    State(state): State<AppState>,
    Json(payload): Json<CreateArticleRequest>,
) -> ApiResult<(StatusCode, Json<Article>)> {
    let title = required("title", &payload.title)?;
    let category = required("category", &payload.category)?;

    let request = GenerationRequest::new(title.clone(), category.clone())
        .with_keywords(payload.keywords)
        .with_tags(payload.tags);

    let mut article = match payload.content.filter(|c| !c.trim().is_empty()) {
        Some(content) => {
            let mut article = Article::new(title.clone(), slugify(&title), category.clone());
            article.excerpt = payload
                .excerpt
                .unwrap_or_else(|| excerpt_from_body(&content));
            article.meta_description = truncate_chars(
                payload
                    .meta_description
                    .as_deref()
                    .unwrap_or(&article.excerpt),
                META_DESCRIPTION_CHARS,
            );
            article.seo_score = seo_score(&content, &request.keywords);
            article.affiliate_links = state.pipeline.catalog().resolve(&category).links();
            article.keywords = request.keywords.clone();
            article.tags = request.tags.clone();
            article.content = content;
            article
        }
        None => {
            let generated = state.pipeline.generate(&request).await;
            let mut article = generated.into_article(&request);
            if let Some(excerpt) = payload.excerpt {
                article.excerpt = excerpt;
            }
            if let Some(meta) = payload.meta_description {
                article.meta_description = truncate_chars(&meta, META_DESCRIPTION_CHARS);
            }
            article
        }
    };

    article.featured_image = payload.featured_image;
    article.published = payload.published.unwrap_or(true);
    article.featured = payload.featured.unwrap_or(false);

    articles::insert_with_unique_slug(&state.db, &mut article).await?;
    info!(slug = %article.slug, "Created article");

    Ok((StatusCode::CREATED, Json(article)))
}

/// Request body of POST /api/blog/generate
#[derive(Debug, Deserialize)]
pub struct GenerateArticleRequest {
    pub topic: String,
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub target_length: Option<u32>,
    pub tags: Option<Vec<String>>,
}

/// POST /api/blog/generate
pub async fn generate_article(
    State(state): State<AppState>,
    Json(payload): Json<GenerateArticleRequest>,
) -> ApiResult<(StatusCode, Json<Article>)> {
    let topic = required("topic", &payload.topic)?;
    let category = required("category", &payload.category)?;

    let target_words = payload.target_length.unwrap_or(DEFAULT_TARGET_WORDS);
    if !(MIN_TARGET_WORDS..=MAX_TARGET_WORDS).contains(&target_words) {
        return Err(ApiError::BadRequest(format!(
            "target_length must be between {} and {}",
            MIN_TARGET_WORDS, MAX_TARGET_WORDS
        )));
    }

    let keywords = if payload.keywords.is_empty() {
        keywords_for_topic(&topic)
    } else {
        payload.keywords
    };
    let tags = payload
        .tags
        .unwrap_or_else(|| tags_from_keywords(&keywords));

    let request = GenerationRequest::new(topic, category)
        .with_keywords(keywords)
        .with_tags(tags)
        .with_target_words(target_words);

    let generated = state.pipeline.generate(&request).await;
    let source = generated.source;
    let mut article = generated.into_article(&request);
    articles::insert_with_unique_slug(&state.db, &mut article).await?;

    info!(slug = %article.slug, source = ?source, "Generated article");
    Ok((StatusCode::CREATED, Json(article)))
}

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BulkGenerateResponse {
    pub message: String,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub slugs: Vec<String>,
}

/// POST /api/blog/bulk-generate?count=N
///
/// Walks the fixed topic list (first `count`, default 20). Topics whose slug
/// already exists are skipped, so repeated calls never duplicate articles.
pub async fn bulk_generate(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> ApiResult<Json<BulkGenerateResponse>> {
    let count = match query.count {
        None => DEFAULT_BULK_COUNT,
        Some(n) if n >= 0 => (n as usize).min(BULK_TOPICS.len()),
        Some(_) => return Err(ApiError::BadRequest("count must not be negative".to_string())),
    };

    let mut response = BulkGenerateResponse {
        message: String::new(),
        generated: 0,
        skipped: 0,
        failed: 0,
        slugs: Vec::new(),
    };

    for topic in BULK_TOPICS.iter().take(count) {
        let slug = slugify(topic);
        if articles::slug_exists(&state.db, &slug).await? {
            response.skipped += 1;
            continue;
        }

        let request = GenerationRequest::for_topic(topic);
        let article = state.pipeline.generate(&request).await.into_article(&request);

        match articles::insert_if_absent(&state.db, &article).await {
            Ok(true) => {
                response.generated += 1;
                response.slugs.push(article.slug);
            }
            // Another request stored the same slug after our check
            Ok(false) => response.skipped += 1,
            Err(e) => {
                error!(topic = %topic, error = %e, "Bulk generation failed for topic");
                response.failed += 1;
                continue;
            }
        }

        if !state.bulk_delay.is_zero() {
            tokio::time::sleep(state.bulk_delay).await;
        }
    }

    response.message = format!("Successfully generated {} articles", response.generated);
    info!(
        generated = response.generated,
        skipped = response.skipped,
        failed = response.failed,
        "Bulk generation finished"
    );
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub updated: usize,
    pub slugs: Vec<String>,
}

/// POST /api/blog/update-content?count=N
///
/// Regenerates body, excerpt and meta description of the `count` articles
/// refreshed longest ago. Slugs and view counts are left alone.
pub async fn update_content(
    State(state): State<AppState>,
    Query(query): Query<CountQuery>,
) -> ApiResult<Json<RefreshResponse>> {
    let count = query.count.unwrap_or(DEFAULT_REFRESH_COUNT);
    if !(1..=MAX_REFRESH_COUNT).contains(&count) {
        return Err(ApiError::BadRequest(format!(
            "count must be between 1 and {}",
            MAX_REFRESH_COUNT
        )));
    }

    let stale = articles::list_stalest(&state.db, count).await?;
    let total = stale.len();
    let mut updated = Vec::with_capacity(total);

    for (i, mut article) in stale.into_iter().enumerate() {
        let request = GenerationRequest::new(article.title.clone(), article.category.clone())
            .with_keywords(article.keywords.clone())
            .with_tags(article.tags.clone());
        let generated = state.pipeline.generate(&request).await;

        article.content = generated.body;
        article.excerpt = generated.excerpt;
        article.meta_description = generated.meta_description;
        article.seo_score = generated.seo_score;
        article.affiliate_links = generated.affiliate_links;
        article.updated_at = Utc::now();

        if articles::update_article(&state.db, &article).await? {
            updated.push(article.slug);
        } else {
            warn!(id = %article.id, "Article disappeared during refresh");
        }

        if i + 1 < total && !state.bulk_delay.is_zero() {
            tokio::time::sleep(state.bulk_delay).await;
        }
    }

    Ok(Json(RefreshResponse {
        message: format!("Updated {} articles", updated.len()),
        updated: updated.len(),
        slugs: updated,
    }))
}

/// Request body of PUT /api/blog/posts/:id (all fields optional)
#[derive(Debug, Default, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

/// PUT /api/blog/posts/:id
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateArticleRequest>,
) -> ApiResult<Json<Article>> {
    let Some(mut article) = articles::get_by_id(&state.db, &id).await? else {
        return Err(ApiError::NotFound(format!("Article {}", id)));
    };

    let mut slug_changed = false;
    if let Some(title) = payload.title {
        let title = required("title", &title)?;
        if title != article.title {
            let slug = slugify(&title);
            slug_changed = slug != article.slug;
            article.slug = slug;
            article.title = title;
        }
    }
    if let Some(category) = payload.category {
        let category = required("category", &category)?;
        if category != article.category {
            article.affiliate_links = state.pipeline.catalog().resolve(&category).links();
            article.category = category;
        }
    }
    if let Some(keywords) = payload.keywords {
        article.keywords = keywords;
    }
    if let Some(content) = payload.content {
        article.seo_score = seo_score(&content, &article.keywords);
        article.content = content;
    }
    if let Some(excerpt) = payload.excerpt {
        article.excerpt = excerpt;
    }
    if let Some(meta_title) = payload.meta_title {
        article.meta_title = meta_title;
    }
    if let Some(meta) = payload.meta_description {
        article.meta_description = truncate_chars(&meta, META_DESCRIPTION_CHARS);
    }
    if let Some(tags) = payload.tags {
        article.tags = tags;
    }
    if payload.featured_image.is_some() {
        article.featured_image = payload.featured_image;
    }
    if let Some(published) = payload.published {
        article.published = published;
    }
    if let Some(featured) = payload.featured {
        article.featured = featured;
    }
    article.updated_at = Utc::now();

    let found = if slug_changed {
        articles::update_with_unique_slug(&state.db, &mut article).await?
    } else {
        articles::update_article(&state.db, &article).await?
    };
    if !found {
        return Err(ApiError::NotFound(format!("Article {}", id)));
    }

    info!(id = %id, slug = %article.slug, "Updated article");
    Ok(Json(article))
}

/// DELETE /api/blog/posts/:id
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !articles::delete_article(&state.db, &id).await? {
        return Err(ApiError::NotFound(format!("Article {}", id)));
    }
    info!(id = %id, "Deleted article");
    Ok(Json(serde_json::json!({
        "message": "Article deleted",
        "id": id,
    })))
}

/// GET /api/blog/categories
pub async fn list_categories() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "categories": SAAS_CATEGORIES }))
}

/// POST /api/blog/auto-publish
pub async fn trigger_auto_publish(
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    let article = state.publisher.publish_for(Utc::now()).await?;
    Ok(Json(serde_json::json!({
        "message": "Auto-publish triggered successfully",
        "slug": article.slug,
        "title": article.title,
    })))
}

/// GET /api/blog/stats
pub async fn blog_stats(State(state): State<AppState>) -> ApiResult<Json<BlogStats>> {
    Ok(Json(articles::blog_stats(&state.db).await?))
}

pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/blog", get(list_articles).post(create_article))
        .route("/api/blog/generate", post(generate_article))
        .route("/api/blog/bulk-generate", post(bulk_generate))
        .route("/api/blog/update-content", post(update_content))
        .route("/api/blog/categories", get(list_categories))
        .route("/api/blog/auto-publish", post(trigger_auto_publish))
        .route("/api/blog/stats", get(blog_stats))
        .route("/api/blog/posts/:id", put(update_article).delete(delete_article))
        .route("/api/blog/:slug", get(get_article))
}
