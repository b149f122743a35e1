//! Article persistence
//!
//! `slug` is UNIQUE in the schema. Creation paths either retry with a random
//! suffix ([`insert_with_unique_slug`]) or skip existing slugs
//! ([`insert_if_absent`]); nothing ever overwrites an article through its slug.
//! Slugs that shadow a fixed `/api/blog/` route are never stored as-is.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use stdg_common::db::{AffiliateLink, Article};
use stdg_common::slug::{is_reserved, with_random_suffix};
use stdg_common::time::{from_db, to_db};
use stdg_common::{Error, Result};
use tracing::debug;

use super::{from_json, to_json};

/// Attempts made by [`insert_with_unique_slug`] before giving up
pub const MAX_SLUG_ATTEMPTS: usize = 5;

const ARTICLE_COLUMNS: &str = "id, title, slug, content, excerpt, meta_title, meta_description, keywords, \
     category, tags, author, featured_image, published, featured, view_count, affiliate_links, seo_score, \
     published_at, created_at, updated_at";

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    let keywords: String = row.get("keywords");
    let tags: String = row.get("tags");
    let links: String = row.get("affiliate_links");
    let published_at: String = row.get("published_at");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Article {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        excerpt: row.get("excerpt"),
        meta_title: row.get("meta_title"),
        meta_description: row.get("meta_description"),
        keywords: from_json("keywords", &keywords)?,
        category: row.get("category"),
        tags: from_json("tags", &tags)?,
        author: row.get("author"),
        featured_image: row.get("featured_image"),
        published: row.get("published"),
        featured: row.get("featured"),
        view_count: row.get("view_count"),
        affiliate_links: from_json::<Vec<AffiliateLink>>("affiliate_links", &links)?,
        seo_score: row.get("seo_score"),
        published_at: from_db(&published_at)?,
        created_at: from_db(&created_at)?,
        updated_at: from_db(&updated_at)?,
    })
}

async fn insert(pool: &SqlitePool, article: &Article, or_ignore: bool) -> Result<bool> {
    let sql = format!(
        "INSERT INTO articles ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?){}",
        ARTICLE_COLUMNS,
        if or_ignore {
            " ON CONFLICT(slug) DO NOTHING"
        } else {
            ""
        }
    );

    let result = sqlx::query(&sql)
        .bind(&article.id)
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.content)
        .bind(&article.excerpt)
        .bind(&article.meta_title)
        .bind(&article.meta_description)
        .bind(to_json(&article.keywords)?)
        .bind(&article.category)
        .bind(to_json(&article.tags)?)
        .bind(&article.author)
        .bind(&article.featured_image)
        .bind(article.published)
        .bind(article.featured)
        .bind(article.view_count)
        .bind(to_json(&article.affiliate_links)?)
        .bind(article.seo_score)
        .bind(to_db(&article.published_at))
        .bind(to_db(&article.created_at))
        .bind(to_db(&article.updated_at))
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Insert, replacing the slug with `<base>-<suffix>` while it collides
///
/// Reserved slugs (see [`is_reserved`]) count as collisions.
/// On success `article.slug` holds the stored slug.
pub async fn insert_with_unique_slug(pool: &SqlitePool, article: &mut Article) -> Result<()> {
    let base = article.slug.clone();
    if is_reserved(&base) {
        article.slug = with_random_suffix(&base);
    }

    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        match insert(pool, article, false).await {
            Ok(_) => return Ok(()),
            Err(e) if e.is_unique_violation() => {
                article.slug = with_random_suffix(&base);
                debug!(base = %base, attempt, retry_slug = %article.slug, "Slug taken, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(Error::Internal(format!(
        "Could not find a free slug for '{}' after {} attempts",
        base, MAX_SLUG_ATTEMPTS
    )))
}

/// Insert unless the slug already exists or is reserved; returns whether a
/// row was added
pub async fn insert_if_absent(pool: &SqlitePool, article: &Article) -> Result<bool> {
    if is_reserved(&article.slug) {
        return Ok(false);
    }
    insert(pool, article, true).await
}

pub async fn slug_exists(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM articles WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn get_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Article>> {
    let sql = format!("SELECT {} FROM articles WHERE slug = ?", ARTICLE_COLUMNS);
    let row = sqlx::query(&sql).bind(slug).fetch_optional(pool).await?;
    row.as_ref().map(article_from_row).transpose()
}

pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Article>> {
    let sql = format!("SELECT {} FROM articles WHERE id = ?", ARTICLE_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(article_from_row).transpose()
}

/// Increment the view counter of a published article and return it
///
/// The increment is a single UPDATE; a missing slug or a draft changes nothing.
pub async fn record_view(pool: &SqlitePool, slug: &str) -> Result<Option<Article>> {
    let result = sqlx::query(
        "UPDATE articles SET view_count = view_count + 1 WHERE slug = ? AND published = 1",
    )
    .bind(slug)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    let sql = format!(
        "SELECT {} FROM articles WHERE slug = ? AND published = 1",
        ARTICLE_COLUMNS
    );
    let row = sqlx::query(&sql).bind(slug).fetch_optional(pool).await?;
    row.as_ref().map(article_from_row).transpose()
}

/// Published articles, newest first
pub async fn list_published(
    pool: &SqlitePool,
    category: Option<&str>,
    limit: i64,
    skip: i64,
) -> Result<Vec<Article>> {
    let sql = format!(
        "SELECT {} FROM articles \
         WHERE published = 1 AND (?1 IS NULL OR category = ?1) \
         ORDER BY published_at DESC, created_at DESC \
         LIMIT ?2 OFFSET ?3",
        ARTICLE_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(category)
        .bind(limit)
        .bind(skip)
        .fetch_all(pool)
        .await?;
    rows.iter().map(article_from_row).collect()
}

/// Articles whose content was refreshed longest ago
pub async fn list_stalest(pool: &SqlitePool, count: i64) -> Result<Vec<Article>> {
    let sql = format!(
        "SELECT {} FROM articles ORDER BY updated_at ASC LIMIT ?",
        ARTICLE_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(count).fetch_all(pool).await?;
    rows.iter().map(article_from_row).collect()
}

/// Rewrite every editable column of an existing article (matched by id)
pub async fn update_article(pool: &SqlitePool, article: &Article) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE articles SET
            title = ?, slug = ?, content = ?, excerpt = ?, meta_title = ?, meta_description = ?,
            keywords = ?, category = ?, tags = ?, featured_image = ?, published = ?, featured = ?,
            affiliate_links = ?, seo_score = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&article.title)
    .bind(&article.slug)
    .bind(&article.content)
    .bind(&article.excerpt)
    .bind(&article.meta_title)
    .bind(&article.meta_description)
    .bind(to_json(&article.keywords)?)
    .bind(&article.category)
    .bind(to_json(&article.tags)?)
    .bind(&article.featured_image)
    .bind(article.published)
    .bind(article.featured)
    .bind(to_json(&article.affiliate_links)?)
    .bind(article.seo_score)
    .bind(to_db(&article.updated_at))
    .bind(&article.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Update, retrying with a suffixed slug while the new slug collides
pub async fn update_with_unique_slug(pool: &SqlitePool, article: &mut Article) -> Result<bool> {
    let base = article.slug.clone();
    if is_reserved(&base) {
        article.slug = with_random_suffix(&base);
    }

    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        match update_article(pool, article).await {
            Ok(updated) => return Ok(updated),
            Err(e) if e.is_unique_violation() => {
                article.slug = with_random_suffix(&base);
                debug!(base = %base, attempt, retry_slug = %article.slug, "Slug taken, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(Error::Internal(format!(
        "Could not find a free slug for '{}' after {} attempts",
        base, MAX_SLUG_ATTEMPTS
    )))
}

pub async fn delete_article(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn count_articles(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Aggregates reported by `GET /api/blog/stats`
#[derive(Debug, Clone, serde::Serialize)]
pub struct BlogStats {
    pub total_posts: i64,
    pub total_views: i64,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

pub async fn blog_stats(pool: &SqlitePool) -> Result<BlogStats> {
    let total_posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE published = 1")
        .fetch_one(pool)
        .await?;
    let total_views: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(view_count), 0) FROM articles")
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query(
        "SELECT category, COUNT(*) AS count FROM articles GROUP BY category ORDER BY count DESC, category ASC",
    )
    .fetch_all(pool)
    .await?;

    let categories = rows
        .iter()
        .map(|row| CategoryCount {
            category: row.get("category"),
            count: row.get("count"),
        })
        .collect();

    Ok(BlogStats {
        total_posts,
        total_views,
        categories,
    })
}
