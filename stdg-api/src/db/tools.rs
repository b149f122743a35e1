//! Tool persistence

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use stdg_common::db::{PricingType, Tool};
use stdg_common::time::{from_db, to_db};
use stdg_common::{Error, Result};

use super::{from_json, to_json};

const TOOL_COLUMNS: &str = "id, name, category, description, short_description, pricing_type, pricing_details, \
     starting_price, features, pros, cons, rating, affiliate_link, website_url, review, created_at, updated_at";

/// Filters of `GET /api/tools`
#[derive(Debug, Clone, Default)]
pub struct ToolFilter {
    pub category: Option<String>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    pub pricing_type: Option<PricingType>,
}

fn tool_from_row(row: &SqliteRow) -> Result<Tool> {
    let pricing_type: String = row.get("pricing_type");
    let features: String = row.get("features");
    let pros: String = row.get("pros");
    let cons: String = row.get("cons");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Tool {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        description: row.get("description"),
        short_description: row.get("short_description"),
        pricing_type: pricing_type
            .parse()
            .map_err(|_| Error::Internal(format!("Corrupt pricing_type '{}'", pricing_type)))?,
        pricing_details: row.get("pricing_details"),
        starting_price: row.get("starting_price"),
        features: from_json("features", &features)?,
        pros: from_json("pros", &pros)?,
        cons: from_json("cons", &cons)?,
        rating: row.get("rating"),
        affiliate_link: row.get("affiliate_link"),
        website_url: row.get("website_url"),
        review: row.get("review"),
        created_at: from_db(&created_at)?,
        updated_at: from_db(&updated_at)?,
    })
}

pub async fn insert_tool(pool: &SqlitePool, tool: &Tool) -> Result<()> {
    let sql = format!(
        "INSERT INTO tools ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        TOOL_COLUMNS
    );
    sqlx::query(&sql)
        .bind(&tool.id)
        .bind(&tool.name)
        .bind(&tool.category)
        .bind(&tool.description)
        .bind(&tool.short_description)
        .bind(tool.pricing_type.as_str())
        .bind(&tool.pricing_details)
        .bind(tool.starting_price)
        .bind(to_json(&tool.features)?)
        .bind(to_json(&tool.pros)?)
        .bind(to_json(&tool.cons)?)
        .bind(tool.rating)
        .bind(&tool.affiliate_link)
        .bind(&tool.website_url)
        .bind(&tool.review)
        .bind(to_db(&tool.created_at))
        .bind(to_db(&tool.updated_at))
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get_tool(pool: &SqlitePool, id: &str) -> Result<Option<Tool>> {
    let sql = format!("SELECT {} FROM tools WHERE id = ?", TOOL_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(tool_from_row).transpose()
}

/// Filtered page of tools, best rated first
pub async fn list_tools(pool: &SqlitePool, filter: &ToolFilter, limit: i64, skip: i64) -> Result<Vec<Tool>> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(&s.to_lowercase())));

    let sql = format!(
        "SELECT {} FROM tools \
         WHERE (?1 IS NULL OR category = ?1) \
           AND (?2 IS NULL OR pricing_type = ?2) \
           AND (?3 IS NULL OR lower(name) LIKE ?3 ESCAPE '\\' OR lower(description) LIKE ?3 ESCAPE '\\') \
         ORDER BY rating DESC, name ASC \
         LIMIT ?4 OFFSET ?5",
        TOOL_COLUMNS
    );

    let rows = sqlx::query(&sql)
        .bind(filter.category.as_deref())
        .bind(filter.pricing_type.map(|p| p.as_str()))
        .bind(search)
        .bind(limit)
        .bind(skip)
        .fetch_all(pool)
        .await?;
    rows.iter().map(tool_from_row).collect()
}

pub async fn count_tools(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tools")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
