//! Newsletter subscription persistence (unique by email)

use sqlx::{Row, SqlitePool};
use stdg_common::db::NewsletterSubscription;
use stdg_common::time::{from_db, now, to_db};
use stdg_common::Result;

/// Result of a subscribe call
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeOutcome {
    Created,
    AlreadySubscribed,
    Reactivated,
}

pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<NewsletterSubscription>> {
    let row = sqlx::query(
        "SELECT id, email, name, subscribed_at, active FROM newsletter_subscriptions WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let subscribed_at: String = row.get("subscribed_at");
            Ok(Some(NewsletterSubscription {
                id: row.get("id"),
                email: row.get("email"),
                name: row.get("name"),
                subscribed_at: from_db(&subscribed_at)?,
                active: row.get("active"),
            }))
        }
        None => Ok(None),
    }
}

/// Idempotent subscribe keyed by email
pub async fn subscribe(pool: &SqlitePool, email: &str, name: Option<&str>) -> Result<SubscribeOutcome> {
    if let Some(existing) = get_by_email(pool, email).await? {
        if existing.active {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }
        sqlx::query(
            "UPDATE newsletter_subscriptions SET active = 1, subscribed_at = ?, name = COALESCE(?, name) WHERE email = ?",
        )
        .bind(to_db(&now()))
        .bind(name)
        .bind(email)
        .execute(pool)
        .await?;
        return Ok(SubscribeOutcome::Reactivated);
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO newsletter_subscriptions (id, email, name, subscribed_at, active)
        VALUES (?, ?, ?, ?, 1)
        ON CONFLICT(email) DO NOTHING
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(email)
    .bind(name)
    .bind(to_db(&now()))
    .execute(pool)
    .await?;

    // A concurrent request may have inserted the same email in between
    if inserted.rows_affected() == 1 {
        Ok(SubscribeOutcome::Created)
    } else {
        Ok(SubscribeOutcome::AlreadySubscribed)
    }
}

/// Mark inactive; returns false when the email is unknown
pub async fn unsubscribe(pool: &SqlitePool, email: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE newsletter_subscriptions SET active = 0 WHERE email = ?")
        .bind(email)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn count_active(pool: &SqlitePool) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM newsletter_subscriptions WHERE active = 1")
            .fetch_one(pool)
            .await?;
    Ok(count)
}
