//! Daily auto-publish loop
//!
//! Wakes every `check_interval_secs`, and when the UTC wall clock shows the
//! configured hour and minute publishes one article for the topic of the day.
//! A per-process guard keeps it to one run per calendar day; the guard is not
//! persisted, so a restart inside the trigger minute can publish again (the
//! stored article then gets a suffixed slug rather than replacing the first).

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use stdg_common::config::AutoPublishConfig;
use stdg_common::db::Article;
use stdg_common::Result;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::content::topics::daily_topic;
use crate::content::{ContentPipeline, GenerationRequest};
use crate::db::articles;

pub struct AutoPublisher {
    db: SqlitePool,
    pipeline: Arc<ContentPipeline>,
    schedule: AutoPublishConfig,
    last_run: Mutex<Option<NaiveDate>>,
}

/// True when `now` is inside the trigger minute and no run happened today
pub fn should_fire(now: DateTime<Utc>, hour: u32, minute: u32, last_run: Option<NaiveDate>) -> bool {
    now.hour() == hour && now.minute() == minute && last_run != Some(now.date_naive())
}

impl AutoPublisher {
    pub fn new(db: SqlitePool, pipeline: Arc<ContentPipeline>, schedule: AutoPublishConfig) -> Self {
        Self {
            db,
            pipeline,
            schedule,
            last_run: Mutex::new(None),
        }
    }

    pub fn schedule(&self) -> &AutoPublishConfig {
        &self.schedule
    }

    /// Generate and store the article for `now`'s topic
    ///
    /// Used by the scheduled loop and by the manual trigger endpoint.
    pub async fn publish_for(&self, now: DateTime<Utc>) -> Result<Article> {
        let topic = daily_topic(now.day());
        let request = GenerationRequest::for_topic(topic);

        let content = self.pipeline.generate(&request).await;
        let source = content.source;
        let mut article = content.into_article(&request);
        articles::insert_with_unique_slug(&self.db, &mut article).await?;

        info!(
            topic = %topic,
            slug = %article.slug,
            source = ?source,
            "Auto-published article"
        );
        Ok(article)
    }

    /// One scheduler check; returns the article when a run happened
    pub async fn tick(&self, now: DateTime<Utc>) -> Option<Article> {
        let mut last_run = self.last_run.lock().await;
        if !should_fire(now, self.schedule.hour, self.schedule.minute, *last_run) {
            return None;
        }

        // Mark the day before running so a failure is not retried every tick
        *last_run = Some(now.date_naive());
        drop(last_run);

        match self.publish_for(now).await {
            Ok(article) => Some(article),
            Err(e) => {
                error!(error = %e, "Scheduled auto-publish failed");
                None
            }
        }
    }

    /// Run until the task is dropped; never returns
    pub async fn run_forever(self: Arc<Self>) {
        let period = Duration::from_secs(self.schedule.check_interval_secs);
        info!(
            hour = self.schedule.hour,
            minute = self.schedule.minute,
            check_interval_secs = self.schedule.check_interval_secs,
            "Auto-publish loop started"
        );

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.tick(Utc::now()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::AffiliateCatalog;
    use chrono::TimeZone;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        stdg_common::db::create_schema(&pool).await.unwrap();
        pool
    }

    async fn publisher() -> AutoPublisher {
        let catalog = Arc::new(AffiliateCatalog::builtin().unwrap());
        AutoPublisher::new(
            test_pool().await,
            Arc::new(ContentPipeline::template_only(catalog)),
            AutoPublishConfig::default(),
        )
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 30).unwrap()
    }

    #[test]
    fn test_should_fire_only_in_trigger_minute() {
        assert!(should_fire(at(1, 9, 0), 9, 0, None));
        assert!(!should_fire(at(1, 9, 1), 9, 0, None));
        assert!(!should_fire(at(1, 8, 0), 9, 0, None));
    }

    #[test]
    fn test_should_fire_once_per_day() {
        let today = at(1, 9, 0).date_naive();
        assert!(!should_fire(at(1, 9, 0), 9, 0, Some(today)));
        assert!(should_fire(at(2, 9, 0), 9, 0, Some(today)));
    }

    #[tokio::test]
    async fn test_publish_uses_daily_topic() {
        let publisher = publisher().await;
        let article = publisher.publish_for(at(1, 9, 0)).await.unwrap();
        assert_eq!(article.title, daily_topic(1));
        assert_eq!(article.category, "Project Management");
        assert_eq!(article.tags.len(), 5);
    }

    #[tokio::test]
    async fn test_tick_runs_once_per_day() {
        let publisher = publisher().await;
        assert!(publisher.tick(at(1, 8, 59)).await.is_none());
        assert!(publisher.tick(at(1, 9, 0)).await.is_some());
        assert!(publisher.tick(at(1, 9, 0)).await.is_none());
        assert_eq!(articles::count_articles(&publisher.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repeat_publish_never_overwrites() {
        let publisher = publisher().await;
        let first = publisher.publish_for(at(1, 9, 0)).await.unwrap();
        let second = publisher.publish_for(at(1, 9, 0)).await.unwrap();
        assert_ne!(first.slug, second.slug);
        assert!(second.slug.starts_with(&first.slug));
        assert_eq!(articles::count_articles(&publisher.db).await.unwrap(), 2);
    }
}
