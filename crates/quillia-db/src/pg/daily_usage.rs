//! PostgreSQL daily usage repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use quillia_types::{DailyTotals, OutputKind};

use crate::error::DbResult;
use crate::repo::DailyUsageRepository;

/// PostgreSQL daily usage repository
#[derive(Clone)]
pub struct PgDailyUsageRepository {
    pool: PgPool,
}

impl PgDailyUsageRepository {
    /// Create a new daily usage repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DailyUsageRepository for PgDailyUsageRepository {
    async fn increment(
        &self,
        user_id: Uuid,
        character_id: Uuid,
        date: DateTime<Utc>,
        kind: OutputKind,
    ) -> DbResult<()> {
        let (chapters, scenes) = match kind {
            OutputKind::Text => (1i64, 0i64),
            OutputKind::Image => (0i64, 1i64),
        };

        sqlx::query(
            r#"
            INSERT INTO daily_usage (user_id, character_id, date, chapters, scenes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, character_id, date)
            DO UPDATE SET chapters = daily_usage.chapters + EXCLUDED.chapters,
                          scenes = daily_usage.scenes + EXCLUDED.scenes
            "#,
        )
        .bind(user_id)
        .bind(character_id)
        .bind(date)
        .bind(chapters)
        .bind(scenes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn totals_for_user(&self, user_id: Uuid, date: DateTime<Utc>) -> DbResult<DailyTotals> {
        let (chapters, scenes): (Option<i64>, Option<i64>) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(chapters), 0), COALESCE(SUM(scenes), 0)
            FROM daily_usage
            WHERE user_id = $1 AND date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailyTotals {
            chapters: chapters.unwrap_or(0),
            scenes: scenes.unwrap_or(0),
        })
    }

    async fn totals_for_character(
        &self,
        user_id: Uuid,
        character_id: Uuid,
        date: DateTime<Utc>,
    ) -> DbResult<DailyTotals> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT chapters, scenes
            FROM daily_usage
            WHERE user_id = $1 AND character_id = $2 AND date = $3
            "#,
        )
        .bind(user_id)
        .bind(character_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|(chapters, scenes)| DailyTotals { chapters, scenes })
            .unwrap_or_default())
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM daily_usage WHERE date < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
