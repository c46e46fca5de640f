//! PostgreSQL stat progression repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::StatProgressionRow;
use crate::repo::{CreateStatProgression, StatProgressionRepository};

/// PostgreSQL stat progression repository
#[derive(Clone)]
pub struct PgStatProgressionRepository {
    pool: PgPool,
}

impl PgStatProgressionRepository {
    /// Create a new stat progression repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatProgressionRepository for PgStatProgressionRepository {
    async fn append(&self, progression: CreateStatProgression) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stat_progressions
                (id, character_id, entry_id, stat_name, old_value, new_value,
                 change, reason, confidence, entry_text)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(progression.id)
        .bind(progression.character_id)
        .bind(progression.entry_id)
        .bind(&progression.stat_name)
        .bind(progression.old_value)
        .bind(progression.new_value)
        .bind(progression.change)
        .bind(&progression.reason)
        .bind(progression.confidence)
        .bind(&progression.entry_text)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_character(&self, character_id: Uuid) -> DbResult<Vec<StatProgressionRow>> {
        let rows = sqlx::query_as::<_, StatProgressionRow>(
            r#"
            SELECT id, character_id, entry_id, stat_name, old_value, new_value,
                   change, reason, confidence, entry_text, created_at
            FROM stat_progressions
            WHERE character_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(character_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
