//! PostgreSQL journal entry repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::EntryRow;
use crate::repo::{CreateEntry, EntryRepository};

const ENTRY_COLUMNS: &str = "id, character_id, user_id, output_kind, original_text, \
     reimagined_text, image_url, exp_gained, stat_changes, created_at";

/// PostgreSQL journal entry repository
#[derive(Clone)]
pub struct PgEntryRepository {
    pool: PgPool,
}

impl PgEntryRepository {
    /// Create a new entry repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryRepository for PgEntryRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<EntryRow>> {
        let entry = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn create(&self, entry: CreateEntry) -> DbResult<EntryRow> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "INSERT INTO entries
                 (id, character_id, user_id, output_kind, original_text, reimagined_text, image_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(entry.id)
        .bind(entry.character_id)
        .bind(entry.user_id)
        .bind(&entry.output_kind)
        .bind(&entry.original_text)
        .bind(&entry.reimagined_text)
        .bind(&entry.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_character(&self, character_id: Uuid) -> DbResult<Vec<EntryRow>> {
        let entries = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE character_id = $1 ORDER BY created_at DESC"
        ))
        .bind(character_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn set_progression(
        &self,
        id: Uuid,
        exp_gained: i64,
        stat_changes: serde_json::Value,
    ) -> DbResult<()> {
        sqlx::query("UPDATE entries SET exp_gained = $1, stat_changes = $2 WHERE id = $3")
            .bind(exp_gained)
            .bind(&stat_changes)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
