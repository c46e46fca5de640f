//! PostgreSQL character memory repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::CharacterMemoryRow;
use crate::repo::{CharacterMemoryRepository, UpsertCharacterMemory};

/// PostgreSQL character memory repository
#[derive(Clone)]
pub struct PgCharacterMemoryRepository {
    pool: PgPool,
}

impl PgCharacterMemoryRepository {
    /// Create a new character memory repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CharacterMemoryRepository for PgCharacterMemoryRepository {
    async fn find_by_character(&self, character_id: Uuid) -> DbResult<Option<CharacterMemoryRow>> {
        let memory = sqlx::query_as::<_, CharacterMemoryRow>(
            r#"
            SELECT character_id, world_state, summary_log, recent_entries, last_updated
            FROM character_memory
            WHERE character_id = $1
            "#,
        )
        .bind(character_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(memory)
    }

    async fn upsert(&self, memory: UpsertCharacterMemory) -> DbResult<()> {
        // All fields replaced together; row-level locking serializes
        // concurrent writers so no field-level interleaving can occur
        sqlx::query(
            r#"
            INSERT INTO character_memory
                (character_id, world_state, summary_log, recent_entries, last_updated)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (character_id)
            DO UPDATE SET world_state = EXCLUDED.world_state,
                          summary_log = EXCLUDED.summary_log,
                          recent_entries = EXCLUDED.recent_entries,
                          last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(memory.character_id)
        .bind(&memory.world_state)
        .bind(&memory.summary_log)
        .bind(&memory.recent_entries)
        .bind(memory.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
