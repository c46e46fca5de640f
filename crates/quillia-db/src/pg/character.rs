//! PostgreSQL character repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::CharacterRow;
use crate::repo::{CharacterRepository, CreateCharacter};

const CHARACTER_COLUMNS: &str = "id, user_id, name, theme, appearance, stats, experience, level, \
     usage_stats, created_at, updated_at";

/// PostgreSQL character repository
#[derive(Clone)]
pub struct PgCharacterRepository {
    pool: PgPool,
}

impl PgCharacterRepository {
    /// Create a new character repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CharacterRepository for PgCharacterRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<CharacterRow>> {
        let character = sqlx::query_as::<_, CharacterRow>(&format!(
            "SELECT {CHARACTER_COLUMNS} FROM characters WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(character)
    }

    async fn find_by_user(&self, user_id: Uuid) -> DbResult<Vec<CharacterRow>> {
        // Oldest first: creation order is the access-gate tie-break
        let characters = sqlx::query_as::<_, CharacterRow>(&format!(
            "SELECT {CHARACTER_COLUMNS} FROM characters WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(characters)
    }

    async fn create(&self, character: CreateCharacter) -> DbResult<CharacterRow> {
        let row = sqlx::query_as::<_, CharacterRow>(&format!(
            "INSERT INTO characters (id, user_id, name, theme, appearance, stats)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CHARACTER_COLUMNS}"
        ))
        .bind(character.id)
        .bind(character.user_id)
        .bind(&character.name)
        .bind(&character.theme)
        .bind(&character.appearance)
        .bind(&character.stats)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        // Memory and progression rows cascade via foreign keys
        sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_progression(
        &self,
        id: Uuid,
        stats: serde_json::Value,
        experience: i64,
        level: i64,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE characters
            SET stats = $1, experience = $2, level = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&stats)
        .bind(experience)
        .bind(level)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_usage_stats(&self, id: Uuid, usage_stats: serde_json::Value) -> DbResult<()> {
        sqlx::query("UPDATE characters SET usage_stats = $1, updated_at = NOW() WHERE id = $2")
            .bind(&usage_stats)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
