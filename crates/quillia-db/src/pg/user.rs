//! PostgreSQL user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::UserRow;
use crate::repo::{CreateUser, UserRepository};

const USER_COLUMNS: &str = "id, email, subscription_plan, subscription_status, subscription_id, \
     subscription_ends_at, character_slots, active_character_id, credits, \
     last_daily_recharge, has_purchased_starter_kit, timezone, created_at, updated_at";

/// PostgreSQL user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (id, email, timezone)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.timezone)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_ids(&self) -> DbResult<Vec<Uuid>> {
        let ids: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn find_expired_canceled(&self, now: DateTime<Utc>) -> DbResult<Vec<UserRow>> {
        let users = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS}
             FROM users
             WHERE subscription_status = 'canceled'
               AND subscription_plan <> 'free'
               AND subscription_ends_at IS NOT NULL
               AND subscription_ends_at < $1"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn try_deduct_credits(&self, id: Uuid, amount: i64) -> DbResult<Option<i64>> {
        // Compare-and-decrement in one statement so concurrent callers
        // cannot jointly overdraw a stale balance
        let result: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET credits = credits - $2, updated_at = NOW()
            WHERE id = $1 AND credits >= $2
            RETURNING credits
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result.map(|(credits,)| credits))
    }

    async fn add_credits(&self, id: Uuid, amount: i64) -> DbResult<i64> {
        let result: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET credits = credits + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING credits
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|(credits,)| credits).ok_or(DbError::NotFound)
    }

    async fn set_last_daily_recharge(&self, id: Uuid, at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE users SET last_daily_recharge = $1, updated_at = NOW() WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_character_slots(&self, id: Uuid, slots: i32) -> DbResult<()> {
        sqlx::query("UPDATE users SET character_slots = $1, updated_at = NOW() WHERE id = $2")
            .bind(slots)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn increment_character_slots(&self, id: Uuid) -> DbResult<i32> {
        let result: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET character_slots = character_slots + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING character_slots
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|(slots,)| slots).ok_or(DbError::NotFound)
    }

    async fn set_active_character(&self, id: Uuid, character_id: Option<Uuid>) -> DbResult<()> {
        sqlx::query("UPDATE users SET active_character_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(character_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn mark_starter_kit_purchased(&self, id: Uuid) -> DbResult<()> {
        sqlx::query(
            "UPDATE users SET has_purchased_starter_kit = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn downgrade_to_free(&self, id: Uuid) -> DbResult<()> {
        // Deliberately leaves active_character_id alone: the previously
        // chosen character remains the single accessible one
        sqlx::query(
            r#"
            UPDATE users
            SET subscription_plan = 'free',
                subscription_status = 'free',
                subscription_id = NULL,
                subscription_ends_at = NULL,
                character_slots = 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
