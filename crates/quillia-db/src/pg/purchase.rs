//! PostgreSQL credit purchase repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::CreditPurchaseRow;
use crate::repo::{CreateCreditPurchase, CreditPurchaseRepository};

const PURCHASE_COLUMNS: &str = "id, user_id, package_name, ink_vials, price_cents, \
     transaction_id, metadata, created_at";

/// PostgreSQL credit purchase repository
#[derive(Clone)]
pub struct PgCreditPurchaseRepository {
    pool: PgPool,
}

impl PgCreditPurchaseRepository {
    /// Create a new credit purchase repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CreditPurchaseRepository for PgCreditPurchaseRepository {
    async fn record(&self, purchase: CreateCreditPurchase) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO credit_purchases
                (id, user_id, package_name, ink_vials, price_cents, transaction_id, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(purchase.id)
        .bind(purchase.user_id)
        .bind(&purchase.package_name)
        .bind(purchase.ink_vials)
        .bind(purchase.price_cents)
        .bind(&purchase.transaction_id)
        .bind(&purchase.metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> DbResult<Option<CreditPurchaseRow>> {
        let purchase = sqlx::query_as::<_, CreditPurchaseRow>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM credit_purchases WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    async fn find_by_user(&self, user_id: Uuid) -> DbResult<Vec<CreditPurchaseRow>> {
        let purchases = sqlx::query_as::<_, CreditPurchaseRow>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM credit_purchases
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }
}
