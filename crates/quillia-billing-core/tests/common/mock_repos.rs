//! Mock repositories for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use quillia_db::{
    CharacterRepository, CharacterRow, CreateCharacter, CreateCreditPurchase, CreateUser,
    CreditPurchaseRepository, CreditPurchaseRow, DailyUsageRepository, DbResult, UserRepository,
    UserRow,
};
use quillia_types::{DailyTotals, OutputKind};

/// In-memory user repository for testing
#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<DashMap<Uuid, UserRow>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test user directly
    pub fn insert_user(&self, user: UserRow) {
        self.by_email.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user);
    }

    /// Create a test user with the given subscription shape
    pub fn test_user(plan: &str, status: &str, credits: i64) -> UserRow {
        let now = Utc::now();
        UserRow {
            id: Uuid::new_v4(),
            email: format!("test-{}@example.com", Uuid::new_v4()),
            subscription_plan: plan.to_string(),
            subscription_status: status.to_string(),
            subscription_id: None,
            subscription_ends_at: None,
            character_slots: 1,
            active_character_id: None,
            credits,
            last_daily_recharge: None,
            has_purchased_starter_kit: false,
            timezone: "UTC".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .by_email
            .get(email)
            .and_then(|id| self.users.get(id.value()).map(|r| r.value().clone())))
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        let now = Utc::now();
        let row = UserRow {
            id: user.id,
            email: user.email.clone(),
            subscription_plan: "free".to_string(),
            subscription_status: "free".to_string(),
            subscription_id: None,
            subscription_ends_at: None,
            character_slots: 1,
            active_character_id: None,
            credits: 0,
            last_daily_recharge: None,
            has_purchased_starter_kit: false,
            timezone: user.timezone,
            created_at: now,
            updated_at: now,
        };
        self.insert_user(row.clone());
        Ok(row)
    }

    async fn list_ids(&self) -> DbResult<Vec<Uuid>> {
        let mut rows: Vec<_> = self
            .users
            .iter()
            .map(|r| (r.created_at, r.id))
            .collect();
        rows.sort();
        Ok(rows.into_iter().map(|(_, id)| id).collect())
    }

    async fn find_expired_canceled(&self, now: DateTime<Utc>) -> DbResult<Vec<UserRow>> {
        Ok(self
            .users
            .iter()
            .filter(|r| {
                r.subscription_status == "canceled"
                    && r.subscription_plan != "free"
                    && r.subscription_ends_at.map(|e| e < now).unwrap_or(false)
            })
            .map(|r| r.value().clone())
            .collect())
    }

    async fn try_deduct_credits(&self, id: Uuid, amount: i64) -> DbResult<Option<i64>> {
        // DashMap's entry lock makes the compare-and-decrement atomic,
        // matching the single-statement SQL semantics
        match self.users.get_mut(&id) {
            Some(mut user) if user.credits >= amount => {
                user.credits -= amount;
                user.updated_at = Utc::now();
                Ok(Some(user.credits))
            }
            Some(_) => Ok(None),
            None => Ok(None),
        }
    }

    async fn add_credits(&self, id: Uuid, amount: i64) -> DbResult<i64> {
        let mut user = self.users.get_mut(&id).ok_or(quillia_db::DbError::NotFound)?;
        user.credits += amount;
        user.updated_at = Utc::now();
        Ok(user.credits)
    }

    async fn set_last_daily_recharge(&self, id: Uuid, at: DateTime<Utc>) -> DbResult<()> {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.last_daily_recharge = Some(at);
        }
        Ok(())
    }

    async fn set_character_slots(&self, id: Uuid, slots: i32) -> DbResult<()> {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.character_slots = slots;
        }
        Ok(())
    }

    async fn increment_character_slots(&self, id: Uuid) -> DbResult<i32> {
        let mut user = self.users.get_mut(&id).ok_or(quillia_db::DbError::NotFound)?;
        user.character_slots += 1;
        Ok(user.character_slots)
    }

    async fn set_active_character(&self, id: Uuid, character_id: Option<Uuid>) -> DbResult<()> {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.active_character_id = character_id;
        }
        Ok(())
    }

    async fn mark_starter_kit_purchased(&self, id: Uuid) -> DbResult<()> {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.has_purchased_starter_kit = true;
        }
        Ok(())
    }

    async fn downgrade_to_free(&self, id: Uuid) -> DbResult<()> {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.subscription_plan = "free".to_string();
            user.subscription_status = "free".to_string();
            user.subscription_id = None;
            user.subscription_ends_at = None;
            user.character_slots = 1;
        }
        Ok(())
    }
}

/// In-memory character repository for testing
#[derive(Default, Clone)]
pub struct MockCharacterRepository {
    characters: Arc<DashMap<Uuid, CharacterRow>>,
}

impl MockCharacterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test character directly
    pub fn insert_character(&self, character: CharacterRow) {
        self.characters.insert(character.id, character);
    }

    /// Create a test character owned by a user, created at a given time
    pub fn test_character(user_id: Uuid, name: &str, created_at: DateTime<Utc>) -> CharacterRow {
        CharacterRow {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            theme: "fantasy".to_string(),
            appearance: None,
            stats: serde_json::json!({}),
            experience: 0,
            level: 1,
            usage_stats: serde_json::json!({}),
            created_at,
            updated_at: created_at,
        }
    }
}

#[async_trait]
impl CharacterRepository for MockCharacterRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<CharacterRow>> {
        Ok(self.characters.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> DbResult<Vec<CharacterRow>> {
        let mut owned: Vec<_> = self
            .characters
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        owned.sort_by_key(|c| c.created_at);
        Ok(owned)
    }

    async fn create(&self, character: CreateCharacter) -> DbResult<CharacterRow> {
        let now = Utc::now();
        let row = CharacterRow {
            id: character.id,
            user_id: character.user_id,
            name: character.name,
            theme: character.theme,
            appearance: character.appearance,
            stats: character.stats,
            experience: 0,
            level: 1,
            usage_stats: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        };
        self.characters.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        self.characters.remove(&id);
        Ok(())
    }

    async fn update_progression(
        &self,
        id: Uuid,
        stats: serde_json::Value,
        experience: i64,
        level: i64,
    ) -> DbResult<()> {
        if let Some(mut c) = self.characters.get_mut(&id) {
            c.stats = stats;
            c.experience = experience;
            c.level = level;
            c.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_usage_stats(&self, id: Uuid, usage_stats: serde_json::Value) -> DbResult<()> {
        if let Some(mut c) = self.characters.get_mut(&id) {
            c.usage_stats = usage_stats;
            c.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// In-memory daily usage repository for testing
#[derive(Default, Clone)]
pub struct MockDailyUsageRepository {
    rows: Arc<DashMap<(Uuid, Uuid, DateTime<Utc>), (i64, i64)>>,
}

impl MockDailyUsageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct (user, character, date) rows
    #[allow(dead_code)]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[async_trait]
impl DailyUsageRepository for MockDailyUsageRepository {
    async fn increment(
        &self,
        user_id: Uuid,
        character_id: Uuid,
        date: DateTime<Utc>,
        kind: OutputKind,
    ) -> DbResult<()> {
        let (chapters, scenes) = match kind {
            OutputKind::Text => (1, 0),
            OutputKind::Image => (0, 1),
        };
        // entry() holds the shard lock across the modify, mirroring the
        // ON CONFLICT upsert-increment
        self.rows
            .entry((user_id, character_id, date))
            .and_modify(|(c, s)| {
                *c += chapters;
                *s += scenes;
            })
            .or_insert((chapters, scenes));
        Ok(())
    }

    async fn totals_for_user(&self, user_id: Uuid, date: DateTime<Utc>) -> DbResult<DailyTotals> {
        let mut totals = DailyTotals::default();
        for r in self.rows.iter() {
            let (uid, _, d) = *r.key();
            if uid == user_id && d == date {
                totals.chapters += r.value().0;
                totals.scenes += r.value().1;
            }
        }
        Ok(totals)
    }

    async fn totals_for_character(
        &self,
        user_id: Uuid,
        character_id: Uuid,
        date: DateTime<Utc>,
    ) -> DbResult<DailyTotals> {
        Ok(self
            .rows
            .get(&(user_id, character_id, date))
            .map(|r| DailyTotals {
                chapters: r.value().0,
                scenes: r.value().1,
            })
            .unwrap_or_default())
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let stale: Vec<_> = self
            .rows
            .iter()
            .filter(|r| r.key().2 < cutoff)
            .map(|r| *r.key())
            .collect();
        let count = stale.len() as u64;
        for key in stale {
            self.rows.remove(&key);
        }
        Ok(count)
    }
}

/// In-memory credit purchase repository for testing
#[derive(Default, Clone)]
pub struct MockCreditPurchaseRepository {
    purchases: Arc<DashMap<Uuid, CreditPurchaseRow>>,
}

impl MockCreditPurchaseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded purchases, newest first
    pub fn all(&self) -> Vec<CreditPurchaseRow> {
        let mut rows: Vec<_> = self.purchases.iter().map(|r| r.value().clone()).collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[async_trait]
impl CreditPurchaseRepository for MockCreditPurchaseRepository {
    async fn record(&self, purchase: CreateCreditPurchase) -> DbResult<()> {
        let row = CreditPurchaseRow {
            id: purchase.id,
            user_id: purchase.user_id,
            package_name: purchase.package_name,
            ink_vials: purchase.ink_vials,
            price_cents: purchase.price_cents,
            transaction_id: purchase.transaction_id,
            metadata: purchase.metadata,
            created_at: Utc::now(),
        };
        self.purchases.insert(row.id, row);
        Ok(())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> DbResult<Option<CreditPurchaseRow>> {
        Ok(self
            .purchases
            .iter()
            .find(|r| r.transaction_id.as_deref() == Some(transaction_id))
            .map(|r| r.value().clone()))
    }

    async fn find_by_user(&self, user_id: Uuid) -> DbResult<Vec<CreditPurchaseRow>> {
        let mut rows: Vec<_> = self
            .purchases
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
