//! Repository traits
//!
//! Define async repository interfaces for database operations. The core
//! crates are generic over these traits so business logic tests run
//! against in-memory implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use quillia_types::{DailyTotals, OutputKind};

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Create a new user
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// List every user ID (administrative sweeps)
    async fn list_ids(&self) -> DbResult<Vec<Uuid>>;

    /// Users on a paid plan whose cancellation grace period has elapsed
    async fn find_expired_canceled(&self, now: DateTime<Utc>) -> DbResult<Vec<UserRow>>;

    /// Atomically deduct credits if the balance covers the amount
    ///
    /// Returns the new balance, or `None` when the balance was
    /// insufficient at the time of the write. The comparison and the
    /// decrement happen in one statement; two concurrent callers can
    /// never jointly overdraw.
    async fn try_deduct_credits(&self, id: Uuid, amount: i64) -> DbResult<Option<i64>>;

    /// Atomically add credits, returning the new balance
    async fn add_credits(&self, id: Uuid, amount: i64) -> DbResult<i64>;

    /// Stamp the last daily recharge time
    async fn set_last_daily_recharge(&self, id: Uuid, at: DateTime<Utc>) -> DbResult<()>;

    /// Set the character slot capacity
    async fn set_character_slots(&self, id: Uuid, slots: i32) -> DbResult<()>;

    /// Atomically increment character slots, returning the new capacity
    async fn increment_character_slots(&self, id: Uuid) -> DbResult<i32>;

    /// Set (or clear) the active character
    async fn set_active_character(&self, id: Uuid, character_id: Option<Uuid>) -> DbResult<()>;

    /// Mark the starter kit as purchased
    async fn mark_starter_kit_purchased(&self, id: Uuid) -> DbResult<()>;

    /// Downgrade a user to the free shape: free plan/status, cleared
    /// subscription id and expiry, one character slot. Leaves
    /// `active_character_id` untouched.
    async fn downgrade_to_free(&self, id: Uuid) -> DbResult<()>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub email: String,
    pub timezone: String,
}

/// Character repository trait
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Find a character by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<CharacterRow>>;

    /// All characters owned by a user, oldest created first
    async fn find_by_user(&self, user_id: Uuid) -> DbResult<Vec<CharacterRow>>;

    /// Create a new character
    async fn create(&self, character: CreateCharacter) -> DbResult<CharacterRow>;

    /// Delete a character (cascades memory and progression rows)
    async fn delete(&self, id: Uuid) -> DbResult<()>;

    /// Persist stats, experience, and level together
    async fn update_progression(
        &self,
        id: Uuid,
        stats: serde_json::Value,
        experience: i64,
        level: i64,
    ) -> DbResult<()>;

    /// Persist the usage statistics blob
    async fn update_usage_stats(&self, id: Uuid, usage_stats: serde_json::Value) -> DbResult<()>;
}

/// Create character input
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub theme: String,
    pub appearance: Option<String>,
    pub stats: serde_json::Value,
}

/// Journal entry repository trait
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Find an entry by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<EntryRow>>;

    /// Create a new entry
    async fn create(&self, entry: CreateEntry) -> DbResult<EntryRow>;

    /// All entries for a character, newest first
    async fn find_by_character(&self, character_id: Uuid) -> DbResult<Vec<EntryRow>>;

    /// Store progression results on the originating entry
    async fn set_progression(
        &self,
        id: Uuid,
        exp_gained: i64,
        stat_changes: serde_json::Value,
    ) -> DbResult<()>;
}

/// Create entry input
#[derive(Debug, Clone)]
pub struct CreateEntry {
    pub id: Uuid,
    pub character_id: Uuid,
    pub user_id: Uuid,
    pub output_kind: String,
    pub original_text: String,
    pub reimagined_text: Option<String>,
    pub image_url: Option<String>,
}

/// Daily usage repository trait
#[async_trait]
pub trait DailyUsageRepository: Send + Sync {
    /// Upsert-increment the counter for one generation
    ///
    /// Creates the `(user, character, date)` row with count 1 if absent,
    /// otherwise increments in place. The operation is a single atomic
    /// write; concurrent increments must not lose updates.
    async fn increment(
        &self,
        user_id: Uuid,
        character_id: Uuid,
        date: DateTime<Utc>,
        kind: OutputKind,
    ) -> DbResult<()>;

    /// Totals across all of a user's characters for one local day
    async fn totals_for_user(&self, user_id: Uuid, date: DateTime<Utc>) -> DbResult<DailyTotals>;

    /// Totals for one character for one local day
    async fn totals_for_character(
        &self,
        user_id: Uuid,
        character_id: Uuid,
        date: DateTime<Utc>,
    ) -> DbResult<DailyTotals>;

    /// Delete rows with a date key before the cutoff, returning the count
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64>;
}

/// Character memory repository trait
#[async_trait]
pub trait CharacterMemoryRepository: Send + Sync {
    /// Find the memory record for a character
    async fn find_by_character(&self, character_id: Uuid) -> DbResult<Option<CharacterMemoryRow>>;

    /// Insert or fully replace the memory record
    ///
    /// All three fields are written together; the storage layer
    /// serializes concurrent writers on the row.
    async fn upsert(&self, memory: UpsertCharacterMemory) -> DbResult<()>;
}

/// Upsert character memory input
#[derive(Debug, Clone)]
pub struct UpsertCharacterMemory {
    pub character_id: Uuid,
    pub world_state: serde_json::Value,
    pub summary_log: String,
    pub recent_entries: serde_json::Value,
    pub last_updated: DateTime<Utc>,
}

/// Stat progression repository trait (append-only)
#[async_trait]
pub trait StatProgressionRepository: Send + Sync {
    /// Append one progression audit row
    async fn append(&self, progression: CreateStatProgression) -> DbResult<()>;

    /// All progression rows for a character, newest first
    async fn find_by_character(&self, character_id: Uuid) -> DbResult<Vec<StatProgressionRow>>;
}

/// Create stat progression input
#[derive(Debug, Clone)]
pub struct CreateStatProgression {
    pub id: Uuid,
    pub character_id: Uuid,
    pub entry_id: Uuid,
    pub stat_name: String,
    pub old_value: i64,
    pub new_value: i64,
    pub change: i64,
    pub reason: String,
    pub confidence: f64,
    pub entry_text: String,
}

/// Credit purchase repository trait (append-only)
#[async_trait]
pub trait CreditPurchaseRepository: Send + Sync {
    /// Record one purchase audit row
    async fn record(&self, purchase: CreateCreditPurchase) -> DbResult<()>;

    /// Find a purchase by payment transaction ID
    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> DbResult<Option<CreditPurchaseRow>>;

    /// All purchases for a user, newest first
    async fn find_by_user(&self, user_id: Uuid) -> DbResult<Vec<CreditPurchaseRow>>;
}

/// Create credit purchase input
#[derive(Debug, Clone)]
pub struct CreateCreditPurchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub package_name: String,
    pub ink_vials: i64,
    pub price_cents: i64,
    pub transaction_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}
