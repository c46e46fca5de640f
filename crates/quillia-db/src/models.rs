//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.
//! JSON blob columns (stats, usage stats, memory fields) are carried as
//! `serde_json::Value` and parsed into typed structs at the call site.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use quillia_types::{
    CharacterId, CharacterStats, EntryId, StoredUsageStats, SubscriptionPlan, SubscriptionStatus,
    UserId,
};

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub subscription_plan: String,
    pub subscription_status: String,
    pub subscription_id: Option<String>,
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub character_slots: i32,
    pub active_character_id: Option<Uuid>,
    pub credits: i64,
    pub last_daily_recharge: Option<DateTime<Utc>>,
    pub has_purchased_starter_kit: bool,
    /// IANA timezone fixed at signup; all daily boundaries derive from it
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Parse the stored plan, falling back to the free tier on unknown values
    pub fn plan(&self) -> SubscriptionPlan {
        self.subscription_plan
            .parse()
            .unwrap_or(SubscriptionPlan::Free)
    }

    /// Parse the stored status, falling back to free on unknown values
    pub fn status(&self) -> SubscriptionStatus {
        self.subscription_status
            .parse()
            .unwrap_or(SubscriptionStatus::Free)
    }
}

/// Character row from the database
#[derive(Debug, Clone, FromRow)]
pub struct CharacterRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub theme: String,
    pub appearance: Option<String>,
    /// Serialized `CharacterStats`
    pub stats: serde_json::Value,
    pub experience: i64,
    pub level: i64,
    /// Serialized `StoredUsageStats`
    pub usage_stats: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CharacterRow {
    /// Convert to domain CharacterId
    pub fn character_id(&self) -> CharacterId {
        CharacterId(self.id)
    }

    /// Convert to domain UserId
    pub fn owner_id(&self) -> UserId {
        UserId(self.user_id)
    }

    /// Parse the stats blob, tolerating legacy/malformed values
    pub fn parsed_stats(&self) -> CharacterStats {
        serde_json::from_value(self.stats.clone()).unwrap_or_default()
    }

    /// Parse the usage statistics blob, tolerating legacy/malformed values
    pub fn parsed_usage_stats(&self) -> StoredUsageStats {
        serde_json::from_value(self.usage_stats.clone()).unwrap_or_default()
    }
}

/// Journal entry row from the database
///
/// `original_text` and `reimagined_text` hold whatever the encryption
/// collaborator produced; this layer treats them as opaque strings.
#[derive(Debug, Clone, FromRow)]
pub struct EntryRow {
    pub id: Uuid,
    pub character_id: Uuid,
    pub user_id: Uuid,
    pub output_kind: String,
    pub original_text: String,
    pub reimagined_text: Option<String>,
    pub image_url: Option<String>,
    pub exp_gained: i64,
    /// Serialized `EvaluatedChanges`, set once progression ran
    pub stat_changes: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl EntryRow {
    /// Convert to domain EntryId
    pub fn entry_id(&self) -> EntryId {
        EntryId(self.id)
    }
}

/// Daily usage row from the database
///
/// `date` is the UTC-midnight marker of the user's local calendar day,
/// not a wall-clock timestamp.
#[derive(Debug, Clone, FromRow)]
pub struct DailyUsageRow {
    pub user_id: Uuid,
    pub character_id: Uuid,
    pub date: DateTime<Utc>,
    pub chapters: i64,
    pub scenes: i64,
}

/// Character memory row from the database (1:1 with character)
#[derive(Debug, Clone, FromRow)]
pub struct CharacterMemoryRow {
    pub character_id: Uuid,
    /// Serialized `WorldState`
    pub world_state: serde_json::Value,
    pub summary_log: String,
    /// Serialized `Vec<MemoryEntry>`, newest first
    pub recent_entries: serde_json::Value,
    pub last_updated: DateTime<Utc>,
}

/// Stat progression audit row (append-only)
#[derive(Debug, Clone, FromRow)]
pub struct StatProgressionRow {
    pub id: Uuid,
    pub character_id: Uuid,
    pub entry_id: Uuid,
    pub stat_name: String,
    pub old_value: i64,
    pub new_value: i64,
    pub change: i64,
    pub reason: String,
    pub confidence: f64,
    /// Truncated snapshot of the source entry text
    pub entry_text: String,
    pub created_at: DateTime<Utc>,
}

/// Credit purchase audit row (append-only)
#[derive(Debug, Clone, FromRow)]
pub struct CreditPurchaseRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub package_name: String,
    pub ink_vials: i64,
    pub price_cents: i64,
    pub transaction_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
