//! Quillia Types - Shared domain types
//!
//! Pure domain types used across the Quillia core: identifiers,
//! subscription plans, credit costs, daily limits, character stats,
//! character memory, and usage statistics. No I/O lives here.

pub mod character;
pub mod credits;
pub mod entry;
pub mod memory;
pub mod progression;
pub mod stats;
pub mod subscription;
pub mod usage;
pub mod user;

pub use character::{CharacterId, CharacterStats, StatDefinition, StatValue, Theme, STAT_MAX, STAT_MIN};
pub use credits::{
    AffordabilityCheck, DeductionOutcome, OutputKind, RechargeOutcome, DAILY_RECHARGE_VIALS,
    STARTER_KIT_WINDOW_DAYS,
};
pub use entry::EntryId;
pub use memory::{
    CharacterMemory, MemoryEntry, WorldState, MAX_RECENT_ENTRIES, SUMMARY_KEEP_VERBATIM,
    SUMMARY_LOG_MAX_CHARS,
};
pub use progression::{
    exp_gained_for_entry, exp_required_for_level_up, level_for_experience, EvaluatedChanges,
    StatChange, BASE_ENTRY_EXP, EXP_PER_POSITIVE_POINT, STAT_CHANGE_MAX, STAT_CHANGE_MIN,
};
pub use stats::{ActivityPatterns, StoredUsageStats};
pub use subscription::{SubscriptionPlan, SubscriptionStatus};
pub use usage::{DailyLimits, DailyTotals, LimitCheck, LimitMode};
pub use user::UserId;
