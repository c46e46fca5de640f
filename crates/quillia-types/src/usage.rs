//! Daily usage totals and tiered quota tables

use serde::{Deserialize, Serialize};

use crate::credits::OutputKind;

/// Chapter/scene counts for one local calendar day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotals {
    /// Text narratives generated
    pub chapters: i64,
    /// Images generated
    pub scenes: i64,
}

impl DailyTotals {
    /// Count for the quota the given kind consumes
    pub const fn count_for(&self, kind: OutputKind) -> i64 {
        match kind {
            OutputKind::Text => self.chapters,
            OutputKind::Image => self.scenes,
        }
    }
}

/// Which pool daily quotas draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitMode {
    /// One pool per user across all their characters
    Shared,
    /// Premium users get a separate pool per character; free users keep
    /// the shared pool
    PerCharacter,
}

/// Daily generation limits for one quota pool
///
/// # Limit Configuration
///
/// | Regime | Tier | Chapters | Scenes | Scope |
/// |--------|------|----------|--------|-------|
/// | Shared | Premium | 15 | 5 | user |
/// | Shared | Free | 5 | 1 | user |
/// | Per-character | Premium | 10 | 1 | character |
/// | Per-character | Free | 5 | 1 | user |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLimits {
    /// Maximum chapters per day in this pool
    pub chapters: i64,
    /// Maximum scenes per day in this pool
    pub scenes: i64,
}

impl DailyLimits {
    /// Get the limits that apply to a user under the given regime
    ///
    /// Free users never get per-character multiplication: they only ever
    /// have one accessible character, so their pool stays user-scoped.
    pub const fn for_tier(premium: bool, mode: LimitMode) -> Self {
        match (premium, mode) {
            (true, LimitMode::Shared) => Self {
                chapters: 15,
                scenes: 5,
            },
            (true, LimitMode::PerCharacter) => Self {
                chapters: 10,
                scenes: 1,
            },
            (false, _) => Self {
                chapters: 5,
                scenes: 1,
            },
        }
    }

    /// Limit for the quota the given kind consumes
    pub const fn limit_for(&self, kind: OutputKind) -> i64 {
        match kind {
            OutputKind::Text => self.chapters,
            OutputKind::Image => self.scenes,
        }
    }

    /// Check whether the limit for a kind has been reached
    pub const fn reached(&self, usage: &DailyTotals, kind: OutputKind) -> bool {
        usage.count_for(kind) >= self.limit_for(kind)
    }
}

/// Result of a daily quota check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitCheck {
    /// Whether the generation may proceed
    pub allowed: bool,
    /// Denial reason, if not allowed
    pub reason: Option<String>,
    /// Usage in the applicable pool for the current local day
    pub usage: DailyTotals,
    /// Limits of the applicable pool
    pub limit: DailyLimits,
}
