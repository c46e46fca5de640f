//! Lifetime usage statistics stored per character

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cumulative usage statistics embedded in the character record
///
/// Counters are monotonic non-decreasing. `longest_streak` only ever
/// increases; `most_active_day`/`most_active_hour` are periodically
/// recomputed from the entry history and may move either way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredUsageStats {
    /// Total entries of any kind
    #[serde(default)]
    pub total_adventures: i64,
    /// Text narratives generated
    #[serde(default)]
    pub stories_created: i64,
    /// Images generated
    #[serde(default)]
    pub scenes_generated: i64,
    /// Longest consecutive-day writing streak ever reached
    #[serde(default)]
    pub longest_streak: i64,
    /// Whitespace-delimited words across all narratives
    #[serde(default)]
    pub total_words_written: i64,
    /// When the first entry was created
    #[serde(default)]
    pub first_adventure_date: Option<DateTime<Utc>>,
    /// When the most recent entry was created
    #[serde(default)]
    pub last_adventure_date: Option<DateTime<Utc>>,
    /// Weekday with the most entries, e.g. "Monday"
    #[serde(default)]
    pub most_active_day: Option<String>,
    /// Local hour (0-23) with the most entries
    #[serde(default)]
    pub most_active_hour: Option<u32>,
    /// When these statistics were last written
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Output of a full streak/pattern recomputation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPatterns {
    /// Consecutive days with entries, ending today
    pub current_streak: i64,
    /// Longest consecutive-day run in the entry history
    pub longest_streak: i64,
    /// Weekday with the most entries
    pub most_active_day: Option<String>,
    /// Local hour (0-23) with the most entries
    pub most_active_hour: Option<u32>,
}
