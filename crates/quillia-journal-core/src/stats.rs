//! Usage statistics aggregation
//!
//! Lifetime counters are bumped incrementally on every entry; streaks
//! and activity patterns are recomputed in full from the entry history,
//! because their correctness depends on "today", which drifts
//! independently of any write.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use tracing::{instrument, warn};

use quillia_db::CharacterRepository;
use quillia_types::{ActivityPatterns, CharacterId, OutputKind, StoredUsageStats};

use crate::cipher::TextCipher;
use crate::JournalError;

/// Weekdays in tie-break order: earliest wins
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Usage statistics tracker over the character repository
#[derive(Clone)]
pub struct UsageStatsTracker<C: CharacterRepository> {
    characters: Arc<C>,
    cipher: Arc<dyn TextCipher>,
}

impl<C: CharacterRepository> UsageStatsTracker<C> {
    /// Create a new usage statistics tracker
    pub fn new(characters: Arc<C>, cipher: Arc<dyn TextCipher>) -> Self {
        Self { characters, cipher }
    }

    /// Incrementally update lifetime counters for a new entry
    ///
    /// `narrative_text` is the stored (possibly encrypted) narrative; a
    /// decryption failure falls back to counting words on the raw
    /// string rather than failing the update.
    #[instrument(skip(self, narrative_text), fields(character_id = %character_id, kind = %kind))]
    pub async fn record_entry_created(
        &self,
        character_id: CharacterId,
        kind: OutputKind,
        narrative_text: &str,
        now: DateTime<Utc>,
    ) -> Result<StoredUsageStats, JournalError> {
        let character = self
            .characters
            .find_by_id(character_id.0)
            .await?
            .ok_or(JournalError::CharacterNotFound)?;

        let mut stats = character.parsed_usage_stats();
        stats.total_adventures += 1;
        match kind {
            OutputKind::Text => stats.stories_created += 1,
            OutputKind::Image => stats.scenes_generated += 1,
        }

        let plaintext = match self.cipher.decrypt(narrative_text) {
            Ok(text) => text,
            Err(err) => {
                // Legacy rows may hold plaintext; count what we have
                warn!(error = %err, "decryption failed; counting words on raw text");
                narrative_text.to_string()
            }
        };
        stats.total_words_written += word_count(&plaintext);

        if stats.first_adventure_date.is_none() {
            stats.first_adventure_date = Some(now);
        }
        stats.last_adventure_date = Some(now);
        stats.last_updated = Some(now);

        self.persist(character_id, &stats).await?;
        Ok(stats)
    }

    /// Fold a full recomputation into the stored statistics
    ///
    /// `longest_streak` only ever increases; the activity patterns are
    /// replaced outright. Intended for backfill and periodic jobs, not
    /// the per-entry write path.
    pub async fn apply_patterns(
        &self,
        character_id: CharacterId,
        patterns: &ActivityPatterns,
        now: DateTime<Utc>,
    ) -> Result<StoredUsageStats, JournalError> {
        let character = self
            .characters
            .find_by_id(character_id.0)
            .await?
            .ok_or(JournalError::CharacterNotFound)?;

        let mut stats = character.parsed_usage_stats();
        stats.longest_streak = stats.longest_streak.max(patterns.longest_streak);
        stats.most_active_day = patterns.most_active_day.clone();
        stats.most_active_hour = patterns.most_active_hour;
        stats.last_updated = Some(now);

        self.persist(character_id, &stats).await?;
        Ok(stats)
    }

    async fn persist(
        &self,
        character_id: CharacterId,
        stats: &StoredUsageStats,
    ) -> Result<(), JournalError> {
        let json = serde_json::to_value(stats)
            .map_err(|e| JournalError::Internal(e.to_string()))?;
        self.characters
            .update_usage_stats(character_id.0, json)
            .await?;
        Ok(())
    }
}

impl<C: CharacterRepository> std::fmt::Debug for UsageStatsTracker<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageStatsTracker").finish()
    }
}

/// Whitespace-delimited word count
pub fn word_count(text: &str) -> i64 {
    text.split_whitespace().count() as i64
}

/// Recompute streaks and activity patterns from the full entry history
///
/// Read-only: callers decide when to persist the result. Days and hours
/// are taken in the user's timezone. Ties break deterministically toward
/// the earliest weekday (Monday first) and the lowest hour.
pub fn recalculate_streaks_and_patterns(
    entry_times: &[DateTime<Utc>],
    tz: Tz,
    today: NaiveDate,
) -> ActivityPatterns {
    if entry_times.is_empty() {
        return ActivityPatterns::default();
    }

    let local_times: Vec<_> = entry_times
        .iter()
        .map(|t| t.with_timezone(&tz))
        .collect();
    let days: HashSet<NaiveDate> = local_times.iter().map(|t| t.date_naive()).collect();

    // Current streak: walk back from today until the first gap
    let mut current_streak = 0;
    let mut cursor = today;
    while days.contains(&cursor) {
        current_streak += 1;
        match cursor.checked_sub_days(Days::new(1)) {
            Some(prev) => cursor = prev,
            None => break,
        }
    }

    // Longest streak: group consecutive days over the sorted history
    let mut sorted_days: Vec<NaiveDate> = days.iter().copied().collect();
    sorted_days.sort();
    let mut longest_streak = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in sorted_days {
        run = match prev {
            Some(p) if p.checked_add_days(Days::new(1)) == Some(day) => run + 1,
            _ => 1,
        };
        longest_streak = longest_streak.max(run);
        prev = Some(day);
    }

    // Most active weekday; strict comparison keeps the earliest weekday
    // on ties
    let mut day_counts = [0usize; 7];
    for t in &local_times {
        day_counts[t.weekday().num_days_from_monday() as usize] += 1;
    }
    let mut most_active_day = None;
    let mut best_day_count = 0;
    for day in WEEKDAYS {
        let count = day_counts[day.num_days_from_monday() as usize];
        if count > best_day_count {
            best_day_count = count;
            most_active_day = Some(weekday_name(day).to_string());
        }
    }

    // Most active hour; strict comparison keeps the lowest hour on ties
    let mut hour_counts = [0usize; 24];
    for t in &local_times {
        hour_counts[t.hour() as usize] += 1;
    }
    let mut most_active_hour = None;
    let mut best_hour_count = 0;
    for hour in 0u32..24 {
        let count = hour_counts[hour as usize];
        if count > best_hour_count {
            best_hour_count = count;
            most_active_hour = Some(hour);
        }
    }

    ActivityPatterns {
        current_streak,
        longest_streak,
        most_active_day,
        most_active_hour,
    }
}

/// English weekday name
fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
