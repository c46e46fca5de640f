//! Stat evaluation and progression engine
//!
//! Obtains AI-scored stat deltas for a new narrative, validates and
//! clamps them regardless of what the judge returned, appends an
//! auditable progression record per changed stat, and re-derives the
//! character's level from total experience.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use quillia_db::{CharacterRepository, CreateStatProgression, EntryRepository,
    StatProgressionRepository};
use quillia_types::{
    exp_gained_for_entry, level_for_experience, CharacterId, CharacterStats, EntryId,
    EvaluatedChanges, StatChange, Theme, STAT_CHANGE_MAX, STAT_CHANGE_MIN, STAT_MAX, STAT_MIN,
};

use crate::judge::{RawJudgement, StatJudge};
use crate::JournalError;

/// Characters of source text snapshotted onto each audit row
const ENTRY_SNAPSHOT_CHARS: usize = 500;

/// Placeholder when the judge omits a reason
const MISSING_REASON: &str = "No reason provided";

/// Confidence assumed when the judge omits one
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Result of applying one entry's stat changes
#[derive(Debug, Clone)]
pub struct AppliedProgression {
    /// Experience granted by this entry
    pub exp_gained: i64,
    /// Character's total experience after the grant
    pub total_experience: i64,
    /// Level before the entry
    pub old_level: i64,
    /// Level after the entry
    pub new_level: i64,
    /// The validated changes that were applied
    pub changes: EvaluatedChanges,
}

/// Stat evaluation and progression engine
#[derive(Clone)]
pub struct ProgressionEngine<C, E, P>
where
    C: CharacterRepository,
    E: EntryRepository,
    P: StatProgressionRepository,
{
    characters: Arc<C>,
    entries: Arc<E>,
    progressions: Arc<P>,
    judge: Arc<dyn StatJudge>,
}

impl<C, E, P> ProgressionEngine<C, E, P>
where
    C: CharacterRepository,
    E: EntryRepository,
    P: StatProgressionRepository,
{
    /// Create a new progression engine
    pub fn new(
        characters: Arc<C>,
        entries: Arc<E>,
        progressions: Arc<P>,
        judge: Arc<dyn StatJudge>,
    ) -> Self {
        Self {
            characters,
            entries,
            progressions,
            judge,
        }
    }

    /// Obtain and validate stat deltas for a narrative
    ///
    /// The judge's output is untrusted: stats outside the theme's
    /// vocabulary are dropped, deltas are rounded and clamped to
    /// [-4, 4], confidence to [0, 1], and missing reasons replaced.
    pub async fn evaluate_stat_changes(
        &self,
        original_text: &str,
        reimagined_text: &str,
        theme: &Theme,
        current_stats: &CharacterStats,
    ) -> Result<EvaluatedChanges, JournalError> {
        let raw = self
            .judge
            .judge_entry(original_text, reimagined_text, theme, current_stats)
            .await
            .map_err(|e| JournalError::Judge(e.to_string()))?;

        Ok(sanitize_judgement(raw, theme))
    }

    /// Apply validated stat changes to a character
    ///
    /// Clamps each stat into [1, 100], appends an immutable audit row
    /// per stat that actually changed, grants experience, and re-derives
    /// the level from the new total.
    #[instrument(skip(self, changes, original_text), fields(character_id = %character_id, entry_id = %entry_id))]
    pub async fn apply_stat_changes(
        &self,
        character_id: CharacterId,
        entry_id: EntryId,
        changes: &EvaluatedChanges,
        original_text: &str,
    ) -> Result<AppliedProgression, JournalError> {
        let character = self
            .characters
            .find_by_id(character_id.0)
            .await?
            .ok_or(JournalError::CharacterNotFound)?;

        let mut stats = character.parsed_stats();
        let snapshot: String = original_text.chars().take(ENTRY_SNAPSHOT_CHARS).collect();

        for (name, change) in changes {
            if change.change == 0 {
                continue;
            }
            let Some(stat) = stats.get_mut(name) else {
                warn!(stat = %name, "judged stat missing from character; skipping");
                continue;
            };

            let old_value = stat.value;
            let new_value = (old_value + change.change).clamp(STAT_MIN, STAT_MAX);
            if new_value == old_value {
                continue;
            }

            self.progressions
                .append(CreateStatProgression {
                    id: Uuid::new_v4(),
                    character_id: character_id.0,
                    entry_id: entry_id.0,
                    stat_name: name.clone(),
                    old_value,
                    new_value,
                    change: change.change,
                    reason: change.reason.clone(),
                    confidence: change.confidence,
                    entry_text: snapshot.clone(),
                })
                .await?;

            stat.value = new_value;
        }

        let exp_gained = exp_gained_for_entry(changes);
        let total_experience = character.experience + exp_gained;
        let old_level = character.level;
        let new_level = level_for_experience(total_experience);

        let stats_json = serde_json::to_value(&stats)
            .map_err(|e| JournalError::Internal(e.to_string()))?;
        self.characters
            .update_progression(character_id.0, stats_json, total_experience, new_level)
            .await?;

        let changes_json = serde_json::to_value(changes)
            .map_err(|e| JournalError::Internal(e.to_string()))?;
        self.entries
            .set_progression(entry_id.0, exp_gained, changes_json)
            .await?;

        if new_level > old_level {
            info!(old_level, new_level, "character leveled up");
        }

        Ok(AppliedProgression {
            exp_gained,
            total_experience,
            old_level,
            new_level,
            changes: changes.clone(),
        })
    }

    /// Evaluate and apply in one step
    ///
    /// The entry pipeline calls this after an entry is persisted and
    /// treats any failure as non-fatal.
    pub async fn evaluate_and_apply(
        &self,
        character_id: CharacterId,
        entry_id: EntryId,
        original_text: &str,
        reimagined_text: &str,
        theme: &Theme,
        current_stats: &CharacterStats,
    ) -> Result<AppliedProgression, JournalError> {
        let changes = self
            .evaluate_stat_changes(original_text, reimagined_text, theme, current_stats)
            .await?;
        self.apply_stat_changes(character_id, entry_id, &changes, original_text)
            .await
    }
}

impl<C, E, P> std::fmt::Debug for ProgressionEngine<C, E, P>
where
    C: CharacterRepository,
    E: EntryRepository,
    P: StatProgressionRepository,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionEngine").finish()
    }
}

/// Validate and clamp raw judge output against the theme vocabulary
pub fn sanitize_judgement(raw: RawJudgement, theme: &Theme) -> EvaluatedChanges {
    raw.into_iter()
        .filter_map(|(name, judgement)| {
            if !theme.defines_stat(&name) {
                warn!(stat = %name, "judge proposed a stat outside the theme; dropping");
                return None;
            }
            if !judgement.change.is_finite() {
                warn!(stat = %name, "judge proposed a non-finite change; dropping");
                return None;
            }

            let change =
                (judgement.change.round() as i64).clamp(STAT_CHANGE_MIN, STAT_CHANGE_MAX);
            let confidence = judgement
                .confidence
                .filter(|c| c.is_finite())
                .unwrap_or(DEFAULT_CONFIDENCE)
                .clamp(0.0, 1.0);
            let reason = judgement
                .reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| MISSING_REASON.to_string());

            Some((
                name,
                StatChange {
                    change,
                    reason,
                    confidence,
                },
            ))
        })
        .collect()
}
