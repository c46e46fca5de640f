//! Journal service - ties together gating, generation, and progression
//!
//! The entry-creation pipeline: entitlement and quota gates first, then
//! the external generation call, and only after it succeeds the credit
//! deduction, usage increment, and persistence. A provider failure
//! therefore leaves the ledger and counters untouched; a stat-judge
//! failure is logged and swallowed so the entry still stands.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use quillia_billing_core::{
    BillingConfig, CharacterAccessGate, CreditLedger, DailyUsageTracker,
};
use quillia_db::{
    CharacterMemoryRepository, CharacterRepository, CharacterRow, CreateEntry,
    CreditPurchaseRepository, DailyUsageRepository, EntryRepository, EntryRow,
    StatProgressionRepository, UserRepository, UserRow,
};
use quillia_types::{
    AffordabilityCheck, CharacterId, EntryId, LimitCheck, OutputKind, Theme, UserId,
};

use crate::cipher::TextCipher;
use crate::generate::{GeneratedOutput, StoryGenerator};
use crate::judge::StatJudge;
use crate::memory::{build_story_prompt, MemoryStore, NewMemoryEntry};
use crate::progression::{AppliedProgression, ProgressionEngine};
use crate::stats::UsageStatsTracker;
use crate::JournalError;

/// Outcome of an entry creation attempt
#[derive(Debug)]
pub enum CreateEntryOutcome {
    /// The entry was created
    Created(CreatedEntry),
    /// A gate denied the attempt; nothing was mutated
    Denied(CreateEntryDenial),
}

/// A successfully created entry
#[derive(Debug)]
pub struct CreatedEntry {
    /// The persisted entry row
    pub entry: EntryRow,
    /// Ink vials remaining after the deduction
    pub remaining_credits: i64,
    /// Progression results, absent when stat evaluation was skipped or
    /// failed
    pub progression: Option<AppliedProgression>,
}

/// Why an entry creation attempt was denied
///
/// Structured for display: every variant carries the underlying check
/// so a UI can render amounts and limits without further lookups.
#[derive(Debug)]
pub enum CreateEntryDenial {
    /// The character is not accessible under the current entitlement
    CharacterLocked {
        /// The character that was requested
        character_id: CharacterId,
    },
    /// The applicable daily quota is exhausted
    DailyLimit(LimitCheck),
    /// The ink vial balance does not cover the generation
    InsufficientCredits(AffordabilityCheck),
}

/// Journal service facade
pub struct JournalService<U, C, E, D, M, P, Pu>
where
    U: UserRepository,
    C: CharacterRepository,
    E: EntryRepository,
    D: DailyUsageRepository,
    M: CharacterMemoryRepository,
    P: StatProgressionRepository,
    Pu: CreditPurchaseRepository,
{
    users: Arc<U>,
    entries: Arc<E>,
    ledger: CreditLedger<U, Pu>,
    usage: DailyUsageTracker<U, D>,
    gate: CharacterAccessGate<U, C>,
    memory: MemoryStore<M>,
    progression: ProgressionEngine<C, E, P>,
    stats: UsageStatsTracker<C>,
    generator: Arc<dyn StoryGenerator>,
    cipher: Arc<dyn TextCipher>,
    themes: HashMap<String, Theme>,
}

impl<U, C, E, D, M, P, Pu> JournalService<U, C, E, D, M, P, Pu>
where
    U: UserRepository,
    C: CharacterRepository,
    E: EntryRepository,
    D: DailyUsageRepository,
    M: CharacterMemoryRepository,
    P: StatProgressionRepository,
    Pu: CreditPurchaseRepository,
{
    /// Create a new journal service
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<U>,
        characters: Arc<C>,
        entries: Arc<E>,
        daily_usage: Arc<D>,
        memories: Arc<M>,
        progressions: Arc<P>,
        purchases: Arc<Pu>,
        generator: Arc<dyn StoryGenerator>,
        judge: Arc<dyn StatJudge>,
        cipher: Arc<dyn TextCipher>,
        config: BillingConfig,
        themes: Vec<Theme>,
    ) -> Self {
        Self {
            ledger: CreditLedger::new(Arc::clone(&users), purchases),
            usage: DailyUsageTracker::new(Arc::clone(&users), daily_usage, config),
            gate: CharacterAccessGate::new(Arc::clone(&users), Arc::clone(&characters)),
            memory: MemoryStore::new(memories),
            progression: ProgressionEngine::new(
                Arc::clone(&characters),
                Arc::clone(&entries),
                progressions,
                judge,
            ),
            stats: UsageStatsTracker::new(characters, Arc::clone(&cipher)),
            users,
            entries,
            generator,
            cipher,
            themes: themes.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    /// Create a journal entry end to end
    ///
    /// Gates run first; the generation call runs before any mutation;
    /// credits are deducted only after generation succeeds. Denials are
    /// structured outcomes, not errors.
    #[instrument(skip(self, user_input), fields(user_id = %user_id, character_id = %character_id, kind = %kind))]
    pub async fn create_entry(
        &self,
        user_id: UserId,
        character_id: CharacterId,
        kind: OutputKind,
        user_input: &str,
        now: DateTime<Utc>,
    ) -> Result<CreateEntryOutcome, JournalError> {
        let user = self
            .users
            .find_by_id(user_id.0)
            .await?
            .ok_or(JournalError::UserNotFound)?;

        // Access gate: the character must exist and be accessible
        let access = self.gate.character_access(user_id, now).await?;
        let Some(character) = access
            .accessible
            .iter()
            .find(|c| c.id == character_id.0)
            .cloned()
        else {
            if access.locked.iter().any(|c| c.id == character_id.0) {
                return Ok(CreateEntryOutcome::Denied(
                    CreateEntryDenial::CharacterLocked { character_id },
                ));
            }
            return Err(JournalError::CharacterNotFound);
        };

        // Daily quota
        let limit_check = self
            .usage
            .check_daily_limit(&user, character_id, kind, now)
            .await?;
        if !limit_check.allowed {
            return Ok(CreateEntryOutcome::Denied(CreateEntryDenial::DailyLimit(
                limit_check,
            )));
        }

        // Advisory affordability check before paying for a generation
        let afford = self.ledger.can_afford_entry(user_id, kind).await?;
        if !afford.allowed {
            return Ok(CreateEntryOutcome::Denied(
                CreateEntryDenial::InsufficientCredits(afford),
            ));
        }

        // External generation; a failure aborts before any mutation
        let memory = self.memory.character_memory(character_id, now).await?;
        let prompt = build_story_prompt(&character, &memory, user_input);
        let generated = self
            .generator
            .generate(&prompt, kind)
            .await
            .map_err(|e| JournalError::Generation(e.to_string()))?;

        // Deduction re-checks atomically; a concurrent spender may still
        // win the race
        let deduction = self.ledger.deduct_credits(user_id, kind).await?;
        if !deduction.success {
            return Ok(CreateEntryOutcome::Denied(
                CreateEntryDenial::InsufficientCredits(AffordabilityCheck::evaluate(
                    deduction.remaining_credits,
                    kind.cost(),
                )),
            ));
        }

        self.usage.record_entry(&user, character_id, kind, now).await?;

        let entry = self
            .persist_entry(&user, &character, kind, user_input, &generated)
            .await?;
        let entry_id = entry.entry_id();

        let (reimagined_plain, stored_narrative) = match &generated {
            GeneratedOutput::Text(text) => (Some(text.clone()), entry
                .reimagined_text
                .clone()
                .unwrap_or_else(|| entry.original_text.clone())),
            GeneratedOutput::Image { .. } => (None, entry.original_text.clone()),
        };

        self.memory
            .record_entry(
                character_id,
                NewMemoryEntry {
                    id: entry_id,
                    original_text: user_input.to_string(),
                    reimagined_text: reimagined_plain.clone(),
                    created_at: entry.created_at,
                },
                now,
            )
            .await?;

        // Stat evaluation failure never fails the entry
        let progression = match (&reimagined_plain, self.themes.get(&character.theme)) {
            (Some(reimagined), Some(theme)) => {
                match self
                    .progression
                    .evaluate_and_apply(
                        character_id,
                        entry_id,
                        user_input,
                        reimagined,
                        theme,
                        &character.parsed_stats(),
                    )
                    .await
                {
                    Ok(applied) => Some(applied),
                    Err(err) => {
                        warn!(error = %err, "stat evaluation failed; entry stands");
                        None
                    }
                }
            }
            (Some(_), None) => {
                warn!(theme = %character.theme, "no stat vocabulary for theme; skipping evaluation");
                None
            }
            (None, _) => None,
        };

        self.stats
            .record_entry_created(character_id, kind, &stored_narrative, now)
            .await?;

        info!(entry_id = %entry_id, "journal entry created");
        Ok(CreateEntryOutcome::Created(CreatedEntry {
            entry,
            remaining_credits: deduction.remaining_credits,
            progression,
        }))
    }

    async fn persist_entry(
        &self,
        user: &UserRow,
        character: &CharacterRow,
        kind: OutputKind,
        user_input: &str,
        generated: &GeneratedOutput,
    ) -> Result<EntryRow, JournalError> {
        let original_text = self
            .cipher
            .encrypt(user_input)
            .map_err(|e| JournalError::Internal(e.to_string()))?;

        let (reimagined_text, image_url) = match generated {
            GeneratedOutput::Text(text) => {
                let ciphertext = self
                    .cipher
                    .encrypt(text)
                    .map_err(|e| JournalError::Internal(e.to_string()))?;
                (Some(ciphertext), None)
            }
            GeneratedOutput::Image { url } => (None, Some(url.clone())),
        };

        Ok(self
            .entries
            .create(CreateEntry {
                id: EntryId::new().0,
                character_id: character.id,
                user_id: user.id,
                output_kind: kind.to_string(),
                original_text,
                reimagined_text,
                image_url,
            })
            .await?)
    }

    /// The credit ledger, for handlers that need it directly
    pub fn ledger(&self) -> &CreditLedger<U, Pu> {
        &self.ledger
    }

    /// The daily usage tracker, for handlers that need it directly
    pub fn usage(&self) -> &DailyUsageTracker<U, D> {
        &self.usage
    }

    /// The character access gate, for handlers that need it directly
    pub fn gate(&self) -> &CharacterAccessGate<U, C> {
        &self.gate
    }

    /// The memory store, for handlers that need it directly
    pub fn memory(&self) -> &MemoryStore<M> {
        &self.memory
    }

    /// The usage statistics tracker, for handlers that need it directly
    pub fn stats(&self) -> &UsageStatsTracker<C> {
        &self.stats
    }
}

impl<U, C, E, D, M, P, Pu> std::fmt::Debug for JournalService<U, C, E, D, M, P, Pu>
where
    U: UserRepository,
    C: CharacterRepository,
    E: EntryRepository,
    D: DailyUsageRepository,
    M: CharacterMemoryRepository,
    P: StatProgressionRepository,
    Pu: CreditPurchaseRepository,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalService").finish()
    }
}
