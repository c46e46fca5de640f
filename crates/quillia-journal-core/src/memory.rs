//! Character memory store
//!
//! Bounded narrative state per character: a ring of recent entries, a
//! capped running summary, and structured world facts. The summary is
//! lossy once compressed; only the entry store holds full history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use quillia_db::{CharacterMemoryRepository, CharacterRow, UpsertCharacterMemory};
use quillia_types::{
    CharacterId, CharacterMemory, EntryId, MemoryEntry, WorldState, MAX_RECENT_ENTRIES,
    SUMMARY_KEEP_VERBATIM, SUMMARY_LOG_MAX_CHARS,
};

use crate::JournalError;

/// A new journal entry to fold into character memory
#[derive(Debug, Clone)]
pub struct NewMemoryEntry {
    /// Originating journal entry
    pub id: EntryId,
    /// What the user wrote
    pub original_text: String,
    /// The reimagined narrative, if one was generated
    pub reimagined_text: Option<String>,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
}

/// A fully assembled prompt for the story generation collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryPrompt {
    /// The complete prompt text
    pub text: String,
}

/// Character memory store over the memory repository
#[derive(Clone)]
pub struct MemoryStore<M: CharacterMemoryRepository> {
    memories: Arc<M>,
}

impl<M: CharacterMemoryRepository> MemoryStore<M> {
    /// Create a new memory store
    pub fn new(memories: Arc<M>) -> Self {
        Self { memories }
    }

    /// Load a character's memory, creating empty defaults on first access
    pub async fn character_memory(
        &self,
        character_id: CharacterId,
        now: DateTime<Utc>,
    ) -> Result<CharacterMemory, JournalError> {
        if let Some(row) = self.memories.find_by_character(character_id.0).await? {
            return Ok(parse_memory_row(&row));
        }

        let empty = CharacterMemory::empty(now);
        self.persist(character_id, &empty).await?;
        Ok(empty)
    }

    /// Fold a new entry into the character's memory
    ///
    /// Prepends to the recent-entry ring (oldest silently dropped past
    /// the cap), appends a dated summary line (compressing past the
    /// cap), and persists all fields together.
    #[instrument(skip(self, entry), fields(character_id = %character_id, entry_id = %entry.id))]
    pub async fn record_entry(
        &self,
        character_id: CharacterId,
        entry: NewMemoryEntry,
        now: DateTime<Utc>,
    ) -> Result<CharacterMemory, JournalError> {
        let mut memory = match self.memories.find_by_character(character_id.0).await? {
            Some(row) => parse_memory_row(&row),
            None => CharacterMemory::empty(now),
        };

        memory.recent_entries.insert(
            0,
            MemoryEntry {
                id: entry.id,
                original_text: entry.original_text.clone(),
                reimagined_text: entry.reimagined_text.clone(),
                created_at: entry.created_at,
            },
        );
        memory.recent_entries.truncate(MAX_RECENT_ENTRIES);

        memory.summary_log = append_summary_line(&memory.summary_log, &summary_line(&entry));
        if memory.summary_log.len() > SUMMARY_LOG_MAX_CHARS * 8 / 10 {
            warn!(
                character_id = %character_id,
                length = memory.summary_log.len(),
                cap = SUMMARY_LOG_MAX_CHARS,
                "summary log approaching cap"
            );
        }

        // Hook point for future extraction of relationships/locations
        // from the narrative; currently a pass-through
        memory.world_state = update_world_state(memory.world_state, &entry);

        memory.last_updated = now;
        self.persist(character_id, &memory).await?;
        Ok(memory)
    }

    async fn persist(
        &self,
        character_id: CharacterId,
        memory: &CharacterMemory,
    ) -> Result<(), JournalError> {
        self.memories
            .upsert(UpsertCharacterMemory {
                character_id: character_id.0,
                world_state: serde_json::to_value(&memory.world_state)
                    .map_err(|e| JournalError::Internal(e.to_string()))?,
                summary_log: memory.summary_log.clone(),
                recent_entries: serde_json::to_value(&memory.recent_entries)
                    .map_err(|e| JournalError::Internal(e.to_string()))?,
                last_updated: memory.last_updated,
            })
            .await?;
        Ok(())
    }
}

impl<M: CharacterMemoryRepository> std::fmt::Debug for MemoryStore<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish()
    }
}

/// Parse a stored memory row, tolerating legacy/malformed blobs
fn parse_memory_row(row: &quillia_db::CharacterMemoryRow) -> CharacterMemory {
    CharacterMemory {
        world_state: serde_json::from_value(row.world_state.clone()).unwrap_or_default(),
        summary_log: row.summary_log.clone(),
        recent_entries: serde_json::from_value(row.recent_entries.clone()).unwrap_or_default(),
        last_updated: row.last_updated,
    }
}

/// One dated summary line for an entry
fn summary_line(entry: &NewMemoryEntry) -> String {
    let text = entry
        .reimagined_text
        .as_deref()
        .unwrap_or(&entry.original_text);
    format!("{}: {}", entry.created_at.format("%Y-%m-%d"), text)
}

/// Append a line to the summary log, compressing past the cap
fn append_summary_line(summary: &str, line: &str) -> String {
    let appended = if summary.is_empty() {
        line.to_string()
    } else {
        format!("{summary}\n{line}")
    };

    if appended.len() <= SUMMARY_LOG_MAX_CHARS {
        return appended;
    }
    compress_summary(&appended)
}

/// Compress a summary log that exceeded the cap
///
/// Keeps the last few entries verbatim behind a marker counting what was
/// dropped. A marker left by an earlier compression folds into the new
/// count. Lossy: the compressed entries are only recoverable from the
/// entry store.
fn compress_summary(summary: &str) -> String {
    let mut lines: Vec<&str> = summary.lines().filter(|l| !l.is_empty()).collect();

    // Fold a previous marker into the running count
    let mut already_compressed = 0;
    if let Some(count) = lines.first().and_then(|l| parse_marker(l)) {
        already_compressed = count;
        lines.remove(0);
    }

    if lines.len() <= SUMMARY_KEEP_VERBATIM {
        return summary.to_string();
    }

    let compressed_count = already_compressed + lines.len() - SUMMARY_KEEP_VERBATIM;
    let kept = &lines[lines.len() - SUMMARY_KEEP_VERBATIM..];
    let mut result = format!("[{compressed_count} earlier entries compressed]");
    for line in kept {
        result.push('\n');
        result.push_str(line);
    }
    result
}

/// Parse the compressed-entry count from a marker line
fn parse_marker(line: &str) -> Option<usize> {
    line.strip_prefix('[')?
        .strip_suffix(" earlier entries compressed]")?
        .parse()
        .ok()
}

/// World-state update hook; currently a pass-through
fn update_world_state(world_state: WorldState, _entry: &NewMemoryEntry) -> WorldState {
    world_state
}

/// Assemble the story prompt for the generation collaborator
///
/// Pure formatting: character profile, world state, condensed summary,
/// recent entries newest first, and fixed continuity instructions. This
/// is the sole interface handed to the external generator.
pub fn build_story_prompt(
    character: &CharacterRow,
    memory: &CharacterMemory,
    user_input: &str,
) -> StoryPrompt {
    let mut text = String::new();

    text.push_str("CHARACTER PROFILE\n");
    text.push_str(&format!(
        "Name: {} | Theme: {} | Level: {}\n",
        character.name, character.theme, character.level
    ));
    for (name, stat) in character.parsed_stats() {
        text.push_str(&format!("  {}: {}\n", name, stat.value));
    }

    if !memory.world_state.is_empty() {
        text.push_str("\nWORLD STATE\n");
        for (name, relationship) in &memory.world_state.relationships {
            text.push_str(&format!("  {name}: {relationship}\n"));
        }
        if !memory.world_state.locations.is_empty() {
            text.push_str(&format!(
                "  Locations: {}\n",
                memory.world_state.locations.join(", ")
            ));
        }
        if !memory.world_state.ongoing_plots.is_empty() {
            text.push_str(&format!(
                "  Ongoing plots: {}\n",
                memory.world_state.ongoing_plots.join("; ")
            ));
        }
        if !memory.world_state.character_traits.is_empty() {
            text.push_str(&format!(
                "  Traits: {}\n",
                memory.world_state.character_traits.join(", ")
            ));
        }
    }

    if !memory.summary_log.is_empty() {
        text.push_str("\nSTORY SO FAR\n");
        text.push_str(&memory.summary_log);
        text.push('\n');
    }

    if !memory.recent_entries.is_empty() {
        text.push_str("\nRECENT ENTRIES (newest first)\n");
        for (idx, entry) in memory.recent_entries.iter().enumerate() {
            let narrative = entry
                .reimagined_text
                .as_deref()
                .unwrap_or(&entry.original_text);
            text.push_str(&format!(
                "{}. [{}] {}\n",
                idx + 1,
                entry.created_at.format("%Y-%m-%d"),
                narrative
            ));
        }
    }

    text.push_str("\nTODAY'S JOURNAL ENTRY\n");
    text.push_str(user_input);
    text.push_str(
        "\n\nCONTINUITY INSTRUCTIONS\n\
         Weave today's entry into the ongoing story. Reference prior \
         events subtly rather than recapping them. Avoid repetitive \
         openings; vary how each chapter begins.\n",
    );

    StoryPrompt { text }
}
