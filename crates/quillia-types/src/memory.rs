//! Character memory value types
//!
//! Bounded narrative state carried per character: structured world facts,
//! a size-capped running summary, and a short ring of recent entries.
//! The summary is lossy once compressed; the full history lives only in
//! the entry store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::EntryId;

/// Maximum entries kept in the recent-entry ring
pub const MAX_RECENT_ENTRIES: usize = 5;

/// Hard cap on the summary log length, in characters
pub const SUMMARY_LOG_MAX_CHARS: usize = 2000;

/// Entries kept verbatim when the summary log is compressed
pub const SUMMARY_KEEP_VERBATIM: usize = 3;

/// Structured world facts remembered per character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    /// Name -> relationship type
    #[serde(default)]
    pub relationships: BTreeMap<String, String>,
    /// Known locations
    #[serde(default)]
    pub locations: Vec<String>,
    /// Unresolved plot threads
    #[serde(default)]
    pub ongoing_plots: Vec<String>,
    /// Established character traits
    #[serde(default)]
    pub character_traits: Vec<String>,
}

impl WorldState {
    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
            && self.locations.is_empty()
            && self.ongoing_plots.is_empty()
            && self.character_traits.is_empty()
    }
}

/// One entry in the recent-entry ring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Originating journal entry
    pub id: EntryId,
    /// What the user wrote
    pub original_text: String,
    /// The reimagined narrative, if one was generated
    #[serde(default)]
    pub reimagined_text: Option<String>,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
}

/// Bounded narrative memory for one character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMemory {
    /// Structured world facts
    #[serde(default)]
    pub world_state: WorldState,
    /// Running dated digest, capped at [`SUMMARY_LOG_MAX_CHARS`]
    #[serde(default)]
    pub summary_log: String,
    /// Ring of the most recent entries, newest first
    #[serde(default)]
    pub recent_entries: Vec<MemoryEntry>,
    /// When the memory was last written
    pub last_updated: DateTime<Utc>,
}

impl CharacterMemory {
    /// Empty memory for a character that has no entries yet
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            world_state: WorldState::default(),
            summary_log: String::new(),
            recent_entries: Vec::new(),
            last_updated: now,
        }
    }
}
