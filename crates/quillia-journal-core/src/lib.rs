//! Quillia Journal Core - Narrative continuity and progression logic
//!
//! Character memory (bounded recent entries, compressible summary log,
//! world state), story prompt assembly, stat evaluation and progression,
//! lifetime usage statistics, and the entry-creation pipeline that
//! sequences them behind the billing gates.
//!
//! # Example
//!
//! ```rust,ignore
//! use quillia_journal_core::{JournalService, CreateEntryOutcome};
//! use quillia_types::OutputKind;
//!
//! let outcome = service
//!     .create_entry(user_id, character_id, OutputKind::Text, "today I...", now)
//!     .await?;
//! match outcome {
//!     CreateEntryOutcome::Created(created) => println!("{} vials left", created.remaining_credits),
//!     CreateEntryOutcome::Denied(denial) => println!("{denial:?}"),
//! }
//! ```

pub mod cipher;
pub mod error;
pub mod generate;
pub mod judge;
pub mod memory;
pub mod progression;
pub mod service;
pub mod stats;

pub use cipher::{CipherError, PlaintextCipher, TextCipher};
pub use error::JournalError;
pub use generate::{GeneratedOutput, GenerationError, StoryGenerator};
pub use judge::{JudgeError, RawJudgement, RawStatJudgement, StatJudge};
pub use memory::{build_story_prompt, MemoryStore, NewMemoryEntry, StoryPrompt};
pub use progression::{sanitize_judgement, AppliedProgression, ProgressionEngine};
pub use service::{CreateEntryDenial, CreateEntryOutcome, CreatedEntry, JournalService};
pub use stats::{recalculate_streaks_and_patterns, word_count, UsageStatsTracker};
