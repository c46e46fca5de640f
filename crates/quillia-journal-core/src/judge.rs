//! Stat judging collaborator abstraction
//!
//! The judge is an external text-scoring service returning proposed stat
//! deltas for a narrative. Its output is untrusted: the progression
//! engine validates and clamps everything it returns.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quillia_types::{CharacterStats, Theme};

/// Error from the judging collaborator
#[derive(Debug, Clone, thiserror::Error)]
#[error("judge error: {0}")]
pub struct JudgeError(pub String);

/// One raw, unvalidated stat delta as proposed by the judge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatJudgement {
    /// Proposed delta; may be fractional or wildly out of range
    pub change: f64,
    /// Proposed explanation
    #[serde(default)]
    pub reason: Option<String>,
    /// Proposed confidence; may be out of [0, 1]
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Raw judge output keyed by whatever stat names it chose to emit
pub type RawJudgement = BTreeMap<String, RawStatJudgement>;

/// Stat judging collaborator
#[async_trait]
pub trait StatJudge: Send + Sync {
    /// Score a narrative against the theme's stat vocabulary
    async fn judge_entry(
        &self,
        original_text: &str,
        reimagined_text: &str,
        theme: &Theme,
        current_stats: &CharacterStats,
    ) -> Result<RawJudgement, JudgeError>;
}
