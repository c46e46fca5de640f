//! Stat progression value types and the leveling curve

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Largest allowed downward stat delta per entry
pub const STAT_CHANGE_MIN: i64 = -4;

/// Largest allowed upward stat delta per entry
pub const STAT_CHANGE_MAX: i64 = 4;

/// Experience granted for every entry, regardless of stat outcomes
pub const BASE_ENTRY_EXP: i64 = 15;

/// Extra experience per point of positive stat change
pub const EXP_PER_POSITIVE_POINT: i64 = 3;

/// A validated stat delta for one entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatChange {
    /// Delta, clamped to [-4, 4]
    pub change: i64,
    /// Judge's explanation of the change
    pub reason: String,
    /// Judge confidence, clamped to [0, 1]
    pub confidence: f64,
}

/// Validated stat deltas keyed by stat name
pub type EvaluatedChanges = BTreeMap<String, StatChange>;

/// Experience required to advance from `level` to `level + 1`
pub const fn exp_required_for_level_up(level: i64) -> i64 {
    100 + 20 * (level - 1)
}

/// Derive a character's level from total experience
///
/// Walks the cost curve from level 1, accumulating thresholds until the
/// next one would exceed the total. The level is always re-derivable from
/// experience alone; no incremental counter exists that could drift.
pub fn level_for_experience(experience: i64) -> i64 {
    let mut level = 1;
    let mut spent = 0;
    loop {
        let next = exp_required_for_level_up(level);
        if spent + next > experience {
            return level;
        }
        spent += next;
        level += 1;
    }
}

/// Experience gained by one entry
///
/// Base grant plus a bonus per point of positive stat change; negative
/// changes never subtract.
pub fn exp_gained_for_entry(changes: &EvaluatedChanges) -> i64 {
    let positive: i64 = changes.values().map(|c| c.change.max(0)).sum();
    BASE_ENTRY_EXP + EXP_PER_POSITIVE_POINT * positive
}
