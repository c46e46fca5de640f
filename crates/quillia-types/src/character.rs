//! Character identifiers, stats, and theme vocabulary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest value any stat can hold
pub const STAT_MIN: i64 = 1;

/// Highest value any stat can hold
pub const STAT_MAX: i64 = 100;

/// Unique character identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    /// Create a new random character ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a character ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CharacterId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A single character stat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatValue {
    /// Current value, 1..=100
    pub value: i64,
    /// Theme-flavored description of the stat
    #[serde(default)]
    pub description: String,
}

/// Character stats keyed by stat name
///
/// A `BTreeMap` keeps iteration order deterministic, so serialized stats
/// and progression processing are stable for identical inputs.
pub type CharacterStats = BTreeMap<String, StatValue>;

/// One stat a theme defines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDefinition {
    /// Stat name, e.g. "Valor"
    pub name: String,
    /// What the stat measures within the theme
    #[serde(default)]
    pub description: String,
}

/// A narrative theme and its fixed stat vocabulary
///
/// The stat-judging collaborator is constrained to this vocabulary; any
/// stat it proposes outside it is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme name, e.g. "fantasy"
    pub name: String,
    /// Stats the theme defines
    pub stats: Vec<StatDefinition>,
}

impl Theme {
    /// Whether the theme defines a stat with this name
    pub fn defines_stat(&self, name: &str) -> bool {
        self.stats.iter().any(|s| s.name == name)
    }

    /// Names of all stats the theme defines
    pub fn stat_names(&self) -> impl Iterator<Item = &str> {
        self.stats.iter().map(|s| s.name.as_str())
    }

    /// Initial stats for a freshly created character of this theme
    pub fn starting_stats(&self, starting_value: i64) -> CharacterStats {
        self.stats
            .iter()
            .map(|s| {
                (
                    s.name.clone(),
                    StatValue {
                        value: starting_value.clamp(STAT_MIN, STAT_MAX),
                        description: s.description.clone(),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fantasy_theme() -> Theme {
        Theme {
            name: "fantasy".to_string(),
            stats: vec![
                StatDefinition {
                    name: "Valor".to_string(),
                    description: "Courage in the face of danger".to_string(),
                },
                StatDefinition {
                    name: "Wisdom".to_string(),
                    description: "Insight and judgment".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_defines_stat_is_exact() {
        let theme = fantasy_theme();
        assert!(theme.defines_stat("Valor"));
        assert!(!theme.defines_stat("valor"));
        assert!(!theme.defines_stat("BogusStat"));
    }

    #[test]
    fn test_starting_stats_clamped() {
        let theme = fantasy_theme();
        let stats = theme.starting_stats(0);
        assert_eq!(stats.len(), 2);
        assert!(stats.values().all(|s| s.value == STAT_MIN));

        let stats = theme.starting_stats(500);
        assert!(stats.values().all(|s| s.value == STAT_MAX));
    }
}
