//! Credit (ink vial) types and cost table

use serde::{Deserialize, Serialize};

/// Ink vials granted by the daily free recharge
pub const DAILY_RECHARGE_VIALS: i64 = 10;

/// Days after signup during which the starter kit can still be bought
pub const STARTER_KIT_WINDOW_DAYS: i64 = 30;

/// Generation output kind
///
/// Chapters are text narratives, scenes are images. Each kind has a fixed
/// ink vial cost and counts against its own daily quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Text narrative (a chapter)
    Text,
    /// Generated image (a scene)
    Image,
}

impl OutputKind {
    /// Ink vial cost of one generation of this kind
    pub const fn cost(&self) -> i64 {
        match self {
            Self::Text => 15,
            Self::Image => 80,
        }
    }

    /// Quota noun used in user-facing limit messages
    pub const fn quota_noun(&self) -> &'static str {
        match self {
            Self::Text => "chapter",
            Self::Image => "scene",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
        }
    }
}

impl std::str::FromStr for OutputKind {
    type Err = OutputKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "chapter" => Ok(Self::Text),
            "image" | "scene" => Ok(Self::Image),
            _ => Err(OutputKindParseError(s.to_string())),
        }
    }
}

/// Error parsing an output kind string
#[derive(Debug, Clone)]
pub struct OutputKindParseError(pub String);

impl std::fmt::Display for OutputKindParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid output kind: {}", self.0)
    }
}

impl std::error::Error for OutputKindParseError {}

/// Result of a read-only affordability check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityCheck {
    /// Whether the user can afford the generation
    pub allowed: bool,
    /// Current ink vial balance
    pub current_credits: i64,
    /// Vials the generation would cost
    pub required_credits: i64,
    /// Denial reason, if not allowed
    pub reason: Option<String>,
}

impl AffordabilityCheck {
    /// Build a check from a balance and a cost
    pub fn evaluate(current_credits: i64, required_credits: i64) -> Self {
        if current_credits >= required_credits {
            Self {
                allowed: true,
                current_credits,
                required_credits,
                reason: None,
            }
        } else {
            Self {
                allowed: false,
                current_credits,
                required_credits,
                reason: Some(format!(
                    "Insufficient ink vials: {current_credits} available, {required_credits} required"
                )),
            }
        }
    }
}

/// Result of an attempted credit deduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionOutcome {
    /// Whether the deduction was applied
    pub success: bool,
    /// Balance after the operation (unchanged on failure)
    pub remaining_credits: i64,
    /// Failure reason, if not applied
    pub reason: Option<String>,
}

/// Result of a daily recharge attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RechargeOutcome {
    /// Whether vials were actually granted this call
    pub recharged: bool,
    /// Balance after the operation
    pub new_balance: i64,
}
