use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lowest RPN classified as [`PriorityTier::High`]
pub const HIGH_RPN_THRESHOLD: i64 = 200;

/// Lowest RPN classified as [`PriorityTier::Moderate`]
pub const MODERATE_RPN_THRESHOLD: i64 = 100;

/// Priority tier derived from a risk number.
///
/// Variant order is the report order: `High < Moderate < Low`, so sorting
/// ascending puts the most urgent records first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
pub enum PriorityTier {
    High,
    Moderate,
    Low,
}

impl PriorityTier {
    /// Classify a risk number (RPN)
    pub fn classify(risk_number: i64) -> Self {
        if risk_number >= HIGH_RPN_THRESHOLD {
            PriorityTier::High
        } else if risk_number >= MODERATE_RPN_THRESHOLD {
            PriorityTier::Moderate
        } else {
            PriorityTier::Low
        }
    }
}
