/// Fuzzy component matching
///
/// This module maps free-text observations onto catalog components:
/// - Substring-tolerant similarity scoring (`partial_ratio`)
/// - Best-match selection with a fixed acceptance threshold

pub mod fuzzy;
pub mod matcher;

pub use fuzzy::{partial_ratio, ratio};
pub use matcher::{ComponentMatch, ComponentMatcher, MATCH_THRESHOLD, UNKNOWN_COMPONENT};
