use crate::catalog::{CatalogEntry, ComponentCatalog};
use crate::matching::fuzzy::partial_ratio_chars;
use std::sync::Arc;

/// Component name reported when no catalog entry matches
pub const UNKNOWN_COMPONENT: &str = "Unknown";

/// Minimum similarity score for a catalog entry to be accepted
pub const MATCH_THRESHOLD: f64 = 80.0;

/// Best accepted catalog entry for a piece of text
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMatch<'a> {
    pub entry: &'a CatalogEntry,
    pub score: f64,
}

/// Matches observation text against the component catalog.
///
/// Case-folded catalog names are prepared once; matching itself is a pure
/// function of the catalog and the input text.
#[derive(Debug, Clone)]
pub struct ComponentMatcher {
    catalog: Arc<ComponentCatalog>,
    folded_names: Vec<Vec<char>>,
}

impl ComponentMatcher {
    pub fn new(catalog: Arc<ComponentCatalog>) -> Self {
        let folded_names = catalog
            .entries()
            .iter()
            .map(|e| e.component_name.to_lowercase().chars().collect())
            .collect();

        Self {
            catalog,
            folded_names,
        }
    }

    pub fn catalog(&self) -> &Arc<ComponentCatalog> {
        &self.catalog
    }

    /// Best catalog entry scoring at least [`MATCH_THRESHOLD`].
    ///
    /// A candidate only replaces the current best on a strictly higher
    /// score, so the first entry to reach the maximum wins ties.
    pub fn best_match(&self, text: &str) -> Option<ComponentMatch<'_>> {
        let folded_text: Vec<char> = text.trim().to_lowercase().chars().collect();

        let mut best: Option<ComponentMatch<'_>> = None;
        let mut highest = 0.0;

        for (entry, name) in self.catalog.entries().iter().zip(&self.folded_names) {
            let score = partial_ratio_chars(name, &folded_text);
            if score > highest && score >= MATCH_THRESHOLD {
                highest = score;
                best = Some(ComponentMatch { entry, score });
            }
        }

        best
    }

    /// Name of the best matching component, or [`UNKNOWN_COMPONENT`]
    pub fn match_component(&self, text: &str) -> String {
        self.best_match(text)
            .map(|m| m.entry.component_name.clone())
            .unwrap_or_else(|| UNKNOWN_COMPONENT.to_string())
    }
}
