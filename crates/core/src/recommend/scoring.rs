//! Scoring of tag overlap between a selection and a product

use std::collections::BTreeSet;

use super::types::MatchScore;
use crate::domain::tag::{TagCategory, TagGroups, TAG_MARKER};

/// Weights for scoring components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Credit per distinct tag present on both sides (default: 1.0)
    pub exact_match: f64,
    /// Credit per user tag whose keyword partially matches a product tag (default: 0.5)
    pub fuzzy_match: f64,
    /// Credit per shared risk-category tag (default: 0.5)
    pub risk_match: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

/// Strips the tag marker and lowercases, e.g. `#Eco마일리지특약` → `eco마일리지특약`.
pub fn normalize_keyword(tag: &str) -> String {
    tag.trim_start_matches(TAG_MARKER).to_lowercase()
}

/// Score calculator for product recommendations
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
}

impl ScoreCalculator {
    /// Create a new score calculator with default weights
    pub fn new() -> Self {
        Self { weights: ScoringWeights::default() }
    }

    /// Create with custom weights
    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Similarity of two tag sets.
    ///
    /// Every shared tag earns the exact-match credit once. A user tag absent
    /// from the product earns at most one fuzzy credit, granted when its
    /// keyword contains, or is contained in, the keyword of some product tag.
    pub fn tag_similarity(&self, user_tags: &BTreeSet<&str>, product_tags: &BTreeSet<&str>) -> f64 {
        if user_tags.is_empty() || product_tags.is_empty() {
            return 0.0;
        }

        let exact = user_tags.intersection(product_tags).count() as f64 * self.weights.exact_match;

        let product_keywords: Vec<String> = product_tags
            .iter()
            .map(|tag| normalize_keyword(tag))
            .collect();

        let fuzzy_hits = user_tags
            .iter()
            .filter(|tag| !product_tags.contains(*tag))
            .map(|tag| normalize_keyword(tag))
            .filter(|keyword| {
                product_keywords.iter().any(|product_keyword| {
                    product_keyword.contains(keyword.as_str())
                        || keyword.contains(product_keyword.as_str())
                })
            })
            .count();

        exact + fuzzy_hits as f64 * self.weights.fuzzy_match
    }

    /// Credit for risk tags the selection and the product share exactly.
    pub fn risk_bonus(&self, selected: &TagGroups, product: &TagGroups) -> f64 {
        let user_risk = selected.category_set(TagCategory::Risk);
        let product_risk = product.category_set(TagCategory::Risk);
        user_risk.intersection(&product_risk).count() as f64 * self.weights.risk_match
    }

    /// Full score of one product profile against a selection.
    pub fn score(&self, selected: &TagGroups, product: &TagGroups) -> MatchScore {
        MatchScore {
            similarity: self.tag_similarity(&selected.flatten(), &product.flatten()),
            risk_bonus: self.risk_bonus(selected, product),
        }
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}
