//! Types for the recommendation engine

use serde::{Deserialize, Serialize};

/// Score breakdown of one product against a selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    /// Exact plus fuzzy overlap of the flattened tag sets
    pub similarity: f64,
    /// Credit for overlapping risk-category tags
    pub risk_bonus: f64,
}

impl MatchScore {
    pub fn total(&self) -> f64 {
        self.similarity + self.risk_bonus
    }
}

/// A product scored against a selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    pub product: String,
    pub score: MatchScore,
    pub total: f64,
}

impl ScoredProduct {
    pub fn new(product: impl Into<String>, score: MatchScore) -> Self {
        Self { product: product.into(), total: score.total(), score }
    }
}

/// The product chosen for a selection
pub type Recommendation = ScoredProduct;
