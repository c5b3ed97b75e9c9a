//! Tag-overlap product recommendation
//!
//! Scores every catalog product against the tags a visitor selected and
//! returns the single best match, if it clears the acceptance threshold.

mod engine;
mod scoring;
mod types;

pub use engine::RecommendationEngine;
pub use scoring::{normalize_keyword, ScoreCalculator, ScoringWeights};
pub use types::*;

/// Default scoring weights
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    exact_match: 1.0,
    fuzzy_match: 0.5,
    risk_match: 0.5,
};

/// Minimum final score for a product to be recommended
pub const MIN_RECOMMENDATION_SCORE: f64 = 1.5;
