//! Product selection over the catalog

use std::sync::Arc;

use tracing::debug;

use super::scoring::ScoreCalculator;
use super::types::{Recommendation, ScoredProduct};
use super::MIN_RECOMMENDATION_SCORE;
use crate::catalog::Catalog;
use crate::domain::tag::SelectedTags;

/// Picks the best-matching catalog product for a tag selection.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    catalog: Arc<Catalog>,
    calculator: ScoreCalculator,
    threshold: f64,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog, calculator: ScoreCalculator::new(), threshold: MIN_RECOMMENDATION_SCORE }
    }

    pub fn with_calculator(mut self, calculator: ScoreCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Best product for `selected`, or `None` when nothing reaches the
    /// threshold.
    ///
    /// Products are scanned in name order and only a strictly higher score
    /// replaces the current best, so ties go to the name that sorts first.
    pub fn recommend(&self, selected: &SelectedTags) -> Option<Recommendation> {
        if self.catalog.is_empty() || selected.is_empty() {
            return None;
        }

        let mut best: Option<ScoredProduct> = None;
        for scored in self.score_products(selected) {
            let best_total = best.as_ref().map_or(0.0, |current| current.total);
            if scored.total > best_total {
                best = Some(scored);
            }
        }

        let accepted = best.filter(|candidate| candidate.total >= self.threshold);
        debug!(
            event_name = "recommendation.selected",
            product = accepted.as_ref().map_or("none", |candidate| candidate.product.as_str()),
            score = accepted.as_ref().map_or(0.0, |candidate| candidate.total),
            "recommendation evaluated"
        );
        accepted
    }

    /// Every product's score, in catalog order.
    pub fn score_products(&self, selected: &SelectedTags) -> Vec<ScoredProduct> {
        self.catalog
            .products()
            .iter()
            .map(|product| {
                ScoredProduct::new(
                    product.name.as_str(),
                    self.calculator.score(selected, &product.tags),
                )
            })
            .collect()
    }

    /// Every product's score, best first.
    pub fn rank(&self, selected: &SelectedTags) -> Vec<ScoredProduct> {
        let mut ranked = self.score_products(selected);
        ranked.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::RecommendationEngine;
    use crate::catalog::Catalog;
    use crate::domain::product::Product;
    use crate::domain::tag::{SelectedTags, TagCategory, TagGroups};

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new(vec![
            Product::new(
                "주택화재보험",
                TagGroups::new()
                    .with(TagCategory::Who, &[])
                    .with(TagCategory::Risk, &["#화재", "#배상책임", "#도난"]),
            ),
            Product::new(
                "펫보험",
                TagGroups::new()
                    .with(TagCategory::Who, &["#반려견", "#반려묘"])
                    .with(TagCategory::Risk, &["#슬개골", "#배상책임"]),
            ),
        ]))
    }

    #[test]
    fn risk_overlap_product_is_recommended() {
        let engine = RecommendationEngine::new(catalog());
        let selected = SelectedTags::new().with(TagCategory::Risk, &["#화재", "#배상책임"]);

        let recommendation = engine.recommend(&selected).expect("recommendation");

        assert_eq!(recommendation.product, "주택화재보험");
        assert_eq!(recommendation.score.similarity, 2.0);
        assert_eq!(recommendation.score.risk_bonus, 1.0);
        assert_eq!(recommendation.total, 3.0);
    }

    #[test]
    fn empty_catalog_never_recommends() {
        let engine = RecommendationEngine::new(Arc::new(Catalog::default()));
        let selected = SelectedTags::new().with(TagCategory::Risk, &["#화재", "#배상책임"]);

        assert!(engine.recommend(&selected).is_none());
    }

    #[test]
    fn empty_selection_never_recommends() {
        let engine = RecommendationEngine::new(catalog());

        assert!(engine.recommend(&SelectedTags::new()).is_none());
        assert!(engine.recommend(&SelectedTags::new().with(TagCategory::Who, &[])).is_none());
    }

    #[test]
    fn single_weak_tag_stays_below_threshold() {
        let engine = RecommendationEngine::new(catalog());
        let selected = SelectedTags::new().with(TagCategory::Who, &["#운전자"]);

        assert!(engine.recommend(&selected).is_none());
    }

    #[test]
    fn single_exact_tag_is_not_enough() {
        let engine = RecommendationEngine::new(catalog());
        // one exact match outside the risk group scores 1.0
        let selected = SelectedTags::new().with(TagCategory::Who, &["#반려견"]);

        assert!(engine.recommend(&selected).is_none());
    }

    #[test]
    fn ties_go_to_the_first_name() {
        let products = vec![
            Product::new("B상품", TagGroups::new().with(TagCategory::Who, &["#가족", "#나"])),
            Product::new("A상품", TagGroups::new().with(TagCategory::Who, &["#가족", "#나"])),
        ];
        let engine = RecommendationEngine::new(Arc::new(Catalog::new(products)));
        let selected = SelectedTags::new().with(TagCategory::Who, &["#가족", "#나"]);

        let recommendation = engine.recommend(&selected).expect("recommendation");
        assert_eq!(recommendation.product, "A상품");
    }

    #[test]
    fn threshold_is_inclusive() {
        let products = vec![Product::new(
            "여행자보험",
            TagGroups::new().with(TagCategory::Risk, &["#상해후유장해"]),
        )];
        let engine = RecommendationEngine::new(Arc::new(Catalog::new(products)));
        // exact 1.0 + risk bonus 0.5
        let selected = SelectedTags::new().with(TagCategory::Risk, &["#상해후유장해"]);

        let recommendation = engine.recommend(&selected).expect("recommendation");
        assert_eq!(recommendation.total, 1.5);
    }

    #[test]
    fn rank_orders_best_first() {
        let engine = RecommendationEngine::new(catalog());
        let selected = SelectedTags::new().with(TagCategory::Risk, &["#슬개골", "#배상책임"]);

        let ranked = engine.rank(&selected);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].product, "펫보험");
        assert!(ranked[0].total >= ranked[1].total);
    }
}
