//! Candidate ranking over the session context.

use std::cmp::Ordering;

use crate::domain::product::Product;
use crate::domain::session::ConversationSession;

use super::scoring::MatchScorer;
use super::types::{DietaryRules, RankingWeights, Recommendation};

#[derive(Clone, Debug, Default)]
pub struct RecommendationRanker {
    scorer: MatchScorer,
}

impl RecommendationRanker {
    pub fn new(weights: RankingWeights, rules: DietaryRules) -> Self {
        Self { scorer: MatchScorer::new(weights, rules) }
    }

    pub fn rules(&self) -> &DietaryRules {
        self.scorer.rules()
    }

    /// Scores and orders candidates against the session context. At most
    /// `limit` results; an empty candidate set is an empty result, not an
    /// error. A candidate violating any stated dietary restriction is
    /// excluded outright, never merely down-weighted. Ordering is composite
    /// score descending, then popularity descending, then product id
    /// ascending, so equal inputs always produce identical output.
    pub fn rank(
        &self,
        session: &ConversationSession,
        candidates: &[Product],
        limit: usize,
    ) -> Vec<Recommendation> {
        if candidates.is_empty() || limit == 0 {
            return Vec::new();
        }

        let profile = &session.preferences;
        let mut recommendations = Vec::with_capacity(candidates.len());

        for product in candidates {
            let breakdown = self.scorer.component_scores(profile, product);
            if breakdown.dietary_fit == 0.0 {
                continue;
            }

            let score = self.scorer.composite(&breakdown);
            let reasons = self.scorer.reasons(profile, product, &breakdown);

            recommendations.push(Recommendation {
                product_id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                popularity_score: product.popularity_score,
                score,
                breakdown,
                reasons,
                chef_special: product.chef_special,
                limited_time: product.limited_time,
            });
        }

        recommendations.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.popularity_score.cmp(&a.popularity_score))
                .then_with(|| a.product_id.cmp(&b.product_id))
        });

        recommendations.truncate(limit);
        recommendations
    }
}
