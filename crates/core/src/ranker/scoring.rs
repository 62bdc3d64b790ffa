//! Per-criterion sub-scores and composite scoring.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::product::Product;
use crate::domain::session::PreferenceProfile;

use super::types::*;
use super::{BUDGET_OVERRUN_TOLERANCE, DEFAULT_WEIGHTS};

#[derive(Clone, Debug)]
pub struct MatchScorer {
    weights: RankingWeights,
    rules: DietaryRules,
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self { weights: DEFAULT_WEIGHTS, rules: DietaryRules::default() }
    }
}

impl MatchScorer {
    pub fn new(weights: RankingWeights, rules: DietaryRules) -> Self {
        Self { weights, rules }
    }

    pub fn rules(&self) -> &DietaryRules {
        &self.rules
    }

    /// All four normalized sub-scores for one candidate.
    pub fn component_scores(&self, profile: &PreferenceProfile, product: &Product) -> ComponentScores {
        ComponentScores {
            preference_match: self.preference_match(profile, product),
            mood_match: self.mood_match(profile, product),
            budget_fit: self.budget_fit(profile.budget_ceiling, product.price),
            dietary_fit: self.dietary_fit(profile, product),
        }
    }

    pub fn composite(&self, components: &ComponentScores) -> f64 {
        let total = components.preference_match * self.weights.preference
            + components.mood_match * self.weights.mood
            + components.budget_fit * self.weights.budget
            + components.dietary_fit * self.weights.dietary;

        total.min(1.0)
    }

    /// Fraction of stated preference keywords found in the product's
    /// name/description/ingredient text. No stated preferences scores zero
    /// for every candidate, which keeps the criterion neutral.
    fn preference_match(&self, profile: &PreferenceProfile, product: &Product) -> f64 {
        if profile.preference_keywords.is_empty() {
            return 0.0;
        }

        let text = product.searchable_text();
        let matched = profile
            .preference_keywords
            .iter()
            .filter(|keyword| text.contains(keyword.as_str()))
            .count();

        matched as f64 / profile.preference_keywords.len() as f64
    }

    /// Jaccard overlap between session and product mood tags.
    fn mood_match(&self, profile: &PreferenceProfile, product: &Product) -> f64 {
        if profile.mood_tags.is_empty() || product.mood_tags.is_empty() {
            return 0.0;
        }

        let intersection = profile.mood_tags.intersection(&product.mood_tags).count();
        let union = profile.mood_tags.union(&product.mood_tags).count();

        intersection as f64 / union as f64
    }

    /// 1.0 within the ceiling (or with no ceiling stated), decaying linearly
    /// to 0 as price exceeds the ceiling by up to 50%.
    fn budget_fit(&self, ceiling: Option<Decimal>, price: Decimal) -> f64 {
        let Some(ceiling) = ceiling else {
            return 1.0;
        };

        if price <= ceiling {
            return 1.0;
        }

        let ceiling = ceiling.to_f64().unwrap_or(0.0);
        let price = price.to_f64().unwrap_or(f64::MAX);
        if ceiling <= 0.0 {
            return 0.0;
        }

        let overrun = (price - ceiling) / ceiling;
        if overrun >= BUDGET_OVERRUN_TOLERANCE {
            0.0
        } else {
            1.0 - overrun / BUDGET_OVERRUN_TOLERANCE
        }
    }

    /// Hard filter expressed as a score so it composes uniformly. The ranker
    /// treats 0.0 as exclusion, never as a mere down-weight.
    fn dietary_fit(&self, profile: &PreferenceProfile, product: &Product) -> f64 {
        if self.rules.violation(&profile.dietary_restrictions, product).is_some() {
            0.0
        } else {
            1.0
        }
    }

    /// Human-readable criterion highlights for downstream display, most
    /// relevant first, capped at three.
    pub fn reasons(
        &self,
        profile: &PreferenceProfile,
        product: &Product,
        components: &ComponentScores,
    ) -> Vec<String> {
        let mut reasons = Vec::new();

        if components.preference_match > 0.0 {
            let text = product.searchable_text();
            let matched = profile
                .preference_keywords
                .iter()
                .filter(|keyword| text.contains(keyword.as_str()))
                .take(3)
                .cloned()
                .collect::<Vec<_>>();
            reasons.push(format!("Matches your taste for {}", matched.join(", ")));
        }

        if components.mood_match > 0.0 {
            let moods = profile
                .mood_tags
                .intersection(&product.mood_tags)
                .cloned()
                .collect::<Vec<_>>();
            reasons.push(format!("Fits your {} mood", moods.join("/")));
        }

        if let Some(ceiling) = profile.budget_ceiling {
            if components.budget_fit >= 1.0 {
                reasons.push(format!("Within your ${ceiling} budget"));
            }
        }

        if !profile.dietary_restrictions.is_empty() && components.dietary_fit >= 1.0 {
            let needs =
                profile.dietary_restrictions.iter().cloned().collect::<Vec<_>>().join(", ");
            reasons.push(format!("Safe for your {needs} needs"));
        }

        if product.chef_special {
            reasons.push("Chef's special".to_owned());
        }
        if product.limited_time {
            reasons.push("Limited-time item".to_owned());
        }
        if product.popularity_score > 80 {
            reasons.push("Crowd favorite".to_owned());
        }

        if reasons.is_empty() {
            reasons.push("Suggested from your conversation so far".to_owned());
        }

        reasons.truncate(3);
        reasons
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use crate::domain::product::{Product, ProductId};
    use crate::domain::session::PreferenceProfile;

    use super::MatchScorer;

    fn product(name: &str, price_cents: i64) -> Product {
        Product {
            id: ProductId(name.to_lowercase().replace(' ', "-")),
            name: name.to_owned(),
            category: "Mains".to_owned(),
            description: String::new(),
            ingredients: Vec::new(),
            price: Decimal::new(price_cents, 2),
            dietary_tags: BTreeSet::new(),
            mood_tags: BTreeSet::new(),
            allergens: BTreeSet::new(),
            spice_level: 0,
            popularity_score: 50,
            chef_special: false,
            limited_time: false,
        }
    }

    fn profile() -> PreferenceProfile {
        PreferenceProfile::default()
    }

    #[test]
    fn budget_fit_is_full_within_ceiling_and_without_one() {
        let scorer = MatchScorer::default();
        let mut profile = profile();

        let cheap = product("Salad", 900);
        assert_eq!(scorer.component_scores(&profile, &cheap).budget_fit, 1.0);

        profile.budget_ceiling = Some(Decimal::new(1500, 2));
        assert_eq!(scorer.component_scores(&profile, &cheap).budget_fit, 1.0);
    }

    #[test]
    fn budget_fit_decays_linearly_past_the_ceiling() {
        let scorer = MatchScorer::default();
        let mut profile = profile();
        profile.budget_ceiling = Some(Decimal::new(1500, 2));

        // $20 over a $15 ceiling: a third of the tolerated overrun remains.
        let over = product("Steak Frites", 2000);
        let fit = scorer.component_scores(&profile, &over).budget_fit;
        assert!((fit - (1.0 - (5.0 / 15.0) / 0.5)).abs() < 1e-9);

        // 50% past the ceiling and beyond floors at zero.
        let far_over = product("Tomahawk", 2250);
        assert_eq!(scorer.component_scores(&profile, &far_over).budget_fit, 0.0);
    }

    #[test]
    fn mood_match_is_jaccard_overlap() {
        let scorer = MatchScorer::default();
        let mut profile = profile();
        profile.mood_tags = ["comfort".to_owned(), "indulgent".to_owned()].into();

        let mut burger = product("Burger", 1200);
        burger.mood_tags = ["comfort".to_owned(), "quick".to_owned()].into();

        // |{comfort}| / |{comfort, indulgent, quick}|
        let score = scorer.component_scores(&profile, &burger).mood_match;
        assert!((score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn preference_match_is_the_matched_fraction() {
        let scorer = MatchScorer::default();
        let mut profile = profile();
        profile.preference_keywords = ["spicy".to_owned(), "korean".to_owned(), "tofu".to_owned()].into();

        let mut bowl = product("Seoul Bowl", 1200);
        bowl.description = "spicy Korean rice bowl".to_owned();

        let score = scorer.component_scores(&profile, &bowl).preference_match;
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn composite_uses_default_weights() {
        let scorer = MatchScorer::default();
        let components = super::ComponentScores {
            preference_match: 1.0,
            mood_match: 0.5,
            budget_fit: 1.0,
            dietary_fit: 1.0,
        };

        // 0.35 + 0.125 + 0.20 + 0.20
        assert!((scorer.composite(&components) - 0.875).abs() < 1e-9);
    }

    #[test]
    fn flags_surface_in_reasons_without_affecting_score() {
        let scorer = MatchScorer::default();
        let profile = profile();

        let mut plain = product("Cake", 700);
        let baseline = scorer.composite(&scorer.component_scores(&profile, &plain));
        plain.chef_special = true;
        plain.limited_time = true;
        let flagged = scorer.composite(&scorer.component_scores(&profile, &plain));

        assert_eq!(baseline, flagged);
        let reasons = scorer.reasons(&profile, &plain, &scorer.component_scores(&profile, &plain));
        assert!(reasons.iter().any(|reason| reason.contains("Chef's special")));
        assert!(reasons.iter().any(|reason| reason.contains("Limited-time")));
    }
}
