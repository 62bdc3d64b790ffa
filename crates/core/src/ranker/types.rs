use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::signals::TermGroup;

/// Weights for the four ranking criteria. Tunable; validated to sum to 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingWeights {
    pub preference: f64,
    pub mood: f64,
    pub budget: f64,
    pub dietary: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

impl RankingWeights {
    pub fn sum(&self) -> f64 {
        self.preference + self.mood + self.budget + self.dietary
    }
}

/// Per-criterion sub-scores, each normalized to [0, 1] before weighting.
/// Kept on every recommendation for explainability and testing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub preference_match: f64,
    pub mood_match: f64,
    pub budget_fit: f64,
    pub dietary_fit: f64,
}

/// A ranked product with its composite score and scoring breakdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub popularity_score: u8,
    pub score: f64,
    pub breakdown: ComponentScores,
    pub reasons: Vec<String>,
    pub chef_special: bool,
    pub limited_time: bool,
}

/// How a product violates a stated dietary restriction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DietaryViolation {
    pub restriction: String,
    pub detail: String,
}

/// Dietary compatibility rules: per-restriction ingredient exclusions plus
/// the restrictions that require an explicit product tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DietaryRules {
    pub exclusions: Vec<TermGroup>,
    pub strict_tags: Vec<String>,
}

impl Default for DietaryRules {
    fn default() -> Self {
        let exclusions = vec![
            group(
                "vegetarian",
                &[
                    "beef", "pork", "chicken", "turkey", "fish", "shrimp", "seafood", "meat",
                    "bacon", "ham", "sausage",
                ],
            ),
            group(
                "vegan",
                &[
                    "beef", "pork", "chicken", "turkey", "fish", "shrimp", "seafood", "meat",
                    "bacon", "ham", "sausage", "cheese", "milk", "butter", "cream", "egg",
                    "honey", "yogurt",
                ],
            ),
            group(
                "gluten-free",
                &["wheat", "gluten", "bread", "bun", "pasta", "noodle", "flour", "barley", "rye"],
            ),
            group("dairy-free", &["milk", "cheese", "butter", "cream", "yogurt"]),
            group("keto", &["bread", "bun", "pasta", "rice", "potato", "sugar", "flour"]),
            group("low-carb", &["bread", "bun", "pasta", "rice", "potato", "sugar", "flour"]),
        ];

        Self {
            exclusions,
            strict_tags: vec!["vegetarian".to_owned(), "vegan".to_owned()],
        }
    }
}

fn group(canonical: &str, triggers: &[&str]) -> TermGroup {
    TermGroup {
        canonical: canonical.to_owned(),
        triggers: triggers.iter().map(|trigger| (*trigger).to_owned()).collect(),
    }
}

impl DietaryRules {
    /// First violated restriction, if any. A product satisfies a restriction
    /// outright when it carries the matching dietary tag; otherwise it is
    /// checked against allergens, excluded ingredients in its text, and the
    /// strict-tag requirement.
    pub fn violation(
        &self,
        restrictions: &BTreeSet<String>,
        product: &Product,
    ) -> Option<DietaryViolation> {
        let text = product.searchable_text();

        for restriction in restrictions {
            let restriction = restriction.to_lowercase();

            if product.dietary_tags.iter().any(|tag| tag.eq_ignore_ascii_case(&restriction)) {
                continue;
            }

            if product.allergens.iter().any(|allergen| allergen.eq_ignore_ascii_case(&restriction))
            {
                return Some(DietaryViolation {
                    restriction: restriction.clone(),
                    detail: format!("listed allergen {restriction}"),
                });
            }

            let excluded = self
                .exclusions
                .iter()
                .find(|group| group.canonical == restriction)
                .and_then(|group| {
                    group.triggers.iter().find(|ingredient| text.contains(ingredient.as_str()))
                });
            if let Some(ingredient) = excluded {
                return Some(DietaryViolation {
                    restriction: restriction.clone(),
                    detail: format!("contains {ingredient}"),
                });
            }

            if self.strict_tags.iter().any(|tag| tag == &restriction) {
                return Some(DietaryViolation {
                    restriction: restriction.clone(),
                    detail: format!("not tagged {restriction}"),
                });
            }
        }

        None
    }
}
