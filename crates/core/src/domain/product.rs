use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// Catalog item as resolved at the catalog boundary: tag fields are typed
/// sets, never raw comma-joined strings, so scoring code does no re-parsing.
/// Read-only to the engine; the catalog collaborator owns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub price: Decimal,
    pub dietary_tags: BTreeSet<String>,
    pub mood_tags: BTreeSet<String>,
    pub allergens: BTreeSet<String>,
    pub spice_level: u8,
    pub popularity_score: u8,
    pub chef_special: bool,
    pub limited_time: bool,
}

impl Product {
    /// Lowercased name + description + ingredients, the haystack used for
    /// preference matching and dietary exclusion checks.
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(
            self.name.len() + self.description.len() + self.ingredients.len() * 12,
        );
        text.push_str(&self.name.to_lowercase());
        text.push(' ');
        text.push_str(&self.description.to_lowercase());
        for ingredient in &self.ingredients {
            text.push(' ');
            text.push_str(&ingredient.to_lowercase());
        }
        text
    }
}
