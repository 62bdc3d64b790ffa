//! Typed catalog boundary.
//!
//! Products arrive here fully resolved (tag sets, not raw strings), so the
//! ranker never re-parses catalog data. The engine re-scores whatever
//! candidate slice it is handed; pre-filtering is the caller's choice.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

/// Lookup filter for the catalog collaborator interface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Product must carry every requested dietary tag.
    pub dietary_tags: Vec<String>,
    /// Product must share at least one requested mood tag.
    pub mood_tags: Vec<String>,
    pub min_spice: Option<u8>,
    pub max_spice: Option<u8>,
    pub chef_special: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn search(&self, filter: &CatalogFilter) -> Vec<&Product> {
        self.products.iter().filter(|product| matches_filter(product, filter)).collect()
    }
}

fn matches_filter(product: &Product, filter: &CatalogFilter) -> bool {
    if let Some(category) = &filter.category {
        if !product.category.eq_ignore_ascii_case(category) {
            return false;
        }
    }
    if let Some(min_price) = filter.min_price {
        if product.price < min_price {
            return false;
        }
    }
    if let Some(max_price) = filter.max_price {
        if product.price > max_price {
            return false;
        }
    }
    if !filter.dietary_tags.iter().all(|tag| {
        product.dietary_tags.iter().any(|product_tag| product_tag.eq_ignore_ascii_case(tag))
    }) {
        return false;
    }
    if !filter.mood_tags.is_empty()
        && !filter.mood_tags.iter().any(|tag| {
            product.mood_tags.iter().any(|product_tag| product_tag.eq_ignore_ascii_case(tag))
        })
    {
        return false;
    }
    if let Some(min_spice) = filter.min_spice {
        if product.spice_level < min_spice {
            return false;
        }
    }
    if let Some(max_spice) = filter.max_spice {
        if product.spice_level > max_spice {
            return false;
        }
    }
    if let Some(chef_special) = filter.chef_special {
        if product.chef_special != chef_special {
            return false;
        }
    }

    true
}

/// Deterministic demo seed backing the CLI and the integration tests.
#[derive(Debug, Clone, Copy)]
struct ProductSeed {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    description: &'static str,
    ingredients: &'static [&'static str],
    price_cents: i64,
    dietary_tags: &'static [&'static str],
    mood_tags: &'static [&'static str],
    allergens: &'static [&'static str],
    spice_level: u8,
    popularity_score: u8,
    chef_special: bool,
    limited_time: bool,
}

const PRODUCT_SEEDS: &[ProductSeed] = &[
    ProductSeed {
        id: "prod_bbq_burger",
        name: "Smoky BBQ Burger",
        category: "Burgers",
        description: "Charred beef patty with bacon and smoked cheddar",
        ingredients: &["beef patty", "bacon", "cheddar", "brioche bun"],
        price_cents: 1290,
        dietary_tags: &[],
        mood_tags: &["comfort", "indulgent"],
        allergens: &["gluten", "dairy"],
        spice_level: 3,
        popularity_score: 88,
        chef_special: false,
        limited_time: false,
    },
    ProductSeed {
        id: "prod_halloumi_burger",
        name: "Garden Halloumi Burger",
        category: "Burgers",
        description: "Grilled halloumi with charred peppers",
        ingredients: &["halloumi", "peppers", "brioche bun"],
        price_cents: 1150,
        dietary_tags: &["vegetarian"],
        mood_tags: &["comfort"],
        allergens: &["gluten", "dairy"],
        spice_level: 1,
        popularity_score: 72,
        chef_special: false,
        limited_time: false,
    },
    ProductSeed {
        id: "prod_korean_chicken",
        name: "Fiery Korean Chicken",
        category: "Chicken",
        description: "Gochujang-glazed Korean fried chicken, spicy and sticky",
        ingredients: &["chicken", "gochujang", "sesame"],
        price_cents: 1380,
        dietary_tags: &[],
        mood_tags: &["adventurous", "indulgent"],
        allergens: &["sesame"],
        spice_level: 8,
        popularity_score: 91,
        chef_special: true,
        limited_time: false,
    },
    ProductSeed {
        id: "prod_tofu_bibimbap",
        name: "Seoul Tofu Bibimbap",
        category: "Bowls",
        description: "Spicy Korean rice bowl with marinated tofu",
        ingredients: &["tofu", "rice", "gochujang", "spinach", "carrot"],
        price_cents: 1240,
        dietary_tags: &["vegetarian", "vegan", "dairy-free"],
        mood_tags: &["adventurous", "healthy"],
        allergens: &["soy"],
        spice_level: 6,
        popularity_score: 78,
        chef_special: false,
        limited_time: false,
    },
    ProductSeed {
        id: "prod_margherita",
        name: "Margherita Pizza",
        category: "Pizza",
        description: "Wood-fired pizza with basil and mozzarella",
        ingredients: &["pizza dough", "tomato", "mozzarella", "basil"],
        price_cents: 1090,
        dietary_tags: &["vegetarian"],
        mood_tags: &["comfort"],
        allergens: &["gluten", "dairy"],
        spice_level: 0,
        popularity_score: 85,
        chef_special: false,
        limited_time: false,
    },
    ProductSeed {
        id: "prod_quinoa_salad",
        name: "Citrus Quinoa Salad",
        category: "Salads",
        description: "Quinoa, avocado, and citrus with a herb dressing",
        ingredients: &["quinoa", "avocado", "orange", "herbs"],
        price_cents: 960,
        dietary_tags: &["vegetarian", "vegan", "gluten-free", "dairy-free"],
        mood_tags: &["healthy", "quick"],
        allergens: &[],
        spice_level: 0,
        popularity_score: 64,
        chef_special: false,
        limited_time: false,
    },
    ProductSeed {
        id: "prod_truffle_pasta",
        name: "Truffle Mushroom Pasta",
        category: "Pasta",
        description: "Tagliatelle with porcini and shaved truffle",
        ingredients: &["pasta", "porcini", "truffle", "parmesan"],
        price_cents: 1680,
        dietary_tags: &["vegetarian"],
        mood_tags: &["fancy", "indulgent"],
        allergens: &["gluten", "dairy"],
        spice_level: 0,
        popularity_score: 69,
        chef_special: true,
        limited_time: false,
    },
    ProductSeed {
        id: "prod_fish_tacos",
        name: "Baja Fish Tacos",
        category: "Tacos",
        description: "Crispy fish tacos with lime crema",
        ingredients: &["fish", "tortilla", "cabbage", "lime crema"],
        price_cents: 1120,
        dietary_tags: &[],
        mood_tags: &["adventurous", "quick"],
        allergens: &["fish", "gluten", "dairy"],
        spice_level: 4,
        popularity_score: 81,
        chef_special: false,
        limited_time: true,
    },
    ProductSeed {
        id: "prod_lava_cake",
        name: "Molten Chocolate Cake",
        category: "Desserts",
        description: "Warm chocolate cake with a liquid center",
        ingredients: &["chocolate", "flour", "butter", "egg"],
        price_cents: 750,
        dietary_tags: &["vegetarian"],
        mood_tags: &["indulgent"],
        allergens: &["gluten", "dairy", "egg"],
        spice_level: 0,
        popularity_score: 90,
        chef_special: false,
        limited_time: false,
    },
    ProductSeed {
        id: "prod_mango_tea",
        name: "Mango Iced Tea",
        category: "Drinks",
        description: "Cold-brewed black tea with mango",
        ingredients: &["black tea", "mango", "mint"],
        price_cents: 420,
        dietary_tags: &["vegetarian", "vegan", "gluten-free", "dairy-free"],
        mood_tags: &["quick"],
        allergens: &[],
        spice_level: 0,
        popularity_score: 58,
        chef_special: false,
        limited_time: false,
    },
];

pub fn demo_catalog() -> Catalog {
    let products = PRODUCT_SEEDS
        .iter()
        .map(|seed| Product {
            id: ProductId(seed.id.to_owned()),
            name: seed.name.to_owned(),
            category: seed.category.to_owned(),
            description: seed.description.to_owned(),
            ingredients: seed.ingredients.iter().map(|i| (*i).to_owned()).collect(),
            price: Decimal::new(seed.price_cents, 2),
            dietary_tags: seed.dietary_tags.iter().map(|t| (*t).to_owned()).collect(),
            mood_tags: seed.mood_tags.iter().map(|t| (*t).to_owned()).collect(),
            allergens: seed.allergens.iter().map(|a| (*a).to_owned()).collect(),
            spice_level: seed.spice_level,
            popularity_score: seed.popularity_score,
            chef_special: seed.chef_special,
            limited_time: seed.limited_time,
        })
        .collect();

    Catalog::new(products)
}
