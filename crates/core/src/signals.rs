//! Fixed-vocabulary signal detection over single utterances.
//!
//! Extraction is pure and history-free: the same utterance always yields the
//! same signal set, and neutral chit-chat yielding nothing is the common
//! case, not an error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    SpecificPreferences,
    DietaryRestrictions,
    BudgetMention,
    MoodIndication,
    QuestionAsking,
    EnthusiasmWords,
    PriceInquiry,
    OrderIntent,
    Hesitation,
    BudgetConcern,
    DietaryConflict,
    Rejection,
}

impl SignalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpecificPreferences => "specific_preferences",
            Self::DietaryRestrictions => "dietary_restrictions",
            Self::BudgetMention => "budget_mention",
            Self::MoodIndication => "mood_indication",
            Self::QuestionAsking => "question_asking",
            Self::EnthusiasmWords => "enthusiasm_words",
            Self::PriceInquiry => "price_inquiry",
            Self::OrderIntent => "order_intent",
            Self::Hesitation => "hesitation",
            Self::BudgetConcern => "budget_concern",
            Self::DietaryConflict => "dietary_conflict",
            Self::Rejection => "rejection",
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Self::Hesitation | Self::BudgetConcern | Self::DietaryConflict | Self::Rejection
        )
    }
}

impl std::fmt::Display for SignalCategory {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A detected category plus the lexical evidence that fired it. A category
/// fires at most once per utterance; multi-trigger hits are folded into a
/// single match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalMatch {
    pub category: SignalCategory,
    pub evidence: String,
}

/// A canonical tag with the phrases that map to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermGroup {
    pub canonical: String,
    pub triggers: Vec<String>,
}

impl TermGroup {
    fn new(canonical: &str, triggers: &[&str]) -> Self {
        Self {
            canonical: canonical.to_owned(),
            triggers: triggers.iter().map(|trigger| (*trigger).to_owned()).collect(),
        }
    }
}

/// The full detection lexicon. Lives in configuration so deployments can
/// tune vocabulary without touching detection code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalVocabulary {
    pub preference_keywords: Vec<String>,
    pub category_terms: Vec<TermGroup>,
    pub dietary_terms: Vec<TermGroup>,
    pub mood_terms: Vec<TermGroup>,
    pub mood_cues: Vec<String>,
    pub enthusiasm_keywords: Vec<String>,
    pub question_cues: Vec<String>,
    pub price_inquiry_phrases: Vec<String>,
    pub order_intent_phrases: Vec<String>,
    pub hesitation_phrases: Vec<String>,
    pub budget_concern_phrases: Vec<String>,
    pub rejection_phrases: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| (*word).to_owned()).collect()
}

impl Default for SignalVocabulary {
    fn default() -> Self {
        Self {
            preference_keywords: owned(&[
                "spicy", "mild", "hot", "korean", "mexican", "italian", "chinese", "thai",
                "japanese", "burger", "pizza", "taco", "tacos", "salad", "pasta", "noodles",
                "chicken", "beef", "tofu", "seafood", "dessert", "chocolate", "crispy", "juicy",
                "creamy", "crunchy", "sweet", "salty", "savory", "vegetarian", "vegan",
            ]),
            category_terms: vec![
                TermGroup::new("burgers", &["burger", "hamburger", "cheeseburger"]),
                TermGroup::new("pizza", &["pizza", "margherita", "pepperoni"]),
                TermGroup::new("tacos", &["taco", "tacos", "burrito", "quesadilla"]),
                TermGroup::new(
                    "desserts",
                    &["dessert", "cake", "ice cream", "cookie", "chocolate", "pie"],
                ),
                TermGroup::new("salads", &["salad", "caesar", "greens"]),
                TermGroup::new("drinks", &["drink", "beverage", "soda", "juice", "coffee", "tea"]),
                TermGroup::new("pasta", &["pasta", "spaghetti", "lasagna", "noodles"]),
                TermGroup::new("chicken", &["chicken", "wings", "nuggets"]),
                TermGroup::new("seafood", &["fish", "shrimp", "salmon", "seafood", "lobster"]),
                TermGroup::new("bowls", &["bowl", "bibimbap", "rice bowl"]),
            ],
            dietary_terms: vec![
                TermGroup::new(
                    "vegetarian",
                    &["vegetarian", "veggie", "no meat", "plant-based"],
                ),
                TermGroup::new("vegan", &["vegan"]),
                TermGroup::new(
                    "gluten-free",
                    &["gluten-free", "gluten free", "no gluten", "celiac"],
                ),
                TermGroup::new(
                    "dairy-free",
                    &["dairy-free", "dairy free", "no dairy", "lactose intolerant"],
                ),
                TermGroup::new("keto", &["keto", "ketogenic"]),
                TermGroup::new("low-carb", &["low-carb", "low carb"]),
            ],
            mood_terms: vec![
                TermGroup::new(
                    "adventurous",
                    &["adventurous", "adventure", "try something new", "daring"],
                ),
                TermGroup::new("comfort", &["comfort", "comforting", "cozy", "familiar"]),
                TermGroup::new("healthy", &["healthy", "light", "fresh", "clean"]),
                TermGroup::new(
                    "indulgent",
                    &["indulgent", "rich", "decadent", "treat myself"],
                ),
                TermGroup::new("quick", &["quick", "fast", "in a hurry"]),
                TermGroup::new("fancy", &["fancy", "special", "gourmet", "celebrate"]),
            ],
            mood_cues: owned(&["feeling", "craving", "mood", "want something", "in the mood"]),
            enthusiasm_keywords: owned(&[
                "amazing",
                "perfect",
                "awesome",
                "fantastic",
                "excellent",
                "wonderful",
                "delicious",
                "yummy",
                "tasty",
                "great",
                "sounds good",
            ]),
            question_cues: owned(&[
                "what",
                "how",
                "which",
                "why",
                "when",
                "where",
                "can you",
                "do you have",
                "is it",
                "does it",
            ]),
            price_inquiry_phrases: owned(&[
                "how much",
                "what does it cost",
                "what's the price",
                "price",
                "cost",
            ]),
            order_intent_phrases: owned(&[
                "i'll take",
                "i'll have",
                "i'll order",
                "i'll go with",
                "let's go with",
                "add to cart",
                "i want that",
                "get me",
                "give me",
                "sounds perfect",
                "order it",
                "place the order",
            ]),
            hesitation_phrases: owned(&[
                "maybe",
                "not sure",
                "hmm",
                "perhaps",
                "possibly",
                "might",
                "i think",
                "could be",
            ]),
            budget_concern_phrases: owned(&[
                "too expensive",
                "too much",
                "too pricey",
                "expensive",
                "pricey",
                "costly",
                "can't afford",
                "out of my budget",
                "over my budget",
            ]),
            rejection_phrases: owned(&[
                "i don't like",
                "don't like",
                "not interested",
                "no thanks",
                "don't want",
                "not for me",
                "hate",
                "dislike",
                "gross",
                "something else",
            ]),
        }
    }
}

/// Per-utterance profile deltas extracted alongside the signal set. The
/// aggregator merges these into the session's preference profile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreferenceUpdate {
    pub preference_keywords: BTreeSet<String>,
    pub category_hints: BTreeSet<String>,
    pub dietary: BTreeSet<String>,
    pub moods: BTreeSet<String>,
    pub budget_ceiling: Option<Decimal>,
}

#[derive(Clone, Debug, Default)]
pub struct SignalExtractor {
    vocabulary: SignalVocabulary,
}

impl SignalExtractor {
    pub fn new(vocabulary: SignalVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &SignalVocabulary {
        &self.vocabulary
    }

    /// Detects every firing category in one utterance, at most one match per
    /// category. `dietary_conflict` is never produced here; it is asserted by
    /// the caller when a product under discussion violates a stated
    /// restriction.
    pub fn extract(&self, utterance: &str) -> Vec<SignalMatch> {
        let normalized = normalize(utterance);
        let tokens = tokenize(&normalized);
        let mut matches = Vec::new();

        let mut push = |category: SignalCategory, evidence: Vec<String>| {
            if !evidence.is_empty() {
                matches.push(SignalMatch { category, evidence: evidence.join(", ") });
            }
        };

        push(
            SignalCategory::SpecificPreferences,
            matched_triggers(&self.vocabulary.preference_keywords, &normalized, &tokens),
        );
        push(
            SignalCategory::DietaryRestrictions,
            matched_group_triggers(&self.vocabulary.dietary_terms, &normalized, &tokens),
        );
        if let Some((_, evidence)) = parse_budget(&tokens) {
            push(SignalCategory::BudgetMention, vec![evidence]);
        }

        let mut mood_evidence =
            matched_group_triggers(&self.vocabulary.mood_terms, &normalized, &tokens);
        mood_evidence.extend(matched_triggers(&self.vocabulary.mood_cues, &normalized, &tokens));
        push(SignalCategory::MoodIndication, mood_evidence);

        let mut question_evidence = Vec::new();
        if utterance.contains('?') {
            question_evidence.push("?".to_owned());
        } else {
            question_evidence =
                matched_triggers(&self.vocabulary.question_cues, &normalized, &tokens);
        }
        push(SignalCategory::QuestionAsking, question_evidence);

        let mut enthusiasm_evidence =
            matched_triggers(&self.vocabulary.enthusiasm_keywords, &normalized, &tokens);
        if utterance.contains('!') {
            enthusiasm_evidence.push("!".to_owned());
        }
        push(SignalCategory::EnthusiasmWords, enthusiasm_evidence);

        push(
            SignalCategory::PriceInquiry,
            matched_triggers(&self.vocabulary.price_inquiry_phrases, &normalized, &tokens),
        );
        push(
            SignalCategory::OrderIntent,
            matched_triggers(&self.vocabulary.order_intent_phrases, &normalized, &tokens),
        );
        push(
            SignalCategory::Hesitation,
            matched_triggers(&self.vocabulary.hesitation_phrases, &normalized, &tokens),
        );
        push(
            SignalCategory::BudgetConcern,
            matched_triggers(&self.vocabulary.budget_concern_phrases, &normalized, &tokens),
        );
        push(
            SignalCategory::Rejection,
            matched_triggers(&self.vocabulary.rejection_phrases, &normalized, &tokens),
        );

        matches
    }

    /// Profile deltas carried by the utterance: canonical dietary and mood
    /// tags, matched preference keywords, and a parsed budget ceiling.
    pub fn preference_update(&self, utterance: &str) -> PreferenceUpdate {
        let normalized = normalize(utterance);
        let tokens = tokenize(&normalized);

        PreferenceUpdate {
            preference_keywords: matched_triggers(
                &self.vocabulary.preference_keywords,
                &normalized,
                &tokens,
            )
            .into_iter()
            .collect(),
            category_hints: matched_canonicals(
                &self.vocabulary.category_terms,
                &normalized,
                &tokens,
            ),
            dietary: matched_canonicals(&self.vocabulary.dietary_terms, &normalized, &tokens),
            moods: matched_canonicals(&self.vocabulary.mood_terms, &normalized, &tokens),
            budget_ceiling: parse_budget(&tokens).map(|(ceiling, _)| ceiling),
        }
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace('\u{2019}', "'")
}

/// Splits on everything except the characters money and contractions need.
fn tokenize(normalized: &str) -> Vec<String> {
    let mut sanitized = String::with_capacity(normalized.len());
    for character in normalized.chars() {
        if character.is_alphanumeric() || matches!(character, '$' | '\'' | '-' | '.') {
            sanitized.push(character);
        } else {
            sanitized.push(' ');
        }
    }

    sanitized
        .split_whitespace()
        .map(|token| token.trim_matches(|character| matches!(character, '.' | '-' | '\'')))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Single-word triggers match whole tokens; phrases match as substrings of
/// the normalized utterance.
fn matched_triggers(triggers: &[String], normalized: &str, tokens: &[String]) -> Vec<String> {
    triggers
        .iter()
        .filter(|trigger| trigger_hits(trigger, normalized, tokens))
        .cloned()
        .collect()
}

fn matched_group_triggers(groups: &[TermGroup], normalized: &str, tokens: &[String]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|group| group.triggers.iter())
        .filter(|trigger| trigger_hits(trigger, normalized, tokens))
        .cloned()
        .collect()
}

fn matched_canonicals(
    groups: &[TermGroup],
    normalized: &str,
    tokens: &[String],
) -> BTreeSet<String> {
    groups
        .iter()
        .filter(|group| {
            group.triggers.iter().any(|trigger| trigger_hits(trigger, normalized, tokens))
        })
        .map(|group| group.canonical.clone())
        .collect()
}

fn trigger_hits(trigger: &str, normalized: &str, tokens: &[String]) -> bool {
    if trigger.contains(' ') {
        normalized.contains(trigger)
    } else {
        tokens.iter().any(|token| token == trigger)
    }
}

const BUDGET_CONTEXT_WORDS: &[&str] = &["under", "below", "max", "budget", "spend", "cap", "than"];

/// A currency amount, or a bare number preceded by a budget context word
/// ("under 15"). Returns the ceiling and the evidence text.
fn parse_budget(tokens: &[String]) -> Option<(Decimal, String)> {
    for (index, token) in tokens.iter().enumerate() {
        let context =
            index > 0 && BUDGET_CONTEXT_WORDS.contains(&tokens[index - 1].as_str());
        if token.starts_with('$') || context {
            if let Some(cents) = parse_money_token(token) {
                let evidence = if context {
                    format!("{} {token}", tokens[index - 1])
                } else {
                    token.clone()
                };
                return Some((Decimal::new(cents, 2), evidence));
            }
        }
    }
    None
}

fn parse_money_token(token: &str) -> Option<i64> {
    let trimmed = token.trim_start_matches('$');
    if trimmed.is_empty() {
        return None;
    }

    let (number_part, multiplier) = if let Some(prefix) = trimmed.strip_suffix('k') {
        (prefix, 1_000.0)
    } else {
        (trimmed, 1.0)
    };

    let amount = number_part.parse::<f64>().ok()?;
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    Some((amount * multiplier * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{PreferenceUpdate, SignalCategory, SignalExtractor};

    fn extractor() -> SignalExtractor {
        SignalExtractor::default()
    }

    fn categories(utterance: &str) -> Vec<SignalCategory> {
        extractor().extract(utterance).into_iter().map(|m| m.category).collect()
    }

    #[test]
    fn preference_statement_fires_preferences_and_dietary_only() {
        let fired = categories("I'm vegetarian and I love spicy Korean food");
        assert_eq!(
            fired,
            vec![SignalCategory::SpecificPreferences, SignalCategory::DietaryRestrictions]
        );
    }

    #[test]
    fn categories_co_fire_in_one_utterance() {
        let fired = categories("I love spicy Korean food, how much is it?");
        assert!(fired.contains(&SignalCategory::SpecificPreferences));
        assert!(fired.contains(&SignalCategory::PriceInquiry));
        assert!(fired.contains(&SignalCategory::QuestionAsking));
    }

    #[test]
    fn order_with_exclamation_carries_enthusiasm() {
        let fired = categories("I'll take it!");
        assert_eq!(
            fired,
            vec![SignalCategory::EnthusiasmWords, SignalCategory::OrderIntent]
        );
    }

    #[test]
    fn neutral_chitchat_yields_empty_set() {
        assert!(categories("See you at noon then.").is_empty());
        assert!(categories("hello there").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let fired = categories("SPICY KOREAN please");
        assert_eq!(fired, vec![SignalCategory::SpecificPreferences]);
    }

    #[test]
    fn question_mark_is_a_structural_cue() {
        assert_eq!(categories("gochujang on this one?"), vec![SignalCategory::QuestionAsking]);
    }

    #[test]
    fn single_word_triggers_do_not_match_inside_longer_words() {
        // "hot" must not fire on "shot", "cost" must not fire on "costume".
        assert!(categories("one shot of espresso in a costume").is_empty());
    }

    #[test]
    fn hesitation_only_utterance() {
        assert_eq!(categories("Hmm, maybe."), vec![SignalCategory::Hesitation]);
    }

    #[test]
    fn budget_mention_with_currency_amount() {
        let matches = extractor().extract("something under $15 would be nice");
        let budget = matches
            .iter()
            .find(|m| m.category == SignalCategory::BudgetMention)
            .expect("budget mention fires");
        assert_eq!(budget.evidence, "under $15");
    }

    #[test]
    fn budget_mention_with_bare_number_after_context_word() {
        let fired = categories("keep it below 12 please");
        assert_eq!(fired, vec![SignalCategory::BudgetMention]);
    }

    #[test]
    fn rejection_and_budget_concern_detected() {
        let fired = categories("no thanks, that's too expensive");
        assert!(fired.contains(&SignalCategory::BudgetConcern));
        assert!(fired.contains(&SignalCategory::Rejection));
    }

    #[test]
    fn dietary_conflict_is_never_text_detected() {
        let fired = categories("that burger conflicts with my diet");
        assert!(!fired.contains(&SignalCategory::DietaryConflict));
    }

    #[test]
    fn preference_update_collects_canonical_tags_and_ceiling() {
        let update: PreferenceUpdate = extractor()
            .preference_update("I'm vegan, feeling adventurous, under $15 gluten free please");

        assert!(update.dietary.contains("vegan"));
        assert!(update.dietary.contains("gluten-free"));
        assert!(update.moods.contains("adventurous"));
        assert_eq!(update.budget_ceiling, Some(Decimal::new(1500, 2)));
    }

    #[test]
    fn preference_update_maps_mentions_to_category_hints() {
        let update = extractor().preference_update("a cheeseburger or maybe fish tacos");

        assert!(update.category_hints.contains("burgers"));
        assert!(update.category_hints.contains("tacos"));
        assert!(update.category_hints.contains("seafood"));
    }

    #[test]
    fn preference_update_is_empty_for_neutral_text() {
        let update = extractor().preference_update("see you tomorrow");
        assert!(update.preference_keywords.is_empty());
        assert!(update.dietary.is_empty());
        assert!(update.moods.is_empty());
        assert!(update.budget_ceiling.is_none());
    }
}
