//! Interest-score aggregation: weight summation, clamping, turn history.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::session::{ConversationSession, Turn};
use crate::errors::EngineError;
use crate::signals::{PreferenceUpdate, SignalCategory, SignalMatch};

/// Fixed per-category score deltas. Engagement categories are positive,
/// friction categories negative; validation enforces the sign convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalWeights {
    pub specific_preferences: i32,
    pub dietary_restrictions: i32,
    pub budget_mention: i32,
    pub mood_indication: i32,
    pub question_asking: i32,
    pub enthusiasm_words: i32,
    pub price_inquiry: i32,
    pub order_intent: i32,
    pub hesitation: i32,
    pub budget_concern: i32,
    pub dietary_conflict: i32,
    pub rejection: i32,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            specific_preferences: 15,
            dietary_restrictions: 10,
            budget_mention: 5,
            mood_indication: 20,
            question_asking: 10,
            enthusiasm_words: 8,
            price_inquiry: 25,
            order_intent: 30,
            hesitation: -10,
            budget_concern: -15,
            dietary_conflict: -20,
            rejection: -25,
        }
    }
}

impl SignalWeights {
    pub fn for_category(&self, category: SignalCategory) -> i32 {
        match category {
            SignalCategory::SpecificPreferences => self.specific_preferences,
            SignalCategory::DietaryRestrictions => self.dietary_restrictions,
            SignalCategory::BudgetMention => self.budget_mention,
            SignalCategory::MoodIndication => self.mood_indication,
            SignalCategory::QuestionAsking => self.question_asking,
            SignalCategory::EnthusiasmWords => self.enthusiasm_words,
            SignalCategory::PriceInquiry => self.price_inquiry,
            SignalCategory::OrderIntent => self.order_intent,
            SignalCategory::Hesitation => self.hesitation,
            SignalCategory::BudgetConcern => self.budget_concern,
            SignalCategory::DietaryConflict => self.dietary_conflict,
            SignalCategory::Rejection => self.rejection,
        }
    }
}

pub const SCORE_FLOOR: i32 = 0;
pub const SCORE_CEILING: i32 = 100;

#[derive(Clone, Debug, Default)]
pub struct ScoreAggregator {
    weights: SignalWeights,
}

impl ScoreAggregator {
    pub fn new(weights: SignalWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &SignalWeights {
        &self.weights
    }

    /// Applies one utterance worth of signals: sums all fired deltas, clamps
    /// the running score to [0, 100], appends an immutable Turn (pre-clamp
    /// delta retained), and merges the preference update into the profile.
    pub fn apply(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
        signals: Vec<SignalMatch>,
        update: PreferenceUpdate,
    ) -> Result<Turn, EngineError> {
        if utterance.trim().is_empty() {
            return Err(EngineError::invalid_input("utterance is empty or whitespace-only"));
        }

        self.record(session, utterance.to_owned(), signals, update)
    }

    /// Caller-asserted dietary conflict: the one category that is never
    /// detected from text. Records a turn whose single signal carries the
    /// violated restriction and the offending product as evidence.
    pub fn apply_conflict(
        &self,
        session: &mut ConversationSession,
        product_name: &str,
        restriction: &str,
    ) -> Result<Turn, EngineError> {
        let signal = SignalMatch {
            category: SignalCategory::DietaryConflict,
            evidence: format!("{restriction} vs {product_name}"),
        };
        self.record(
            session,
            product_name.to_owned(),
            vec![signal],
            PreferenceUpdate::default(),
        )
    }

    fn record(
        &self,
        session: &mut ConversationSession,
        utterance: String,
        signals: Vec<SignalMatch>,
        update: PreferenceUpdate,
    ) -> Result<Turn, EngineError> {
        if session.is_closed() {
            return Err(EngineError::session_closed(session.id.clone(), session.state));
        }

        let mut seen = BTreeSet::new();
        let score_delta: i32 = signals
            .iter()
            .filter(|signal| seen.insert(signal.category))
            .map(|signal| self.weights.for_category(signal.category))
            .sum();

        let resulting_score = (i32::from(session.interest_score) + score_delta)
            .clamp(SCORE_FLOOR, SCORE_CEILING) as u8;

        let turn = Turn {
            sequence: session.next_sequence(),
            utterance,
            signals,
            score_delta,
            resulting_score,
        };

        session.turns.push(turn.clone());
        session.interest_score = resulting_score;
        session.preferences.preference_keywords.extend(update.preference_keywords);
        session.preferences.category_hints.extend(update.category_hints);
        session.preferences.dietary_restrictions.extend(update.dietary);
        session.preferences.mood_tags.extend(update.moods);
        if update.budget_ceiling.is_some() {
            session.preferences.budget_ceiling = update.budget_ceiling;
        }
        session.last_updated_at = chrono::Utc::now();

        Ok(turn)
    }
}
