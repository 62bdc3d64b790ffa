//! Turn sequencing: terminal-outcome decisions and ranking triggers.

use serde::{Deserialize, Serialize};

use crate::domain::session::{ConversationSession, SessionState, Turn};
use crate::signals::SignalCategory;

/// Score thresholds that end a conversation. Configuration, not constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutcomeThresholds {
    /// Minimum score for an `order_intent` turn to convert the session.
    pub convert_min_score: u8,
    /// Score must be below this for the abandonment rule to apply.
    pub abandon_max_score: u8,
    /// Consecutive net-negative turns required before abandonment.
    pub abandon_streak: u32,
}

impl Default for OutcomeThresholds {
    fn default() -> Self {
        Self { convert_min_score: 30, abandon_max_score: 20, abandon_streak: 3 }
    }
}

/// When a turn should trigger a ranking pass. The quiet-turn bound keeps
/// recommendation latency bounded even for low-signal conversations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggerPolicy {
    pub categories: Vec<SignalCategory>,
    pub max_quiet_turns: u32,
    pub recommendation_limit: usize,
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self {
            categories: vec![
                SignalCategory::OrderIntent,
                SignalCategory::PriceInquiry,
                SignalCategory::MoodIndication,
                SignalCategory::SpecificPreferences,
            ],
            max_quiet_turns: 3,
            recommendation_limit: 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnAssessment {
    pub next_state: SessionState,
    pub trigger_ranking: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ConversationFlow {
    thresholds: OutcomeThresholds,
    trigger: TriggerPolicy,
}

impl ConversationFlow {
    pub fn new(thresholds: OutcomeThresholds, trigger: TriggerPolicy) -> Self {
        Self { thresholds, trigger }
    }

    pub fn recommendation_limit(&self) -> usize {
        self.trigger.recommendation_limit
    }

    /// Assesses the turn just appended to the session: whether the session
    /// ends, and whether a ranking pass should run. Ranking is skipped on an
    /// abandoning turn; a converting turn still ranks so the caller can show
    /// the order candidates.
    pub fn assess(&self, session: &ConversationSession, turn: &Turn) -> TurnAssessment {
        let fired = |category: SignalCategory| {
            turn.signals.iter().any(|signal| signal.category == category)
        };

        let next_state = if fired(SignalCategory::OrderIntent)
            && turn.resulting_score >= self.thresholds.convert_min_score
        {
            SessionState::Converted
        } else if self.trailing_negative_streak(session) >= self.thresholds.abandon_streak
            && turn.resulting_score < self.thresholds.abandon_max_score
        {
            SessionState::Abandoned
        } else {
            SessionState::Active
        };

        let signal_trigger =
            turn.signals.iter().any(|signal| self.trigger.categories.contains(&signal.category));
        let quiet_trigger =
            self.turns_since_ranking(session, turn) >= i64::from(self.trigger.max_quiet_turns);
        let trigger_ranking =
            next_state != SessionState::Abandoned && (signal_trigger || quiet_trigger);

        TurnAssessment { next_state, trigger_ranking }
    }

    fn trailing_negative_streak(&self, session: &ConversationSession) -> u32 {
        session.turns.iter().rev().take_while(|turn| turn.score_delta < 0).count() as u32
    }

    /// A fresh session counts as ranked just before turn 0, so the quiet
    /// bound first fires at sequence `max_quiet_turns - 1`.
    fn turns_since_ranking(&self, session: &ConversationSession, turn: &Turn) -> i64 {
        let last_ranked = session.last_ranked_turn.map_or(-1, i64::from);
        i64::from(turn.sequence) - last_ranked
    }
}
