use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EngineError;
use crate::signals::SignalMatch;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Converted,
    Abandoned,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converted | Self::Abandoned)
    }
}

/// Preferences accumulated across the whole conversation. Tag sets only
/// grow; the budget ceiling is overwritten by the most recent mention.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub preference_keywords: BTreeSet<String>,
    pub category_hints: BTreeSet<String>,
    pub dietary_restrictions: BTreeSet<String>,
    pub mood_tags: BTreeSet<String>,
    pub budget_ceiling: Option<Decimal>,
}

impl PreferenceProfile {
    pub fn is_empty(&self) -> bool {
        self.preference_keywords.is_empty()
            && self.category_hints.is_empty()
            && self.dietary_restrictions.is_empty()
            && self.mood_tags.is_empty()
            && self.budget_ceiling.is_none()
    }
}

/// One processed utterance. Immutable once appended; `score_delta` keeps the
/// pre-clamp sum so the turn history alone can reproduce the running score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub sequence: u32,
    pub utterance: String,
    pub signals: Vec<SignalMatch>,
    pub score_delta: i32,
    pub resulting_score: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: SessionId,
    pub turns: Vec<Turn>,
    pub interest_score: u8,
    pub preferences: PreferenceProfile,
    pub state: SessionState,
    pub last_ranked_turn: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            turns: Vec::new(),
            interest_score: 0,
            preferences: PreferenceProfile::default(),
            state: SessionState::Active,
            last_ranked_turn: None,
            created_at: now,
            last_updated_at: now,
        }
    }

    pub fn start() -> Self {
        Self::new(SessionId(Uuid::new_v4().to_string()))
    }

    pub fn next_sequence(&self) -> u32 {
        self.turns.len() as u32
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn can_transition_to(&self, next: SessionState) -> bool {
        matches!(
            (self.state, next),
            (SessionState::Active, SessionState::Converted)
                | (SessionState::Active, SessionState::Abandoned)
        )
    }

    /// Forward-only state change; terminal states never transition again.
    pub fn transition_to(&mut self, next: SessionState) -> Result<(), EngineError> {
        if self.can_transition_to(next) {
            self.state = next;
            self.last_updated_at = Utc::now();
            return Ok(());
        }

        Err(EngineError::InvalidTransition { from: self.state, to: next })
    }

    /// Recomputes the score from the turn history alone. Because scoring is a
    /// cumulative clamped sum with no decay, this must always equal
    /// `interest_score`.
    pub fn replayed_score(&self) -> u8 {
        self.turns
            .iter()
            .fold(0i32, |score, turn| (score + turn.score_delta).clamp(0, 100)) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::{ConversationSession, SessionId, SessionState, Turn};

    fn session() -> ConversationSession {
        ConversationSession::new(SessionId("sess-1".to_owned()))
    }

    fn turn(sequence: u32, score_delta: i32, resulting_score: u8) -> Turn {
        Turn {
            sequence,
            utterance: format!("turn {sequence}"),
            signals: Vec::new(),
            score_delta,
            resulting_score,
        }
    }

    #[test]
    fn allows_forward_transitions_only() {
        let mut session = session();
        session.transition_to(SessionState::Converted).expect("active -> converted");
        assert!(session.is_closed());

        let error = session
            .transition_to(SessionState::Abandoned)
            .expect_err("terminal states never move again");
        assert!(matches!(
            error,
            crate::errors::EngineError::InvalidTransition {
                from: SessionState::Converted,
                to: SessionState::Abandoned
            }
        ));
    }

    #[test]
    fn replay_reproduces_clamped_running_score() {
        let mut session = session();
        session.turns = vec![
            turn(0, 15, 15),
            turn(1, -10, 5),
            turn(2, -10, 0),
            turn(3, 130, 100),
            turn(4, -25, 75),
        ];
        session.interest_score = 75;

        assert_eq!(session.replayed_score(), session.interest_score);
    }

    #[test]
    fn sequence_numbers_start_at_zero() {
        let mut session = session();
        assert_eq!(session.next_sequence(), 0);
        session.turns.push(turn(0, 0, 0));
        assert_eq!(session.next_sequence(), 1);
    }
}
