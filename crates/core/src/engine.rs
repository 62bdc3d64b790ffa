//! The composite entry point: Extractor -> Aggregator -> State Machine ->
//! (conditionally) Ranker, one pass per inbound utterance.
//!
//! Exclusive per-session access is expressed through the `&mut
//! ConversationSession` borrow, so per-session processing is strictly
//! sequential by construction while independent sessions run in parallel
//! freely. The engine itself is immutable after construction and shareable
//! across sessions.

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::config::{ConfigError, EngineConfig};
use crate::domain::product::Product;
use crate::domain::session::{ConversationSession, SessionState, Turn};
use crate::errors::EngineError;
use crate::ranker::{Recommendation, RecommendationRanker};
use crate::score::ScoreAggregator;
use crate::signals::{SignalExtractor, SignalMatch};
use crate::state::ConversationFlow;

/// Result of one processed turn, returned to the caller for response
/// synthesis and persistence.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnOutcome {
    pub sequence: u32,
    pub score_delta: i32,
    pub score: u8,
    pub state: SessionState,
    pub signals: Vec<SignalMatch>,
    /// Present when this turn triggered a ranking pass; may be empty when
    /// the candidate set was empty or fully excluded.
    pub recommendations: Option<Vec<Recommendation>>,
}

pub struct InterestEngine {
    extractor: SignalExtractor,
    aggregator: ScoreAggregator,
    flow: ConversationFlow,
    ranker: RecommendationRanker,
}

impl InterestEngine {
    /// Builds an engine from validated configuration; malformed config fails
    /// here, never mid-session.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    pub fn with_defaults() -> Self {
        Self::from_config(EngineConfig::default())
    }

    fn from_config(config: EngineConfig) -> Self {
        Self {
            extractor: SignalExtractor::new(config.vocabulary),
            aggregator: ScoreAggregator::new(config.weights),
            flow: ConversationFlow::new(config.outcomes, config.trigger),
            ranker: RecommendationRanker::new(config.ranking, config.dietary),
        }
    }

    /// Processes one utterance against the session. Candidates are supplied
    /// synchronously by the caller (already fetched from the catalog
    /// collaborator); ranking runs only when the turn triggers it.
    pub fn process_turn(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
        candidates: &[Product],
    ) -> Result<TurnOutcome, EngineError> {
        let signals = self.extractor.extract(utterance);
        let update = self.extractor.preference_update(utterance);
        let turn = self.aggregator.apply(session, utterance, signals, update)?;

        self.conclude_turn(session, turn, Some(candidates))
    }

    /// Same as [`process_turn`](Self::process_turn), emitting one analytics
    /// event for the external analytics collaborator.
    pub fn process_turn_with_analytics<S>(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
        candidates: &[Product],
        sink: &S,
    ) -> Result<TurnOutcome, EngineError>
    where
        S: AnalyticsSink,
    {
        let outcome = self.process_turn(session, utterance, candidates)?;
        self.emit(session, &outcome, sink);
        Ok(outcome)
    }

    /// Standalone ranking for explicit search/browse flows that bypass chat.
    /// Pure with respect to the session: history and preferences are read,
    /// nothing is written.
    pub fn rank(
        &self,
        session: &ConversationSession,
        candidates: &[Product],
        limit: usize,
    ) -> Result<Vec<Recommendation>, EngineError> {
        if session.is_closed() {
            return Err(EngineError::session_closed(session.id.clone(), session.state));
        }

        Ok(self.ranker.rank(session, candidates, limit))
    }

    /// Caller-asserted dietary conflict: validates that the product really
    /// violates a stated restriction (a caller bug must not silently poison
    /// the score), then applies the `dietary_conflict` weight as a turn. No
    /// ranking pass runs on a conflict assertion.
    pub fn assert_dietary_conflict(
        &self,
        session: &mut ConversationSession,
        product: &Product,
    ) -> Result<TurnOutcome, EngineError> {
        let Some(violation) = self
            .ranker
            .rules()
            .violation(&session.preferences.dietary_restrictions, product)
        else {
            return Err(EngineError::invalid_input(format!(
                "product `{}` does not violate any stated dietary restriction",
                product.name
            )));
        };

        let turn = self.aggregator.apply_conflict(session, &product.name, &violation.restriction)?;
        self.conclude_turn(session, turn, None)
    }

    /// Same as [`assert_dietary_conflict`](Self::assert_dietary_conflict),
    /// emitting one analytics event.
    pub fn assert_dietary_conflict_with_analytics<S>(
        &self,
        session: &mut ConversationSession,
        product: &Product,
        sink: &S,
    ) -> Result<TurnOutcome, EngineError>
    where
        S: AnalyticsSink,
    {
        let outcome = self.assert_dietary_conflict(session, product)?;
        self.emit(session, &outcome, sink);
        Ok(outcome)
    }

    fn conclude_turn(
        &self,
        session: &mut ConversationSession,
        turn: Turn,
        candidates: Option<&[Product]>,
    ) -> Result<TurnOutcome, EngineError> {
        let assessment = self.flow.assess(session, &turn);

        let recommendations = match candidates {
            Some(candidates) if assessment.trigger_ranking => {
                let ranked =
                    self.ranker.rank(session, candidates, self.flow.recommendation_limit());
                session.last_ranked_turn = Some(turn.sequence);
                Some(ranked)
            }
            _ => None,
        };

        if assessment.next_state != SessionState::Active {
            session.transition_to(assessment.next_state)?;
        }

        Ok(TurnOutcome {
            sequence: turn.sequence,
            score_delta: turn.score_delta,
            score: turn.resulting_score,
            state: session.state,
            signals: turn.signals,
            recommendations,
        })
    }

    fn emit<S>(&self, session: &ConversationSession, outcome: &TurnOutcome, sink: &S)
    where
        S: AnalyticsSink,
    {
        sink.emit(AnalyticsEvent::new(
            session.id.clone(),
            outcome.sequence,
            outcome.score_delta,
            outcome.score,
            outcome.state,
        ));
    }
}

impl Default for InterestEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use crate::analytics::InMemoryAnalyticsSink;
    use crate::catalog::demo_catalog;
    use crate::domain::product::ProductId;
    use crate::domain::session::{ConversationSession, SessionId, SessionState};
    use crate::errors::EngineError;

    use super::InterestEngine;

    fn session() -> ConversationSession {
        ConversationSession::new(SessionId("sess-1".to_owned()))
    }

    #[test]
    fn preference_turn_triggers_a_filtered_ranking() {
        let engine = InterestEngine::with_defaults();
        let catalog = demo_catalog();
        let mut session = session();

        let outcome = engine
            .process_turn(
                &mut session,
                "I'm vegetarian and I love spicy Korean food",
                catalog.products(),
            )
            .expect("turn processes");

        assert_eq!(outcome.score, 25);
        assert_eq!(outcome.state, SessionState::Active);

        let recommendations = outcome.recommendations.expect("preferences trigger ranking");
        assert!(!recommendations.is_empty());
        // The beef burger and the fried chicken violate the stated restriction.
        assert!(recommendations
            .iter()
            .all(|r| r.product_id != ProductId("prod_bbq_burger".to_owned())));
        assert!(recommendations
            .iter()
            .all(|r| r.product_id != ProductId("prod_korean_chicken".to_owned())));
        assert_eq!(session.last_ranked_turn, Some(0));
    }

    #[test]
    fn order_intent_converts_and_still_surfaces_candidates() {
        let engine = InterestEngine::with_defaults();
        let catalog = demo_catalog();
        let mut session = session();
        session.interest_score = 25;

        let outcome = engine
            .process_turn(&mut session, "I'll take it!", catalog.products())
            .expect("turn processes");

        assert_eq!(outcome.score, 63);
        assert_eq!(outcome.state, SessionState::Converted);
        assert!(outcome.recommendations.is_some());
        assert!(session.is_closed());
    }

    #[test]
    fn closed_sessions_reject_turns_and_rank_but_allow_reads() {
        let engine = InterestEngine::with_defaults();
        let catalog = demo_catalog();
        let mut session = session();
        session.transition_to(SessionState::Converted).expect("close");

        let turn_error = engine
            .process_turn(&mut session, "anything else?", catalog.products())
            .expect_err("closed session");
        assert!(matches!(turn_error, EngineError::SessionClosed { .. }));

        let rank_error =
            engine.rank(&session, catalog.products(), 3).expect_err("closed session");
        assert!(matches!(rank_error, EngineError::SessionClosed { .. }));

        // History reads stay valid.
        assert_eq!(session.turns.len(), 0);
        assert_eq!(session.replayed_score(), 0);
    }

    #[test]
    fn low_signal_conversation_abandons_without_recommendations() {
        let engine = InterestEngine::with_defaults();
        let catalog = demo_catalog();
        let mut session = session();

        engine
            .process_turn(&mut session, "I love spicy food", catalog.products())
            .expect("opening turn");
        assert_eq!(session.interest_score, 15);

        engine.process_turn(&mut session, "Hmm, maybe.", catalog.products()).expect("turn");
        engine.process_turn(&mut session, "still not sure", catalog.products()).expect("turn");
        let last = engine
            .process_turn(&mut session, "maybe another time", catalog.products())
            .expect("turn");

        assert_eq!(last.state, SessionState::Abandoned);
        assert!(last.recommendations.is_none(), "no recommendations on the way out");
        assert_eq!(session.interest_score, 0);
    }

    #[test]
    fn analytics_events_track_each_turn() {
        let engine = InterestEngine::with_defaults();
        let catalog = demo_catalog();
        let sink = InMemoryAnalyticsSink::default();
        let mut session = session();

        engine
            .process_turn_with_analytics(
                &mut session,
                "I'm feeling adventurous",
                catalog.products(),
                &sink,
            )
            .expect("turn");
        engine
            .process_turn_with_analytics(
                &mut session,
                "what's the spice level?",
                catalog.products(),
                &sink,
            )
            .expect("turn");

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].turn, 0);
        assert_eq!(events[0].score_delta, 20);
        assert_eq!(events[1].turn, 1);
        assert_eq!(events[1].session_id, session.id);
    }

    #[test]
    fn conflict_assertion_requires_a_real_violation() {
        let engine = InterestEngine::with_defaults();
        let catalog = demo_catalog();
        let mut session = session();
        session.interest_score = 40;
        session.preferences.dietary_restrictions.insert("vegetarian".to_owned());

        let burger = catalog
            .find(&ProductId("prod_bbq_burger".to_owned()))
            .expect("demo product exists");
        let outcome =
            engine.assert_dietary_conflict(&mut session, burger).expect("real violation");
        assert_eq!(outcome.score_delta, -20);
        assert_eq!(session.interest_score, 20);

        let salad = catalog
            .find(&ProductId("prod_quinoa_salad".to_owned()))
            .expect("demo product exists");
        let error = engine
            .assert_dietary_conflict(&mut session, salad)
            .expect_err("salad satisfies the restriction");
        assert!(matches!(error, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn empty_utterance_never_appends_a_turn() {
        let engine = InterestEngine::with_defaults();
        let mut session = session();

        let error = engine.process_turn(&mut session, "  \t ", &[]).expect_err("rejected");
        assert!(matches!(error, EngineError::InvalidInput { .. }));
        assert!(session.turns.is_empty());
    }

    #[test]
    fn empty_candidate_set_yields_empty_recommendations_not_an_error() {
        let engine = InterestEngine::with_defaults();
        let mut session = session();

        let outcome = engine
            .process_turn(&mut session, "I'm craving tacos", &[])
            .expect("turn processes");
        assert_eq!(outcome.recommendations, Some(Vec::new()));
    }
}
