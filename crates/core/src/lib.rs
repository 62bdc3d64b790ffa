pub mod analytics;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod ranker;
pub mod score;
pub mod signals;
pub mod state;

pub use analytics::{AnalyticsEvent, AnalyticsSink, InMemoryAnalyticsSink};
pub use catalog::{demo_catalog, Catalog, CatalogFilter};
pub use config::{ConfigError, EngineConfig, LoadOptions};
pub use domain::product::{Product, ProductId};
pub use domain::session::{
    ConversationSession, PreferenceProfile, SessionId, SessionState, Turn,
};
pub use engine::{InterestEngine, TurnOutcome};
pub use errors::EngineError;
pub use ranker::{
    ComponentScores, DietaryRules, RankingWeights, Recommendation, RecommendationRanker,
};
pub use score::{ScoreAggregator, SignalWeights};
pub use signals::{SignalCategory, SignalExtractor, SignalMatch, SignalVocabulary, TermGroup};
pub use state::{ConversationFlow, OutcomeThresholds, TriggerPolicy};
