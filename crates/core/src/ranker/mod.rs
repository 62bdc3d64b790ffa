//! Multi-criteria recommendation ranking.
//!
//! Scores a candidate product set against the accumulated conversation
//! context: stated preference keywords, mood tags, budget ceiling, and
//! dietary restrictions. Pure and deterministic; recomputed fresh on every
//! call because the session context changes every turn.

mod engine;
mod scoring;
mod types;

pub use engine::RecommendationRanker;
pub use scoring::MatchScorer;
pub use types::*;

/// Default criterion weights.
pub const DEFAULT_WEIGHTS: RankingWeights =
    RankingWeights { preference: 0.35, mood: 0.25, budget: 0.20, dietary: 0.20 };

/// Budget fit decays linearly to zero once price exceeds the ceiling by
/// this fraction.
pub const BUDGET_OVERRUN_TOLERANCE: f64 = 0.5;

/// Ranking weights must sum to 1 within this tolerance.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;
