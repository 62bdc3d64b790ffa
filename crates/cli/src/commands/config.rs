use std::path::PathBuf;

use anyhow::{Context, Result};
use cravey_core::{EngineConfig, LoadOptions};

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let source = match &path {
        Some(path) => format!("file ({})", path.display()),
        None => "defaults (no cravey.toml found)".to_owned(),
    };

    let require_file = path.is_some();
    let config = EngineConfig::load(LoadOptions { config_path: path, require_file })
        .context("configuration is invalid")?;

    println!("effective config (source: {source}):");
    println!(
        "- weights: order_intent {:+}, price_inquiry {:+}, rejection {:+} (12 categories)",
        config.weights.order_intent, config.weights.price_inquiry, config.weights.rejection
    );
    println!(
        "- outcomes: convert at >= {}, abandon below {} after {} negative turns",
        config.outcomes.convert_min_score,
        config.outcomes.abandon_max_score,
        config.outcomes.abandon_streak
    );
    println!(
        "- trigger: {} categories, every {} quiet turns, limit {}",
        config.trigger.categories.len(),
        config.trigger.max_quiet_turns,
        config.trigger.recommendation_limit
    );
    println!(
        "- ranking: preference {:.2} / mood {:.2} / budget {:.2} / dietary {:.2}",
        config.ranking.preference, config.ranking.mood, config.ranking.budget,
        config.ranking.dietary
    );
    println!(
        "- vocabulary: {} preference keywords, {} dietary groups, {} mood groups",
        config.vocabulary.preference_keywords.len(),
        config.vocabulary.dietary_terms.len(),
        config.vocabulary.mood_terms.len()
    );

    Ok(())
}
