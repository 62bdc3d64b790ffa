use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cravey_core::{
    demo_catalog, ConversationSession, EngineConfig, EngineError, InMemoryAnalyticsSink,
    InterestEngine, LoadOptions, Recommendation, SessionState,
};
use tracing::info;

pub fn run(config_path: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
    let require_file = config_path.is_some();
    let mut config = EngineConfig::load(LoadOptions { config_path, require_file })
        .context("configuration must be valid before the first turn")?;
    if let Some(limit) = limit {
        config.trigger.recommendation_limit = limit;
    }

    let engine = InterestEngine::new(config).context("engine construction")?;
    let catalog = demo_catalog();
    let sink = InMemoryAnalyticsSink::default();
    let mut session = ConversationSession::start();

    info!(
        event_name = "chat.session_started",
        session_id = %session.id.0,
        products = catalog.products().len(),
        "demo chat session started"
    );

    println!("cravey demo chat: type an utterance, Ctrl-D to quit");
    let stdin = io::stdin();
    prompt()?;

    for line in stdin.lock().lines() {
        let utterance = line.context("reading stdin")?;

        match engine.process_turn_with_analytics(
            &mut session,
            &utterance,
            catalog.products(),
            &sink,
        ) {
            Ok(outcome) => {
                let fired = outcome
                    .signals
                    .iter()
                    .map(|signal| signal.category.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let fired = if fired.is_empty() { "none".to_owned() } else { fired };
                println!(
                    "score {:>3} ({:+}) [{:?}] signals: {fired}",
                    outcome.score, outcome.score_delta, outcome.state
                );

                if let Some(recommendations) = &outcome.recommendations {
                    render_recommendations(recommendations);
                }

                if outcome.state != SessionState::Active {
                    println!("session ended: {:?}", outcome.state);
                    break;
                }
            }
            Err(EngineError::InvalidInput { reason }) => {
                println!("(ignored: {reason})");
            }
            Err(error) => return Err(error.into()),
        }

        prompt()?;
    }

    info!(
        event_name = "chat.session_finished",
        session_id = %session.id.0,
        turns = session.turns.len(),
        final_score = session.interest_score,
        state = ?session.state,
        analytics_events = sink.events().len(),
        "demo chat session finished"
    );

    Ok(())
}

fn render_recommendations(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        println!("  (no suitable products for the current context)");
        return;
    }

    for (index, recommendation) in recommendations.iter().enumerate() {
        let mut flags = Vec::new();
        if recommendation.chef_special {
            flags.push("chef's special");
        }
        if recommendation.limited_time {
            flags.push("limited time");
        }
        let flags =
            if flags.is_empty() { String::new() } else { format!(" [{}]", flags.join(", ")) };

        println!(
            "  {}. {} ${} (match {:.0}%){flags}",
            index + 1,
            recommendation.name,
            recommendation.price,
            recommendation.score * 100.0
        );
        for reason in &recommendation.reasons {
            println!("     - {reason}");
        }
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush().context("flushing prompt")?;
    Ok(())
}
