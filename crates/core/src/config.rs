//! Engine configuration: defaults, optional TOML file, fail-fast validation.
//!
//! Everything tunable lives here (signal weights, detection vocabulary,
//! outcome thresholds, trigger policy, ranking weights, dietary rules) and
//! is loaded once at process start, then passed explicitly into the engine.
//! Malformed configuration fails at load time, never mid-session.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ranker::{DietaryRules, RankingWeights, WEIGHT_SUM_TOLERANCE};
use crate::score::SignalWeights;
use crate::signals::{SignalVocabulary, TermGroup};
use crate::state::{OutcomeThresholds, TriggerPolicy};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub weights: SignalWeights,
    pub vocabulary: SignalVocabulary,
    pub outcomes: OutcomeThresholds,
    pub trigger: TriggerPolicy,
    pub ranking: RankingWeights,
    pub dietary: DietaryRules,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl EngineConfig {
    /// Defaults, overridden section-by-section from an optional TOML file,
    /// then validated. Unknown keys anywhere in the file are a parse error.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        let config = if let Some(path) = maybe_path {
            let raw = fs::read_to_string(&path)
                .map_err(|source| ConfigError::ReadFile { path: path.clone(), source })?;
            toml::from_str::<Self>(&raw)
                .map_err(|source| ConfigError::ParseFile { path, source })?
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("cravey.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_weights(&self.weights)?;
        validate_vocabulary(&self.vocabulary)?;
        validate_outcomes(&self.outcomes)?;
        validate_trigger(&self.trigger)?;
        validate_ranking(&self.ranking)?;
        validate_dietary(&self.dietary)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("cravey.toml"), PathBuf::from("config/cravey.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn validate_weights(weights: &SignalWeights) -> Result<(), ConfigError> {
    let engagement = [
        ("weights.specific_preferences", weights.specific_preferences),
        ("weights.dietary_restrictions", weights.dietary_restrictions),
        ("weights.budget_mention", weights.budget_mention),
        ("weights.mood_indication", weights.mood_indication),
        ("weights.question_asking", weights.question_asking),
        ("weights.enthusiasm_words", weights.enthusiasm_words),
        ("weights.price_inquiry", weights.price_inquiry),
        ("weights.order_intent", weights.order_intent),
    ];
    for (key, value) in engagement {
        if value <= 0 {
            return Err(ConfigError::Validation(format!(
                "{key} must be positive (engagement category), got {value}"
            )));
        }
    }

    let friction = [
        ("weights.hesitation", weights.hesitation),
        ("weights.budget_concern", weights.budget_concern),
        ("weights.dietary_conflict", weights.dietary_conflict),
        ("weights.rejection", weights.rejection),
    ];
    for (key, value) in friction {
        if value >= 0 {
            return Err(ConfigError::Validation(format!(
                "{key} must be negative (friction category), got {value}"
            )));
        }
    }

    Ok(())
}

fn validate_vocabulary(vocabulary: &SignalVocabulary) -> Result<(), ConfigError> {
    let lists = [
        ("vocabulary.preference_keywords", &vocabulary.preference_keywords),
        ("vocabulary.enthusiasm_keywords", &vocabulary.enthusiasm_keywords),
        ("vocabulary.question_cues", &vocabulary.question_cues),
        ("vocabulary.price_inquiry_phrases", &vocabulary.price_inquiry_phrases),
        ("vocabulary.order_intent_phrases", &vocabulary.order_intent_phrases),
        ("vocabulary.hesitation_phrases", &vocabulary.hesitation_phrases),
        ("vocabulary.budget_concern_phrases", &vocabulary.budget_concern_phrases),
        ("vocabulary.rejection_phrases", &vocabulary.rejection_phrases),
    ];
    for (key, list) in lists {
        if list.is_empty() || list.iter().any(|entry| entry.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{key} must be a non-empty list of non-empty phrases"
            )));
        }
    }

    validate_term_groups("vocabulary.category_terms", &vocabulary.category_terms)?;
    validate_term_groups("vocabulary.dietary_terms", &vocabulary.dietary_terms)?;
    validate_term_groups("vocabulary.mood_terms", &vocabulary.mood_terms)?;
    Ok(())
}

fn validate_term_groups(key: &str, groups: &[TermGroup]) -> Result<(), ConfigError> {
    if groups.is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    for group in groups {
        if group.canonical.trim().is_empty() || group.triggers.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{key} entries need a canonical tag and at least one trigger"
            )));
        }
    }
    Ok(())
}

fn validate_outcomes(outcomes: &OutcomeThresholds) -> Result<(), ConfigError> {
    if outcomes.convert_min_score > 100 || outcomes.abandon_max_score > 100 {
        return Err(ConfigError::Validation(
            "outcomes thresholds must be within the 0..=100 score range".to_owned(),
        ));
    }
    if outcomes.abandon_streak == 0 {
        return Err(ConfigError::Validation(
            "outcomes.abandon_streak must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

fn validate_trigger(trigger: &TriggerPolicy) -> Result<(), ConfigError> {
    if trigger.categories.is_empty() {
        return Err(ConfigError::Validation(
            "trigger.categories must name at least one signal category".to_owned(),
        ));
    }
    if trigger.max_quiet_turns == 0 {
        return Err(ConfigError::Validation(
            "trigger.max_quiet_turns must be at least 1".to_owned(),
        ));
    }
    if trigger.recommendation_limit == 0 {
        return Err(ConfigError::Validation(
            "trigger.recommendation_limit must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

fn validate_ranking(ranking: &RankingWeights) -> Result<(), ConfigError> {
    let criteria = [
        ("ranking.preference", ranking.preference),
        ("ranking.mood", ranking.mood),
        ("ranking.budget", ranking.budget),
        ("ranking.dietary", ranking.dietary),
    ];
    for (key, value) in criteria {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{key} must be within 0.0..=1.0, got {value}"
            )));
        }
    }

    let sum = ranking.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::Validation(format!(
            "ranking weights must sum to 1.0, got {sum}"
        )));
    }
    Ok(())
}

fn validate_dietary(dietary: &DietaryRules) -> Result<(), ConfigError> {
    for group in &dietary.exclusions {
        if group.canonical.trim().is_empty() || group.triggers.is_empty() {
            return Err(ConfigError::Validation(
                "dietary.exclusions entries need a canonical tag and at least one ingredient"
                    .to_owned(),
            ));
        }
    }
    for tag in &dietary.strict_tags {
        if tag.trim().is_empty() {
            return Err(ConfigError::Validation(
                "dietary.strict_tags must not contain empty tags".to_owned(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{ConfigError, EngineConfig, LoadOptions};

    #[test]
    fn defaults_validate_cleanly() {
        let config = EngineConfig::default();
        config.validate().expect("defaults are valid");
        assert_eq!(config.weights.order_intent, 30);
        assert_eq!(config.outcomes.convert_min_score, 30);
        assert!((config.ranking.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn file_patch_overrides_single_fields_and_keeps_defaults() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;
        let path = dir.path().join("cravey.toml");
        fs::write(
            &path,
            r#"
[weights]
order_intent = 40

[outcomes]
convert_min_score = 50
"#,
        )
        .map_err(|err| err.to_string())?;

        let config =
            EngineConfig::load(LoadOptions { config_path: Some(path), require_file: true })
                .map_err(|err| format!("config load failed: {err}"))?;

        if config.weights.order_intent != 40 {
            return Err("file weight should win".to_owned());
        }
        if config.weights.price_inquiry != 25 {
            return Err("unspecified weights keep defaults".to_owned());
        }
        if config.outcomes.convert_min_score != 50 {
            return Err("file threshold should win".to_owned());
        }
        Ok(())
    }

    #[test]
    fn unknown_category_key_fails_at_parse_time() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;
        let path = dir.path().join("cravey.toml");
        fs::write(
            &path,
            r#"
[weights]
impulse_buying = 99
"#,
        )
        .map_err(|err| err.to_string())?;

        match EngineConfig::load(LoadOptions { config_path: Some(path), require_file: true }) {
            Err(ConfigError::ParseFile { .. }) => Ok(()),
            other => Err(format!("expected parse failure, got {other:?}")),
        }
    }

    #[test]
    fn ranking_weights_must_sum_to_one() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;
        let path = dir.path().join("cravey.toml");
        fs::write(
            &path,
            r#"
[ranking]
preference = 0.9
mood = 0.9
budget = 0.1
dietary = 0.1
"#,
        )
        .map_err(|err| err.to_string())?;

        match EngineConfig::load(LoadOptions { config_path: Some(path), require_file: true }) {
            Err(ConfigError::Validation(message)) if message.contains("sum to 1.0") => Ok(()),
            other => Err(format!("expected validation failure, got {other:?}")),
        }
    }

    #[test]
    fn sign_convention_is_enforced_per_category() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err| err.to_string())?;
        let path = dir.path().join("cravey.toml");
        fs::write(
            &path,
            r#"
[weights]
rejection = 25
"#,
        )
        .map_err(|err| err.to_string())?;

        match EngineConfig::load(LoadOptions { config_path: Some(path), require_file: true }) {
            Err(ConfigError::Validation(message)) if message.contains("rejection") => Ok(()),
            other => Err(format!("expected validation failure, got {other:?}")),
        }
    }

    #[test]
    fn missing_required_file_is_reported() {
        let error = EngineConfig::load(LoadOptions {
            config_path: Some("definitely/not/here.toml".into()),
            require_file: true,
        })
        .expect_err("file is required");

        assert!(matches!(error, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn zero_abandon_streak_is_rejected() {
        let mut config = EngineConfig::default();
        config.outcomes.abandon_streak = 0;

        let error = config.validate().expect_err("streak of zero is meaningless");
        assert!(matches!(error, ConfigError::Validation(_)));
    }
}
