//! Tuning for every subsystem.
//!
//! `Default` holds the built-in tuning. A JSON file may override any subset of
//! fields; missing fields fall back to the defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::GameTime;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse singularity config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read singularity config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid singularity config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingularityConfig {
    /// RNG seed; the same seed and inputs always produce the same run.
    pub seed: u64,
    /// Game time covered by one coordinator tick.
    pub tick_interval_secs: f64,
    pub progression: ProgressionConfig,
    pub competitors: CompetitorConfig,
    pub balance: BalanceConfig,
    pub narrative: NarrativeConfig,
    pub zoo: ZooConfig,
}

impl Default for SingularityConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_interval_secs: 5.0,
            progression: ProgressionConfig::default(),
            competitors: CompetitorConfig::default(),
            balance: BalanceConfig::default(),
            narrative: NarrativeConfig::default(),
            zoo: ZooConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Progress gained per tick before any factor is applied.
    pub base_rate: f64,
    /// Share of the base rate each unit of player resistance cancels.
    pub resistance_weight: f64,
    /// Resistance gained per recorded action, scaled by its effectiveness.
    pub resistance_per_action: f64,
    /// Fraction of resistance lost every tick.
    pub resistance_decay: f64,
    /// How many ticks a breakthrough keeps counting toward the technology factor.
    pub breakthrough_window_ticks: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            base_rate: 1.0 / 512.0,
            resistance_weight: 0.5,
            resistance_per_action: 0.04,
            resistance_decay: 0.01,
            breakthrough_window_ticks: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompetitorConfig {
    pub initial_competitors: usize,
    pub max_competitors: usize,
    /// Experience every competitor earns per tick before type and phase scaling.
    pub experience_per_tick: f64,
    /// Chance that a competitor studies a random learnable capability instead
    /// of its highest-pressure one.
    pub random_focus_chance: f64,
}

impl Default for CompetitorConfig {
    fn default() -> Self {
        Self {
            initial_competitors: 3,
            max_competitors: 8,
            experience_per_tick: 4.0,
            random_focus_chance: 0.25,
        }
    }
}

/// Dynamic-difficulty breakpoints. Tuned by play, not derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub history_capacity: usize,
    /// Number of most recent snapshots the controller looks at.
    pub evaluation_window: usize,
    pub adjustment_cooldown_ticks: u64,
    pub step: f64,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
    /// Average below this and trending down: a full step easier.
    pub struggling_below: f64,
    /// Average above this and trending up: a full step harder.
    pub dominating_above: f64,
    pub target_low: f64,
    pub target_high: f64,
    /// Size of corrective nudges as a fraction of `step`.
    pub nudge_fraction: f64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            evaluation_window: 10,
            adjustment_cooldown_ticks: 12,
            step: 0.1,
            min_multiplier: 0.5,
            max_multiplier: 2.0,
            struggling_below: 0.3,
            dominating_above: 0.7,
            target_low: 0.4,
            target_high: 0.6,
            nudge_fraction: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub news_interval_min_secs: f64,
    pub news_interval_max_secs: f64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            news_interval_min_secs: 20.0,
            news_interval_max_secs: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZooConfig {
    /// Game time covered by one zoo day.
    pub day_interval_secs: f64,
    pub visitors_per_archetype: usize,
    pub base_daily_visitors: u32,
    pub max_interactions_per_day: u32,
    /// Days an exhibit can go without care before its mood drops.
    pub care_timeout_days: u32,
    pub event_chance: f64,
}

impl Default for ZooConfig {
    fn default() -> Self {
        Self {
            day_interval_secs: 10.0,
            visitors_per_archetype: 4,
            base_daily_visitors: 40,
            max_interactions_per_day: 20,
            care_timeout_days: 3,
            event_chance: 0.35,
        }
    }
}

impl SingularityConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SingularityConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn tick_interval(&self) -> GameTime {
        GameTime::from_secs_f64(self.tick_interval_secs)
    }

    pub fn day_interval(&self) -> GameTime {
        GameTime::from_secs_f64(self.zoo.day_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        }
        fn interval(name: &str, secs: f64) -> Result<(), ConfigError> {
            positive(name, secs)?;
            if GameTime::from_secs_f64(secs) < GameTime::from_millis(1) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be at least 1 ms, got {secs}"
                )));
            }
            Ok(())
        }
        fn unit(name: &str, value: f64) -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be in [0,1], got {value}")))
            }
        }

        interval("tick_interval_secs", self.tick_interval_secs)?;
        positive("progression.base_rate", self.progression.base_rate)?;
        unit("progression.resistance_decay", self.progression.resistance_decay)?;
        unit("competitors.random_focus_chance", self.competitors.random_focus_chance)?;
        if self.competitors.initial_competitors > self.competitors.max_competitors {
            return Err(ConfigError::Invalid(format!(
                "competitors.initial_competitors ({}) exceeds max_competitors ({})",
                self.competitors.initial_competitors, self.competitors.max_competitors
            )));
        }

        let b = &self.balance;
        positive("balance.step", b.step)?;
        positive("balance.min_multiplier", b.min_multiplier)?;
        if b.min_multiplier > b.max_multiplier {
            return Err(ConfigError::Invalid(format!(
                "balance multiplier range is inverted: {} > {}",
                b.min_multiplier, b.max_multiplier
            )));
        }
        if b.evaluation_window < 2 || b.evaluation_window > b.history_capacity {
            return Err(ConfigError::Invalid(format!(
                "balance.evaluation_window must be in 2..={}, got {}",
                b.history_capacity, b.evaluation_window
            )));
        }
        if b.target_low > b.target_high {
            return Err(ConfigError::Invalid(format!(
                "balance target band is inverted: {} > {}",
                b.target_low, b.target_high
            )));
        }

        let n = &self.narrative;
        interval("narrative.news_interval_min_secs", n.news_interval_min_secs)?;
        if n.news_interval_min_secs > n.news_interval_max_secs {
            return Err(ConfigError::Invalid(format!(
                "news interval range is inverted: {} > {}",
                n.news_interval_min_secs, n.news_interval_max_secs
            )));
        }

        interval("zoo.day_interval_secs", self.zoo.day_interval_secs)?;
        unit("zoo.event_chance", self.zoo.event_chance)?;
        if self.zoo.visitors_per_archetype == 0 {
            return Err(ConfigError::Invalid(
                "zoo.visitors_per_archetype must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        SingularityConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SingularityConfig::from_json_str(
            r#"{ "seed": 7, "balance": { "step": 0.2 } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.balance.step, 0.2);
        assert_eq!(config.balance.min_multiplier, 0.5);
        assert_eq!(config.zoo, ZooConfig::default());
    }

    #[test]
    fn inverted_multiplier_range_is_rejected() {
        let err = SingularityConfig::from_json_str(
            r#"{ "balance": { "min_multiplier": 3.0, "max_multiplier": 1.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let err = SingularityConfig::from_json_str(r#"{ "tick_interval_secs": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("tick_interval_secs"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SingularityConfig::from_json_str("{ seed: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("singularity.json");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{ "tick_interval_secs": 2.5, "zoo": {{ "care_timeout_days": 5 }} }}"#)
            .unwrap();

        let config = SingularityConfig::from_file(&path).unwrap();
        assert_eq!(config.tick_interval(), GameTime::from_millis(2_500));
        assert_eq!(config.zoo.care_timeout_days, 5);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SingularityConfig::from_file(Path::new("/nonexistent/singularity.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("singularity.json"));
    }
}
