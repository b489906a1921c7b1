//! TOML-backed game configuration
//!
//! Every field has a default, so an empty or missing file is a valid config.

use crate::{GameError, Result};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up when none is named on the command line
pub const DEFAULT_CONFIG_FILE: &str = "cyber-guardians.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub scoring: ScoringConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

/// Delays on the session's logical timeline, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub reveal_delay_ms: u64,
    pub intro_exit_delay_ms: u64,
    pub thought_delay_ms: u64,
    pub threat_popup_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: 3000,
            intro_exit_delay_ms: 500,
            thought_delay_ms: 1000,
            threat_popup_ms: 3000,
        }
    }
}

impl TimingConfig {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn intro_exit_delay(&self) -> Duration {
        Duration::from_millis(self.intro_exit_delay_ms)
    }

    pub fn thought_delay(&self) -> Duration {
        Duration::from_millis(self.thought_delay_ms)
    }

    pub fn threat_popup(&self) -> Duration {
        Duration::from_millis(self.threat_popup_ms)
    }
}

/// How repeated completions feed the player's total score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScorePolicy {
    /// Every completion adds its score, replays included
    #[default]
    Accumulate,
    /// Total is the sum of best scores over completed levels
    BestOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub total_score_policy: ScorePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Cap on scenarios per attempt; 0 presents the whole pool
    pub max_scenarios: usize,
}

impl SessionConfig {
    pub fn scenario_limit(&self) -> Option<usize> {
        (self.max_scenarios > 0).then_some(self.max_scenarios)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub save_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from(".cyber-guardians"),
        }
    }
}

impl GameConfig {
    /// Parse a config from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.storage.save_dir.as_os_str().is_empty() {
            return Err(GameError::Config("storage.save_dir must not be empty".to_string()).into());
        }
        Ok(())
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<GameConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    GameConfig::from_toml(&content)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}

/// Load the named config, or the default file if present, or defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<GameConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load_config(default_path)
            } else {
                Ok(GameConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = GameConfig::from_toml("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.timing.reveal_delay(), Duration::from_millis(3000));
        assert_eq!(config.scoring.total_score_policy, ScorePolicy::Accumulate);
        assert_eq!(config.session.scenario_limit(), None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = GameConfig::from_toml(
            r#"
            [timing]
            reveal_delay_ms = 10

            [scoring]
            total_score_policy = "best-only"

            [session]
            max_scenarios = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.reveal_delay_ms, 10);
        assert_eq!(config.timing.intro_exit_delay_ms, 500);
        assert_eq!(config.scoring.total_score_policy, ScorePolicy::BestOnly);
        assert_eq!(config.session.scenario_limit(), Some(2));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(GameConfig::from_toml("[timing]\nreveal_delay = 1\n").is_err());
        assert!(GameConfig::from_toml("[storage]\nsave_dir = \"\"\n").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_config(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.toml");
        std::fs::write(&path, "[storage]\nsave_dir = \"saves\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.storage.save_dir, PathBuf::from("saves"));
    }
}
