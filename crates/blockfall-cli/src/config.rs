use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use blockfall_engine::{Engine, EngineConfig, PieceSeed};
use serde::{Deserialize, Serialize};

use crate::util;

/// Session settings read from a JSON file. Every field is optional.
///
/// ```json
/// { "width": 10, "height": 20, "interval_ms": 500, "seed": "000102030405060708090a0b0c0d0e0f" }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub interval_ms: Option<u64>,
    pub seed: Option<PieceSeed>,
}

impl GameConfig {
    /// Values in `overrides` take precedence over `self`.
    #[must_use]
    pub fn merge(self, overrides: GameConfig) -> Self {
        Self {
            width: overrides.width.or(self.width),
            height: overrides.height.or(self.height),
            interval_ms: overrides.interval_ms.or(self.interval_ms),
            seed: overrides.seed.or(self.seed),
        }
    }

    /// Fills unset fields with the engine defaults.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            height: self.height.unwrap_or(defaults.height),
            width: self.width.unwrap_or(defaults.width),
            base_interval: self
                .interval_ms
                .map_or(defaults.base_interval, Duration::from_millis),
        }
    }

    /// Builds an idle engine, rejecting invalid dimensions and intervals.
    pub fn build_engine(&self) -> anyhow::Result<Engine> {
        let config = self.engine_config();
        let engine = match self.seed {
            Some(seed) => Engine::with_seed(config, seed),
            None => Engine::new(config),
        };
        engine.context("Invalid game configuration")
    }
}

/// Game settings shared by every subcommand.
#[derive(Default, Debug, Clone, clap::Args)]
pub struct GameArgs {
    /// JSON file with default settings; the flags below override it
    #[clap(long)]
    config: Option<PathBuf>,
    /// Board width in cells
    #[clap(long)]
    width: Option<usize>,
    /// Board height in cells
    #[clap(long)]
    height: Option<usize>,
    /// Drop interval at level 0, in milliseconds
    #[clap(long)]
    interval_ms: Option<u64>,
    /// Piece sequence seed as 32 hex digits
    #[clap(long)]
    seed: Option<PieceSeed>,
}

impl GameArgs {
    /// Loads the config file, if any, and applies the flags on top.
    pub fn resolve(&self) -> anyhow::Result<GameConfig> {
        let base = match &self.config {
            Some(path) => util::read_json_file::<GameConfig, _>("config", path)?,
            None => GameConfig::default(),
        };
        Ok(base.merge(GameConfig {
            width: self.width,
            height: self.height,
            interval_ms: self.interval_ms,
            seed: self.seed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_values() {
        let file: GameConfig =
            serde_json::from_str(r#"{ "width": 12, "interval_ms": 300 }"#).unwrap();
        let merged = file.merge(GameConfig {
            width: Some(8),
            ..GameConfig::default()
        });
        assert_eq!(merged.width, Some(8));
        assert_eq!(merged.interval_ms, Some(300));
        assert_eq!(merged.height, None);
    }

    #[test]
    fn test_defaults_match_engine() {
        assert_eq!(
            GameConfig::default().engine_config(),
            EngineConfig::default()
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = GameConfig {
            height: Some(0),
            ..GameConfig::default()
        };
        assert!(config.build_engine().is_err());

        let config = GameConfig {
            interval_ms: Some(0),
            ..GameConfig::default()
        };
        assert!(config.build_engine().is_err());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<GameConfig>(r#"{ "colour": 3 }"#).is_err());
    }

    #[test]
    fn test_seed_is_applied() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "seed": "0123456789abcdef0123456789abcdef" }"#).unwrap();
        let engine = config.build_engine().unwrap();
        assert_eq!(Some(engine.seed()), config.seed);
    }
}
