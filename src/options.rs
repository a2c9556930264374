use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which way levels are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Sources sit on the lowest level.
    #[default]
    Forward,
    /// Sinks sit on the lowest level.
    Reverse,
}

/// How cycle groups are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Kahn-style propagation that collapses a cycle group when the queue
    /// stalls on a node with unresolved predecessors.
    #[default]
    Incremental,
    /// Collapse every strongly connected component up front, then take the
    /// longest path over the resulting DAG.
    Condensation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOptions {
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub strategy: Strategy,
}

impl Default for LevelOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            strategy: Strategy::Incremental,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OptionsFile {
    #[serde(default)]
    levels: Option<LevelOptions>,
}

impl LevelOptions {
    pub fn reversed(mut self) -> Self {
        self.direction = Direction::Reverse;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Parse a `[levels]` table from TOML. A missing table yields defaults.
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let file: OptionsFile = toml::from_str(content)?;
        Ok(file.levels.unwrap_or_default())
    }

    /// Parse a `levels:` mapping from YAML. A missing mapping yields defaults.
    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: OptionsFile = serde_yaml::from_str(content)?;
        Ok(file.levels.unwrap_or_default())
    }

    /// Try TOML first, then YAML.
    pub fn from_config_str(content: &str) -> Result<Self, Error> {
        match Self::from_toml(content) {
            Ok(options) => Ok(options),
            Err(toml_err) => Self::from_yaml(content).map_err(|yaml_err| {
                Error::Config(format!(
                    "not valid TOML ({}) or YAML ({})",
                    toml_err, yaml_err
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_only_given_fields() {
        let options = LevelOptions::from_toml("[levels]\ndirection = \"reverse\"\n").unwrap();
        assert_eq!(options.direction, Direction::Reverse);
        assert_eq!(options.strategy, Strategy::Incremental);
    }

    #[test]
    fn yaml_selects_strategy() {
        let options = LevelOptions::from_yaml("levels:\n  strategy: condensation\n").unwrap();
        assert_eq!(options.strategy, Strategy::Condensation);
        assert_eq!(options.direction, Direction::Forward);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(LevelOptions::from_toml("").unwrap(), LevelOptions::default());
        assert_eq!(LevelOptions::from_yaml("").unwrap(), LevelOptions::default());
    }

    #[test]
    fn config_str_falls_back_to_yaml() {
        let options = LevelOptions::from_config_str("levels:\n  direction: reverse\n").unwrap();
        assert_eq!(options.direction, Direction::Reverse);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = LevelOptions::from_config_str("[levels]\nstrategy = \"fastest\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
