use std::path::Path;

use serde::{Deserialize, Serialize};

/// Tunables for the scoring engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Team size assumed when the roster cannot report one. All-out is
    /// reached when this many wickets fall.
    pub default_team_size: u32,
    /// Upper bound on `runs` for a single delivery.
    pub max_runs_per_delivery: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_team_size: 11,
            max_runs_per_delivery: 7,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl EngineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.default_team_size < 2 {
            return Err(ConfigError::Invalid(
                "default_team_size must be at least 2".into(),
            ));
        }
        Ok(())
    }
}
