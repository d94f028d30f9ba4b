use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crease_engine::EngineConfig;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Bearer tokens granted the scorer role.
    pub scorer_tokens: Vec<String>,
    pub allow_anonymous_read: bool,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 7878)),
            scorer_tokens: Vec::new(),
            allow_anonymous_read: true,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(input: &str) -> ServerResult<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| ServerError::Config(e.to_string()))?;
        config
            .engine
            .check()
            .map_err(|e| ServerError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:7878".parse::<SocketAddr>().unwrap());
        assert!(c.scorer_tokens.is_empty());
        assert!(c.allow_anonymous_read);
        assert_eq!(c.engine.default_team_size, 11);
    }

    #[test]
    fn nested_engine_section() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            scorer_tokens = ["s3cret"]

            [engine]
            default_team_size = 9
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.scorer_tokens, vec!["s3cret".to_string()]);
        assert_eq!(c.engine.default_team_size, 9);
        assert_eq!(c.engine.max_runs_per_delivery, 7);
    }

    #[test]
    fn invalid_engine_section_is_rejected() {
        let err = ServerConfig::from_toml_str("[engine]\ndefault_team_size = 0").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "allow_anonymous_read = false").unwrap();
        let c = ServerConfig::load(file.path()).unwrap();
        assert!(!c.allow_anonymous_read);
    }
}
