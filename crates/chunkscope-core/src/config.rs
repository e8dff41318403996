//! ChunkScope configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ChunkScopeError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChunkScopeConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl ChunkScopeConfig {
    /// Load config from `CHUNKSCOPE_CONFIG` or the default path (~/.chunkscope/config.toml).
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CHUNKSCOPE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ChunkScopeError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ChunkScopeError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ChunkScopeError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.retrieval.default_limit == 0 {
            return Err(ChunkScopeError::Config(
                "retrieval.default_limit must be at least 1".into(),
            ));
        }
        if self.retrieval.max_limit < self.retrieval.default_limit {
            return Err(ChunkScopeError::Config(format!(
                "retrieval.max_limit ({}) is below retrieval.default_limit ({})",
                self.retrieval.max_limit, self.retrieval.default_limit
            )));
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the ChunkScope home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chunkscope")
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 3080 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Corpus store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// SQLite database path. `~` is expanded; `:memory:` opens a throwaway store.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String { "~/.chunkscope/corpus.db".into() }

impl CorpusConfig {
    pub fn resolved_db_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.db_path).to_string())
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self { db_path: default_db_path() }
    }
}

/// Retrieval limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Limit applied when a request omits one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Requests asking for more are clamped to this.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

fn default_limit() -> usize { 5 }
fn default_max_limit() -> usize { 50 }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChunkScopeConfig::default();
        assert_eq!(config.gateway.port, 3080);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.retrieval.default_limit, 5);
        assert_eq!(config.retrieval.max_limit, 50);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [gateway]
            port = 9000

            [corpus]
            db_path = ":memory:"

            [retrieval]
            default_limit = 3
            max_limit = 10
        "#;

        let config: ChunkScopeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.corpus.db_path, ":memory:");
        assert_eq!(config.retrieval.default_limit, 3);
        assert_eq!(config.retrieval.max_limit, 10);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: ChunkScopeConfig = toml::from_str("").unwrap();
        assert_eq!(config.retrieval.default_limit, 5);
        assert_eq!(config.corpus.db_path, "~/.chunkscope/corpus.db");
    }

    #[test]
    fn test_tilde_expanded() {
        let corpus = CorpusConfig::default();
        let resolved = corpus.resolved_db_path();
        assert!(!resolved.to_string_lossy().starts_with('~'));
        assert!(resolved.to_string_lossy().ends_with("corpus.db"));
    }

    #[test]
    fn test_invalid_limits_rejected() {
        let dir = std::env::temp_dir().join(format!("chunkscope-cfg-{}", std::process::id()));
        let path = dir.join("config.toml");
        let mut config = ChunkScopeConfig::default();
        config.retrieval.default_limit = 20;
        config.retrieval.max_limit = 10;
        config.save_to(&path).unwrap();

        let err = ChunkScopeConfig::load_from(&path).unwrap_err();
        assert_eq!(err.kind(), "config");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_home_dir() {
        let home = ChunkScopeConfig::home_dir();
        assert!(home.to_string_lossy().contains("chunkscope"));
    }
}
