// Worker settings (TOML, embedded at compile time)

use crate::error::{BackgroundError, Result};
use serde::Deserialize;

/// Settings compiled into the wasm binary.
const EMBEDDED_CONFIG: &str = include_str!("../config/background.toml");

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub navigation: NavigationConfig,
    pub connection: ConnectionConfig,
    pub storage: StorageConfig,
    pub icon: IconConfig,
    pub scorer: ScorerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Substring a completed navigation URL must contain.
    pub target_domain: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            target_domain: "messenger.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Port name the content script connects with.
    pub channel: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            channel: "listener".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub current_thread_key: String,
    pub thread_key_prefix: String,
    /// Most recent entries kept per stored table.
    pub history_limit: usize,
    pub write_attempts: u32,
    pub retry_backoff_ms: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            current_thread_key: "currentThread".to_string(),
            thread_key_prefix: "thread:".to_string(),
            history_limit: 20,
            write_attempts: 3,
            retry_backoff_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub positive: String,
    pub negative: String,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            positive: "assets/icon_green.png".to_string(),
            negative: "assets/icon_red.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    Lexicon,
    Placeholder,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub kind: ScorerKind,
    /// Messages scored together; 1 scores each message on its own.
    pub window: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            kind: ScorerKind::Lexicon,
            window: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> Result<log::Level> {
        self.level
            .parse()
            .map_err(|_| BackgroundError::InvalidConfig(format!("Invalid log level: {}", self.level)))
    }
}

impl Config {
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.navigation.target_domain.is_empty() {
            return Err(BackgroundError::InvalidConfig(
                "navigation.target_domain must not be empty".to_string(),
            ));
        }
        if self.storage.current_thread_key.is_empty() {
            return Err(BackgroundError::InvalidConfig(
                "storage.current_thread_key must not be empty".to_string(),
            ));
        }
        if self.storage.history_limit < 2 {
            return Err(BackgroundError::InvalidConfig(format!(
                "storage.history_limit must be at least 2, got {}",
                self.storage.history_limit
            )));
        }
        if self.storage.write_attempts == 0 {
            return Err(BackgroundError::InvalidConfig(
                "storage.write_attempts must be at least 1".to_string(),
            ));
        }
        if self.scorer.window == 0 {
            return Err(BackgroundError::InvalidConfig(
                "scorer.window must be at least 1".to_string(),
            ));
        }
        self.logging.level()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_embedded_config_parses() {
        let config = Config::embedded().unwrap();
        assert_eq!(config.navigation.target_domain, "messenger.com");
        assert_eq!(config.connection.channel, "listener");
        assert_eq!(config.storage.current_thread_key, "currentThread");
        assert_eq!(config.scorer.kind, ScorerKind::Lexicon);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [scorer]
            kind = "placeholder"

            [storage]
            history_limit = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.scorer.kind, ScorerKind::Placeholder);
        assert_eq!(config.scorer.window, 1);
        assert_eq!(config.storage.history_limit, 5);
        assert_eq!(config.storage.write_attempts, 3);
        assert_eq!(config.icon.positive, "assets/icon_green.png");
        assert_eq!(config.logging.level().unwrap(), log::Level::Info);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Config::from_toml_str("[scorer]\nwindow = 0").is_err());
        assert!(Config::from_toml_str("[storage]\nwrite_attempts = 0").is_err());
        assert!(Config::from_toml_str("[logging]\nlevel = \"loud\"").is_err());
        assert!(Config::from_toml_str("[scorer]\nkind = \"neural\"").is_err());
    }

    #[test]
    fn test_icons_ship_with_the_extension() {
        let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
        let config = Config::embedded().unwrap();
        for icon in [&config.icon.positive, &config.icon.negative] {
            assert!(static_dir.join(icon).is_file(), "missing icon {}", icon);
        }

        let manifest: serde_json::Value = serde_json::from_str(include_str!("../static/manifest.json")).unwrap();
        let default_icon = manifest["action"]["default_icon"].as_str().unwrap();
        assert!(static_dir.join(default_icon).is_file(), "missing icon {}", default_icon);
    }
}
