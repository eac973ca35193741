//! Application configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[serde(default)]` on each section fills missing fields from
//! `Default::default()`, so an old or partial `config.toml` still loads.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use codechat_syntax::DEFAULT_MAX_HIGHLIGHT_BYTES;

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model provider settings
    pub provider: ProviderConfig,

    /// Chat rendering settings
    pub render: RenderConfig,

    /// Code insertion settings
    pub editor: EditorConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("codechat").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Saves the config to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Which model backend answers chat messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Claude,
}

/// Model provider configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Model name sent with each request
    pub model: String,

    /// Chat completions endpoint
    pub endpoint: String,

    /// API key stored in the config file
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is unset
    pub api_key_env: String,
}

impl ProviderConfig {
    /// Returns the configured key, preferring the file over the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::OpenAi,
            model: "gpt-3.5-turbo".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Chat rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Append a `message-time` span to each message
    pub show_timestamps: bool,

    /// chrono format string for timestamps
    pub timestamp_format: String,

    /// Code above this size is escaped but not highlighted
    pub max_highlight_bytes: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            timestamp_format: "%H:%M".to_string(),
            max_highlight_bytes: DEFAULT_MAX_HIGHLIGHT_BYTES,
        }
    }
}

/// Code insertion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Placed between existing content and inserted code
    pub insertion_separator: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            insertion_separator: "\n\n".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.kind, ProviderKind::OpenAi);
        assert_eq!(config.render.timestamp_format, "%H:%M");
        assert_eq!(config.editor.insertion_separator, "\n\n");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[provider]\nkind = \"claude\"\n").unwrap();
        assert_eq!(parsed.provider.kind, ProviderKind::Claude);
        assert_eq!(parsed.provider.model, "gpt-3.5-turbo");
        assert!(parsed.render.show_timestamps);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.render.show_timestamps = false;
        config.provider.api_key = Some("sk-test".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "render = 3").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_api_key_prefers_file() {
        let provider = ProviderConfig {
            api_key: Some("from-file".to_string()),
            api_key_env: "CODECHAT_TEST_UNSET_KEY_VAR".to_string(),
            ..ProviderConfig::default()
        };
        assert_eq!(provider.resolve_api_key().as_deref(), Some("from-file"));

        let provider = ProviderConfig {
            api_key: Some("   ".to_string()),
            ..provider
        };
        assert_eq!(provider.resolve_api_key(), None);
    }
}
