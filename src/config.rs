use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for faqbot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub completion: CompletionConfig,
}

/// Configuration for the HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

/// Where records and uploaded files live.
///
/// Relative paths are resolved against the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    pub database: PathBuf,
    /// Directory holding uploaded pictures and documents
    pub uploads: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: "records.db".into(),
            uploads: "uploads".into(),
        }
    }
}

impl StorageConfig {
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.database)
    }

    pub fn uploads_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.uploads)
    }
}

/// Configuration for the fallback chat completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// API base URL, without the `/v1/...` suffix
    pub base_url: String,
    pub model: String,
    /// Cap on generated tokens
    pub max_tokens: u32,
    pub temperature: f32,
    /// System instruction sent ahead of every question
    pub system_prompt: String,
    /// API key: literal value or "env:VAR_NAME" to read from environment
    pub api_key: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            model: "gpt-3.5-turbo".into(),
            max_tokens: 150,
            temperature: 0.7,
            system_prompt: "You are a helpful assistant.".into(),
            api_key: Some("env:OPENAI_API_KEY".into()),
        }
    }
}

impl CompletionConfig {
    /// Resolve the API key, supporting "env:VAR_NAME" syntax
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.as_ref().and_then(|key| {
            if let Some(var_name) = key.strip_prefix("env:") {
                std::env::var(var_name).ok().filter(|v| !v.is_empty())
            } else if key.is_empty() {
                None
            } else {
                Some(key.clone())
            }
        })
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Get the path to the faqbot data directory under a root
    pub fn data_dir(root: &Path) -> PathBuf {
        root.join(".faqbot")
    }

    /// Get the config file path under a root
    pub fn config_path(root: &Path) -> PathBuf {
        Self::data_dir(root).join("config.toml")
    }

    /// Load the config of an initialized root, failing if `init` never ran
    pub fn load_initialized(root: &Path) -> Result<Self> {
        let config_path = Self::config_path(root);
        if !config_path.exists() {
            anyhow::bail!(
                "faqbot not initialized in {}. Run `faqbot init` first.",
                root.display()
            );
        }
        Self::load(&config_path).context("Failed to load config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.completion.model, "gpt-3.5-turbo");
        assert_eq!(config.completion.max_tokens, 150);
        assert!((config.completion.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(
            config.completion.system_prompt,
            "You are a helpful assistant."
        );
        assert_eq!(
            config.completion.api_key.as_deref(),
            Some("env:OPENAI_API_KEY")
        );
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[server]
port = 8080

[completion]
model = "gpt-4o-mini"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.completion.max_tokens, 150);
        assert_eq!(config.storage.database, PathBuf::from("records.db"));
    }

    #[test]
    fn test_storage_paths_resolve_against_data_dir() {
        let storage = StorageConfig::default();
        let data_dir = Path::new("/srv/bot/.faqbot");
        assert_eq!(
            storage.database_path(data_dir),
            PathBuf::from("/srv/bot/.faqbot/records.db")
        );
        assert_eq!(
            storage.uploads_path(data_dir),
            PathBuf::from("/srv/bot/.faqbot/uploads")
        );

        let absolute = StorageConfig {
            database: "/var/lib/faqbot.db".into(),
            uploads: "/var/lib/faqbot-uploads".into(),
        };
        assert_eq!(
            absolute.database_path(data_dir),
            PathBuf::from("/var/lib/faqbot.db")
        );
    }

    #[test]
    fn test_api_key_resolve_literal() {
        let config = CompletionConfig {
            api_key: Some("literal-key".into()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key(), Some("literal-key".to_string()));
    }

    #[test]
    fn test_api_key_resolve_env() {
        std::env::set_var("TEST_FAQBOT_API_KEY", "env-value");
        let config = CompletionConfig {
            api_key: Some("env:TEST_FAQBOT_API_KEY".into()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key(), Some("env-value".to_string()));
        std::env::remove_var("TEST_FAQBOT_API_KEY");
    }

    #[test]
    fn test_api_key_resolve_unset_env() {
        let config = CompletionConfig {
            api_key: Some("env:TEST_FAQBOT_UNSET_KEY".into()),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
    }

    #[test]
    fn test_api_key_resolve_empty() {
        let config = CompletionConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());

        let config = CompletionConfig {
            api_key: None,
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::config_path(dir.path());

        let mut config = Config::default();
        config.server.port = 9000;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.server.port, 9000);
        assert_eq!(loaded.completion.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_load_initialized_requires_init() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_initialized(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }
}
