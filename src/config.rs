use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::state::{CompletionParams, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_TOKEN: &str = "API_LUCA";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

pub const BASE_URL_ENV: &str = "HUB_BASE_URL";
pub const API_TOKEN_ENV: &str = "HUB_API_TOKEN";

/// On-disk configuration. Every field is optional; see [`Settings`] for the
/// values actually used.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Fully resolved settings: environment, then config file, then defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub api_token: String,
    pub chat_model: String,
    pub completion: CompletionParams,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_chat_model(model: &str) -> Result<()> {
        Self::save_chat_model_at(&Self::get_config_path()?, model)
    }

    /// Update only `chat_model`. A file that fails to parse is left untouched.
    pub fn save_chat_model_at(path: &Path, model: &str) -> Result<()> {
        let mut config = Self::load_from(path)?;
        config.chat_model = Some(model.to_string());
        config.save_to(path)
    }

    /// Apply process environment overrides and defaults.
    pub fn resolve(&self) -> Settings {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    pub fn resolve_with<F>(&self, env: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = env(BASE_URL_ENV)
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_token = env(API_TOKEN_ENV)
            .or_else(|| self.api_token.clone())
            .unwrap_or_else(|| DEFAULT_API_TOKEN.to_string());

        Settings {
            base_url,
            api_token,
            chat_model: self
                .chat_model
                .clone()
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            completion: CompletionParams {
                temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            },
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("integration-hub").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::new());

        let settings = config.resolve_with(|_| None);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.api_token, DEFAULT_API_TOKEN);
        assert_eq!(settings.chat_model, DEFAULT_CHAT_MODEL);
        assert_eq!(settings.completion, CompletionParams::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            chat_model: Some("gpt-4o-mini".to_string()),
            max_tokens: Some(256),
            ..Config::new()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "base_url": "http://hub:9000" }"#).unwrap();

        let settings = Config::load_from(&path).unwrap().resolve_with(|_| None);
        assert_eq!(settings.base_url, "http://hub:9000");
        assert_eq!(settings.chat_model, DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn environment_wins_over_file() {
        let config = Config {
            base_url: Some("http://from-file".to_string()),
            api_token: Some("file-token".to_string()),
            ..Config::new()
        };
        let settings = config.resolve_with(|key| match key {
            BASE_URL_ENV => Some("http://from-env".to_string()),
            _ => None,
        });
        assert_eq!(settings.base_url, "http://from-env");
        assert_eq!(settings.api_token, "file-token");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn chat_model_save_keeps_other_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "base_url": "http://hub:9000", "api_token": "secret" }"#).unwrap();

        Config::save_chat_model_at(&path, "gpt-4o").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://hub:9000"));
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.chat_model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn chat_model_save_leaves_malformed_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let original = r#"{ "base_url": "http://hub:9000", "api_token": "secret", }"#;
        fs::write(&path, original).unwrap();

        assert!(Config::save_chat_model_at(&path, "gpt-4o").is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn unset_fields_are_not_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config {
            chat_model: Some("gpt-4o".to_string()),
            ..Config::new()
        }
        .save_to(&path)
        .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("chat_model"));
        assert!(!written.contains("null"));
        assert!(!written.contains("base_url"));
    }
}
