//! Configuration management for the tutor.
//!
//! Configuration is loaded from `~/.config/ai-tutor/config.toml` when it
//! exists. Credentials and hosts from the environment take precedence over
//! the file.

use crate::models::ModelKey;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model selected when the session starts.
    #[serde(default)]
    pub default_model: ModelKey,
    /// Directory conversation exports are written to.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
    /// OpenAI backend settings.
    #[serde(default)]
    pub openai: OpenAIConfig,
    /// Ollama backend settings.
    #[serde(default)]
    pub ollama: OllamaConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: ModelKey::default(),
            export_dir: default_export_dir(),
            openai: OpenAIConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// OpenAI API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// API key (prefer OPENAI_API_KEY env var).
    #[serde(default)]
    pub api_key: Option<String>,
    /// API base URL (default: https://api.openai.com/v1).
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Sampling temperature (default: 0.7).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Output length cap in tokens (default: 2000).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Ollama daemon settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama host URL (default: http://localhost:11434).
    #[serde(default = "default_ollama_host")]
    pub host: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("ai-tutor"))
            .context("Could not determine config directory")
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location and apply environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from file, using defaults if not found.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` in
    /// production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(host) = non_empty("OLLAMA_HOST") {
            self.ollama.host = normalize_host(&host);
        }
    }
}

/// `OLLAMA_HOST` is commonly set without a scheme (`127.0.0.1:11434`).
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_model, ModelKey::Llama);
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(config.openai.max_tokens, 2000);
        assert!((config.openai.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.ollama.host, "http://localhost:11434");
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
default_model = "gpt"
export_dir = "/tmp/tutor"

[openai]
temperature = 0.2

[ollama]
host = "http://gpu-box:11434"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.default_model, ModelKey::Gpt);
        assert_eq!(config.export_dir, PathBuf::from("/tmp/tutor"));
        assert!((config.openai.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.openai.max_tokens, 2000);
        assert_eq!(config.ollama.host, "http://gpu-box:11434");
    }

    #[test]
    fn test_unknown_default_model_is_rejected() {
        let result: Result<Config, _> = toml::from_str(r#"default_model = "claude""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.default_model, ModelKey::Llama);
    }

    #[test]
    fn test_load_invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_model = [").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("OLLAMA_HOST", "127.0.0.1:11434/"),
            ("OPENAI_BASE_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.ollama.host, "http://127.0.0.1:11434");
    }
}
