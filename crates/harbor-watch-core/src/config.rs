use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::ai::direct::{DEFAULT_INFERENCE_URL, DEFAULT_MODEL};
use crate::prompt::DEFAULT_GREETING;
use crate::provider::BackendKind;

pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8787/api/chat";
pub const DEFAULT_PROXY_BIND: &str = "127.0.0.1:8787";

/// Environment variables checked for the inference credential, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["HARBOR_WATCH_API_KEY", "GROQ_API_KEY"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_bind: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            backend: Some(BackendKind::Proxy.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {}: {}", path.display(), e))?;
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

    pub fn backend_kind(&self) -> Result<BackendKind> {
        match self.backend.as_deref() {
            None => Ok(BackendKind::default()),
            Some(name) => BackendKind::from_str(name).ok_or_else(|| {
                let known: Vec<&str> = BackendKind::all().iter().map(|k| k.as_str()).collect();
                anyhow!("Unknown backend '{}' (expected one of: {})", name, known.join(", "))
            }),
        }
    }

    pub fn proxy_url(&self) -> &str {
        self.proxy_url.as_deref().unwrap_or(DEFAULT_PROXY_URL)
    }

    pub fn inference_url(&self) -> &str {
        self.inference_url.as_deref().unwrap_or(DEFAULT_INFERENCE_URL)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn proxy_bind(&self) -> &str {
        self.proxy_bind.as_deref().unwrap_or(DEFAULT_PROXY_BIND)
    }

    /// Greeting shown when the chat opens; an empty string disables it.
    pub fn greeting(&self) -> Option<&str> {
        match self.greeting.as_deref() {
            None => Some(DEFAULT_GREETING),
            Some(g) if g.trim().is_empty() => None,
            Some(g) => Some(g),
        }
    }

    /// Inference credential - env vars first, then config
    pub fn api_key(&self) -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|k| !k.is_empty()))
            .or_else(|| self.api_key.clone().filter(|k| !k.is_empty()))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("harbor-watch"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.backend_kind().unwrap(), BackendKind::Proxy);
        assert_eq!(config.proxy_url(), DEFAULT_PROXY_URL);
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.greeting(), Some(DEFAULT_GREETING));
    }

    #[test]
    fn save_creates_parent_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            backend: Some("direct".to_string()),
            model: Some("llama3-70b-8192".to_string()),
            context: Some("Tide: 1.2m rising".to_string()),
            greeting: Some(String::new()),
            ..Config::new()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.backend_kind().unwrap(), BackendKind::Direct);
        assert_eq!(loaded.model(), "llama3-70b-8192");
        assert_eq!(loaded.greeting(), None);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let config = Config {
            backend: Some("carrier-pigeon".to_string()),
            ..Config::new()
        };
        let err = config.backend_kind().unwrap_err().to_string();
        assert!(err.contains("carrier-pigeon"));
        assert!(err.contains("proxy, direct"));
    }

    #[test]
    fn invalid_json_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }
}
