use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

pub const DEFAULT_BACKEND_URL: &str = "https://s-chatterjee2005-stratamind.hf.space";
pub const BACKEND_URL_ENV: &str = "STRATAMIND_BACKEND_URL";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub health_retry_secs: u64,
    pub health_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            health_retry_secs: 10,
            health_timeout_secs: 5,
            request_timeout_secs: 60,
        }
    }

    /// Load from the user config file, then apply the environment override.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_with_env(&config_path, std::env::var(BACKEND_URL_ENV).ok())
    }

    /// Load from `path`; a non-blank `env_backend_url` replaces the file's backend address.
    pub fn load_with_env(path: &Path, env_backend_url: Option<String>) -> Result<Self> {
        Ok(Self::load_from(path)?.with_backend_override(env_backend_url))
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

    /// Replace the backend address when an override is given (blank values are ignored).
    pub fn with_backend_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        self
    }

    /// Base address without a trailing slash, ready for path concatenation
    pub fn base_url(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }

    pub fn health_retry_delay(&self) -> Duration {
        Duration::from_secs(self.health_retry_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("stratamind").join("config.json"))
    }
}
