use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ProdlensError, Result};

/// Global prodlens configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// JSON file replacing the built-in competitor catalog
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Generative collaborator settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Markup fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Which generative backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AiProvider {
    /// OpenAI-compatible chat completions endpoint
    #[default]
    Openai,
    /// Local Claude CLI
    ClaudeCli,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub provider: AiProvider,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Freshness window for cached generative responses
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    800
}

fn default_ttl_hours() -> u64 {
    24
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; prodlens/0.1)".to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: AiProvider::default(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: default_ttl_hours(),
            path: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the config file path
    ///
    /// Supports PRODLENS_CONFIG environment variable override
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("PRODLENS_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "prodlens")
            .ok_or_else(|| {
                ProdlensError::ConfigError("Could not determine config directory".into())
            })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "prodlens")
            .ok_or_else(|| {
                ProdlensError::ConfigError("Could not determine data directory".into())
            })?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Get the response cache database path
    ///
    /// Supports PRODLENS_CACHE_DB environment variable for test isolation
    pub fn cache_db_path(&self) -> Result<PathBuf> {
        if let Ok(path) = std::env::var("PRODLENS_CACHE_DB") {
            return Ok(PathBuf::from(path));
        }
        if let Some(ref path) = self.cache.path {
            return Ok(path.clone());
        }
        Ok(Self::data_dir()?.join("cache.db"))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ProdlensError::ConfigError(e.to_string()))
    }
}
