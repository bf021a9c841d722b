//! Runtime configuration for the gallery client and the biography proxy.
//!
//! Configuration is read from an optional RON file; every field has a default
//! so an empty file (or no file) is a valid configuration. A few values can be
//! overridden from the environment.

use crate::errors::{ConfigError, ConfigResult};
use crate::favorites::FAVORITES_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_BIO_ENDPOINT: &str = "http://127.0.0.1:8787/.netlify/functions/generate-bios";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub const ENV_CATALOG_URL: &str = "POKEDEX_CATALOG_URL";
pub const ENV_BIO_ENDPOINT: &str = "POKEDEX_BIO_ENDPOINT";
pub const ENV_FAVORITES_PATH: &str = "POKEDEX_FAVORITES_PATH";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog_url: String,
    /// Size of the catalog index sampled for the random list
    pub catalog_limit: u32,
    /// Number of records shown on the initial list
    pub random_count: usize,
    pub search_debounce_ms: u64,
    pub favorites_path: PathBuf,
    pub bio: BioSettings,
    pub animation: AnimationSettings,
}

/// Advisory parameters sent along with every biography request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BioSettings {
    pub endpoint: String,
    pub language: String,
    pub max_words: u32,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub shake_ms: u64,
    pub open_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            catalog_limit: 1025,
            random_count: 30,
            search_debounce_ms: 300,
            favorites_path: PathBuf::from(format!("{FAVORITES_KEY}.json")),
            bio: BioSettings::default(),
            animation: AnimationSettings::default(),
        }
    }
}

impl Default for BioSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_BIO_ENDPOINT.to_string(),
            language: "es".to_string(),
            max_words: 40,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
        }
    }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            shake_ms: 700,
            open_ms: 600,
        }
    }
}

impl AppConfig {
    /// Load from a RON file if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_CATALOG_URL) {
            self.catalog_url = url;
        }
        if let Some(endpoint) = lookup(ENV_BIO_ENDPOINT) {
            self.bio.endpoint = endpoint;
        }
        if let Some(path) = lookup(ENV_FAVORITES_PATH) {
            self.favorites_path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.catalog_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "catalog_url",
                details: "must not be empty".to_string(),
            });
        }
        if self.random_count as u64 > self.catalog_limit as u64 {
            return Err(ConfigError::Invalid {
                field: "random_count",
                details: format!(
                    "{} exceeds catalog_limit {}",
                    self.random_count, self.catalog_limit
                ),
            });
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl AnimationSettings {
    pub fn shake(&self) -> Duration {
        Duration::from_millis(self.shake_ms)
    }

    pub fn open(&self) -> Duration {
        Duration::from_millis(self.open_ms)
    }
}

/// Configuration of the biography proxy server.
///
/// The API key is never read from a file; it only comes from `GEMINI_API_KEY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub bind: String,
    pub model: String,
    pub upstream_url: String,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            model: DEFAULT_MODEL.to_string(),
            upstream_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
        }
    }
}

impl ProxyConfig {
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                ron::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Self::default(),
        };
        config.api_key = std::env::var(ENV_GEMINI_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Ok(config)
    }
}
