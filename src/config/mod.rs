//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/gf-finder/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use crate::place::{Filter, Place};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Places backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Analytics settings
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Directions URL settings
    #[serde(default)]
    pub url: UrlConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL the endpoints are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Filter active at startup; empty means none
    #[serde(default = "default_filter")]
    pub default_filter: String,

    /// Filters offered to the user
    #[serde(default = "default_filters")]
    pub filters: Vec<String>,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,
}

/// Analytics settings
///
/// The measurement id is stored for deployments that report page views; the
/// client itself never sends anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub measurement_id: String,
}

/// Directions URL settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_filter() -> String {
    DEFAULT_FILTER.to_string()
}
fn default_filters() -> Vec<String> {
    DEFAULT_FILTERS.iter().map(|f| f.to_string()).collect()
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/search/?api=1&query={query}&query_place_id={place_id}"
            .to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lng}#map=18/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?q={query}&ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_filter: default_filter(),
            filters: default_filters(),
            format: default_format(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl SearchConfig {
    /// Parse the offered filters, dropping duplicates
    pub fn filter_set(&self) -> Result<Vec<Filter>> {
        let mut set = Vec::new();
        for name in &self.filters {
            let filter: Filter = name.parse().map_err(Error::Config)?;
            if !set.contains(&filter) {
                set.push(filter);
            }
        }

        if set.is_empty() {
            return Err(Error::Config("search.filters must not be empty".to_string()));
        }
        Ok(set)
    }

    /// Parse the startup filter; `None` when left empty
    pub fn default_filter(&self) -> Result<Option<Filter>> {
        let name = self.default_filter.trim();
        if name.is_empty() {
            return Ok(None);
        }
        name.parse().map(Some).map_err(Error::Config)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path, then apply environment
    /// overrides
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load the file alone, without environment overrides
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Apply `GF_FINDER_*` overrides looked up through `lookup`
    ///
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_BACKEND_URL) {
            self.backend.base_url = url;
        }
        if let Some(id) = non_empty(ENV_MEASUREMENT_ID) {
            self.analytics.measurement_id = id;
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path ("section.key")
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["backend", "base_url"] => Some(self.backend.base_url.clone()),

            ["search", "default_filter"] => Some(self.search.default_filter.clone()),
            ["search", "filters"] => Some(self.search.filters.join(",")),
            ["search", "format"] => Some(self.search.format.clone()),

            ["analytics", "measurement_id"] => Some(self.analytics.measurement_id.clone()),

            ["url", "default"] => Some(self.url.default.clone()),
            ["url", "providers", name] => self.url.providers.get(*name).cloned(),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Filter values are checked before they are stored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["backend", "base_url"] => {
                if value.trim().is_empty() {
                    return Err(Error::Config("base_url cannot be empty".to_string()));
                }
                self.backend.base_url = value.trim().to_string();
            }

            ["search", "default_filter"] => {
                let value = value.trim();
                if !value.is_empty() {
                    value.parse::<Filter>().map_err(Error::Config)?;
                }
                self.search.default_filter = value.to_string();
            }
            ["search", "filters"] => {
                let filters: Vec<String> = value
                    .split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect();
                let candidate = SearchConfig {
                    filters,
                    ..self.search.clone()
                };
                candidate.filter_set()?;
                self.search.filters = candidate.filters;
            }
            ["search", "format"] => {
                self.search.format = value.to_string();
            }

            ["analytics", "measurement_id"] => {
                self.analytics.measurement_id = value.to_string();
            }

            ["url", "default"] => {
                if !self.url.providers.contains_key(value) {
                    return Err(Error::Config(format!("Unknown URL provider: {}", value)));
                }
                self.url.default = value.to_string();
            }
            ["url", "providers", name] => {
                self.url.providers.insert(name.to_string(), value.to_string());
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "backend.base_url",
            "search.default_filter",
            "search.filters",
            "search.format",
            "analytics.measurement_id",
            "url.default",
            "url.providers.<name>",
        ]
    }

    /// Directions link for `place` using the specified provider
    ///
    /// Replaces {query}, {place_id}, {lat} and {lng}; text placeholders are
    /// percent-encoded.
    pub fn directions_url(&self, provider: Option<&str>, place: &Place) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self
            .url
            .providers
            .get(provider_name)
            .ok_or_else(|| Error::Config(format!("Unknown URL provider: {}", provider_name)))?;

        let query = format!("{}, {}", place.name, place.address);

        Ok(template
            .replace("{query}", &urlencoding::encode(&query))
            .replace("{place_id}", &urlencoding::encode(&place.id))
            .replace("{lat}", &place.coordinate.lat.to_string())
            .replace("{lng}", &place.coordinate.lng.to_string()))
    }
}
