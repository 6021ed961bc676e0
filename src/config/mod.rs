//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/localdir/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory REST backend
    #[serde(default)]
    pub api: ApiConfig,

    /// Geocoding (Nominatim) settings
    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// Device position settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Default values for searches
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Map link settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Directory REST backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://directory.example.com/api`
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Nominatim base URL
    #[serde(default = "default_geocode_url")]
    pub url: String,

    /// Identifying User-Agent sent with every lookup
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_geocode_timeout")]
    pub timeout_secs: u64,

    /// Cache lifetime in seconds
    #[serde(default = "default_geocode_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Persist the cache between CLI invocations (cleared on logout)
    #[serde(default)]
    pub persist_cache: bool,
}

/// Device position settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Position endpoint (must be HTTPS unless loopback)
    #[serde(default = "default_position_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_location_timeout")]
    pub timeout_secs: u64,

    /// Reuse a fix younger than this many seconds
    #[serde(default = "default_location_maximum_age")]
    pub maximum_age_secs: u64,

    /// Ask the source for its most precise fix
    #[serde(default = "default_true")]
    pub high_accuracy: bool,
}

/// Default values for searches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default result view (list, grid, map, json)
    #[serde(default = "default_view")]
    pub view: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Map link settings
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
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_api_timeout() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}
fn default_geocode_url() -> String {
    DEFAULT_GEOCODE_URL.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_geocode_timeout() -> u64 {
    DEFAULT_GEOCODE_TIMEOUT_SECS
}
fn default_geocode_cache_ttl() -> u64 {
    DEFAULT_GEOCODE_CACHE_TTL_SECS
}
fn default_position_url() -> String {
    DEFAULT_POSITION_URL.to_string()
}
fn default_location_timeout() -> u64 {
    DEFAULT_LOCATION_TIMEOUT_SECS
}
fn default_location_maximum_age() -> u64 {
    DEFAULT_LOCATION_MAXIMUM_AGE_SECS
}
fn default_true() -> bool {
    true
}
fn default_view() -> String {
    DEFAULT_VIEW.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/search/?api=1&query={lat},{lng}".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lng}#map=17/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            geocode: GeocodeConfig::default(),
            location: LocationConfig::default(),
            defaults: DefaultsConfig::default(),
            server: ServerConfig::default(),
            url: UrlConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            url: default_geocode_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_geocode_timeout(),
            cache_ttl_secs: default_geocode_cache_ttl(),
            persist_cache: false,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            url: default_position_url(),
            timeout_secs: default_location_timeout(),
            maximum_age_secs: default_location_maximum_age(),
            high_accuracy: true,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            view: default_view(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
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

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GeocodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
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

    /// Directory for disposable data (geocode cache)
    pub fn cache_dir() -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine cache directory".to_string()))
    }

    /// Directory for user data (session)
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
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

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["api", "url"] => Some(self.api.url.clone()),
            ["api", "timeout_secs"] => Some(self.api.timeout_secs.to_string()),

            ["geocode", "url"] => Some(self.geocode.url.clone()),
            ["geocode", "user_agent"] => Some(self.geocode.user_agent.clone()),
            ["geocode", "timeout_secs"] => Some(self.geocode.timeout_secs.to_string()),
            ["geocode", "cache_ttl_secs"] => Some(self.geocode.cache_ttl_secs.to_string()),
            ["geocode", "persist_cache"] => Some(self.geocode.persist_cache.to_string()),

            ["location", "url"] => Some(self.location.url.clone()),
            ["location", "timeout_secs"] => Some(self.location.timeout_secs.to_string()),
            ["location", "maximum_age_secs"] => {
                Some(self.location.maximum_age_secs.to_string())
            }
            ["location", "high_accuracy"] => Some(self.location.high_accuracy.to_string()),

            ["defaults", "view"] => Some(self.defaults.view.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["api", "url"] => self.api.url = value.trim_end_matches('/').to_string(),
            ["api", "timeout_secs"] => self.api.timeout_secs = parse_value(key, value)?,

            ["geocode", "url"] => self.geocode.url = value.trim_end_matches('/').to_string(),
            ["geocode", "user_agent"] => {
                if value.trim().is_empty() {
                    return Err(Error::Config("User agent must not be empty".to_string()));
                }
                self.geocode.user_agent = value.to_string();
            }
            ["geocode", "timeout_secs"] => self.geocode.timeout_secs = parse_value(key, value)?,
            ["geocode", "cache_ttl_secs"] => {
                self.geocode.cache_ttl_secs = parse_value(key, value)?;
            }
            ["geocode", "persist_cache"] => {
                self.geocode.persist_cache = parse_value(key, value)?;
            }

            ["location", "url"] => self.location.url = value.to_string(),
            ["location", "timeout_secs"] => self.location.timeout_secs = parse_value(key, value)?,
            ["location", "maximum_age_secs"] => {
                self.location.maximum_age_secs = parse_value(key, value)?;
            }
            ["location", "high_accuracy"] => {
                self.location.high_accuracy = parse_value(key, value)?;
            }

            ["defaults", "view"] => {
                if crate::render::get_renderer(value).is_none() {
                    return Err(Error::Config(format!("Unknown view: {}", value)));
                }
                self.defaults.view = value.to_lowercase();
            }

            ["server", "host"] => self.server.host = value.to_string(),
            ["server", "port"] => self.server.port = parse_value(key, value)?,

            ["url", "default"] => {
                if !self.url.providers.contains_key(value) {
                    return Err(Error::Config(format!("Unknown URL provider: {}", value)));
                }
                self.url.default = value.to_string();
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
            "api.url",
            "api.timeout_secs",
            "geocode.url",
            "geocode.user_agent",
            "geocode.timeout_secs",
            "geocode.cache_ttl_secs",
            "geocode.persist_cache",
            "location.url",
            "location.timeout_secs",
            "location.maximum_age_secs",
            "location.high_accuracy",
            "defaults.view",
            "server.host",
            "server.port",
            "url.default",
        ]
    }

    /// Format a map URL using the specified provider
    ///
    /// Replaces {lat} and {lng} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self
            .url
            .providers
            .get(provider_name)
            .ok_or_else(|| Error::Config(format!("Unknown URL provider: {}", provider_name)))?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn with_temp_config<F: FnOnce()>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.geocode.timeout_secs, 8);
        assert_eq!(config.geocode.cache_ttl_secs, 86_400);
        assert_eq!(config.location.timeout_secs, 15);
        assert_eq!(config.location.maximum_age_secs, 300);
        assert!(config.location.high_accuracy);
        assert_eq!(config.defaults.view, "list");
        assert!(config.geocode.user_agent.starts_with("localdir/"));
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        config.set("api.url", "https://dir.example.com/api/").unwrap();
        assert_eq!(
            config.get("api.url"),
            Some("https://dir.example.com/api".to_string())
        );

        config.set("geocode.timeout_secs", "5").unwrap();
        assert_eq!(config.geocode.timeout(), Duration::from_secs(5));

        config.set("defaults.view", "MAP").unwrap();
        assert_eq!(config.get("defaults.view"), Some("map".to_string()));
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("server.port", "not_a_number").is_err());
        assert!(config.set("defaults.view", "carousel").is_err());
        assert!(config.set("url.default", "bing").is_err());
        assert!(config.set("geocode.user_agent", "  ").is_err());
    }

    #[test]
    fn test_format_url() {
        let config = Config::default();

        let url = config.format_url(Some("apple"), 42.36, -71.06).unwrap();
        assert_eq!(url, "https://maps.apple.com/?ll=42.36,-71.06");

        let url = config.format_url(None, 42.36, -71.06).unwrap();
        assert!(url.contains("openstreetmap.org"));
        assert!(url.contains("mlat=42.36"));
    }

    #[test]
    fn test_format_url_unknown_provider() {
        let config = Config::default();
        assert!(config.format_url(Some("unknown"), 0.0, 0.0).is_err());
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.api.url = "https://dir.example.com/api".to_string();
            config.server.port = 9000;
            config.save().unwrap();

            let loaded = Config::load().unwrap();
            assert_eq!(loaded.api.url, "https://dir.example.com/api");
            assert_eq!(loaded.server.port, 9000);
        });
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[api]\nurl = \"http://x\"\n").unwrap();
        assert_eq!(loaded.api.url, "http://x");
        assert_eq!(loaded.api.timeout_secs, DEFAULT_API_TIMEOUT_SECS);
        assert_eq!(loaded.geocode.timeout_secs, 8);
        assert!(!loaded.geocode.persist_cache);
        assert!(loaded.url.providers.contains_key("google"));

        let loaded: Config = toml::from_str("[geocode]\nurl = \"http://g\"\n").unwrap();
        assert!(!loaded.geocode.persist_cache);
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[api]"));
        assert!(toml.contains("[geocode]"));
        assert!(toml.contains("[location]"));
        assert!(toml.contains("[url.providers]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7979");
    }

    #[test]
    fn test_available_keys_resolve() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "key {} has no getter", key);
        }
    }
}
