//! Configuration loading and config file resolution
//!
//! Settings are resolved in the following priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! Command-line and environment values arrive together as [`ConfigOverrides`]
//! (clap merges the two in the binary). A missing TOML file is not an error:
//! the service starts on compiled defaults. Loading reports where values came
//! from as a [`ConfigSource`] so the binary can log it once tracing is up.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Public Overpass API interpreter endpoint
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Public OSRM demo server
pub const DEFAULT_ROUTING_URL: &str = "https://router.project-osrm.org";

/// Keyword analysis microservice (local sidecar by default)
pub const DEFAULT_KEYWORD_URL: &str = "http://127.0.0.1:8000";

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_OVERPASS_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_RADIUS_METERS: u32 = 1000;
pub const DEFAULT_ROUTING_PROFILE: &str = "driving";

/// Amenity values searched when a facility request names neither
/// `amenities` nor `keyword`
pub const DEFAULT_AMENITIES: &[&str] = &["restaurant", "cafe", "convenience"];

/// Application name used for the per-user config directory
const APP_DIR: &str = "poi-search";

/// Bootstrap configuration loaded from TOML file
///
/// Every section is optional; absent keys fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub overpass: OverpassConfig,
    pub routing: RoutingConfig,
    pub keyword: KeywordConfig,
    pub dictionary: DictionaryConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub bind: String,
    /// HTTP server port
    pub port: u16,
}

/// Overpass API settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OverpassConfig {
    /// Interpreter endpoint receiving the Overpass QL body
    pub url: String,
    /// Client-side timeout; also written into the query header
    pub timeout_secs: u64,
}

/// OSRM routing service settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Base URL (without `/route/v1`)
    pub url: String,
    /// OSRM profile segment (`driving`, `walking`, ...)
    pub profile: String,
}

/// Keyword analysis microservice settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct KeywordConfig {
    /// Base URL (without `/api/v1/analyze-keywords`)
    pub url: String,
}

/// Category dictionary settings
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DictionaryConfig {
    /// CSV file mapping category names to tag filter lists; unset means the
    /// dictionary built into the binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Search defaults
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Radius used when a request omits `radius`
    pub default_radius: u32,
    /// Amenity values used when a request omits both `amenities` and `keyword`
    pub default_amenities: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OVERPASS_URL.to_string(),
            timeout_secs: DEFAULT_OVERPASS_TIMEOUT_SECS,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ROUTING_URL.to_string(),
            profile: DEFAULT_ROUTING_PROFILE.to_string(),
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_KEYWORD_URL.to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius: DEFAULT_RADIUS_METERS,
            default_amenities: DEFAULT_AMENITIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where the bootstrap configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// Named file does not exist; compiled defaults used
    Missing(PathBuf),
    /// No config file located; compiled defaults used
    Defaults,
}

/// Command-line / environment configuration overrides
///
/// `None` leaves the TOML (or default) value in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub overpass_url: Option<String>,
    pub overpass_timeout_secs: Option<u64>,
    pub routing_url: Option<String>,
    pub keyword_url: Option<String>,
    pub dictionary_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config file if one exists, otherwise compiled defaults
    ///
    /// A missing file is not an error; an unreadable or malformed file is.
    pub fn load_or_default(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match path {
            Some(path) if path.exists() => {
                let config = Self::load(path)?;
                Ok((config, ConfigSource::File(path.to_path_buf())))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Missing(path.to_path_buf()))),
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Apply command-line / environment overrides on top of file values
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(url) = overrides.overpass_url {
            self.overpass.url = url;
        }
        if let Some(secs) = overrides.overpass_timeout_secs {
            self.overpass.timeout_secs = secs;
        }
        if let Some(url) = overrides.routing_url {
            self.routing.url = url;
        }
        if let Some(url) = overrides.keyword_url {
            self.keyword.url = url;
        }
        if let Some(path) = overrides.dictionary_path {
            self.dictionary.path = Some(path);
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        self
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.overpass.timeout_secs == 0 {
            return Err(Error::Config(
                "overpass.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.search.default_radius == 0 {
            return Err(Error::Config(
                "search.default_radius must be greater than zero".to_string(),
            ));
        }
        for (name, url) in [
            ("overpass.url", &self.overpass.url),
            ("routing.url", &self.routing.url),
            ("keyword.url", &self.keyword.url),
        ] {
            if url.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", name)));
            }
        }
        if self.routing.profile.trim().is_empty() {
            return Err(Error::Config("routing.profile must not be empty".to_string()));
        }
        if !self
            .search
            .default_amenities
            .iter()
            .any(|a| !a.trim().is_empty())
        {
            return Err(Error::Config(
                "search.default_amenities must name at least one amenity".to_string(),
            ));
        }
        Ok(())
    }
}

/// Locate the config file
///
/// Priority: explicit path (CLI or `POI_SEARCH_CONFIG`), then the per-user
/// config directory, then `/etc/poi-search/config.toml` on Linux. Returns the
/// explicit path even if it does not exist so the caller can warn about it.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
