//! Service configuration.
//!
//! Settings come from a TOML file (default `./lakeice.toml`), then from the
//! environment. A `.env` file in the working directory is loaded first, so
//! local overrides can live there:
//!
//! - `LAKEICE_DATA_URL`: base URL of the static data host
//! - `LAKEICE_DATA_DIR`: local data directory (takes precedence over the URL)
//!
//! Every field has a default, so a missing file is not an error.

use serde::Deserialize;
use std::path::Path;

use crate::logging::LogLevel;

pub const DEFAULT_CONFIG_PATH: &str = "./lakeice.toml";

pub const ENV_DATA_URL: &str = "LAKEICE_DATA_URL";
pub const ENV_DATA_DIR: &str = "LAKEICE_DATA_DIR";

/// Placeholder substituted with the lake identifier in path templates.
pub const LAKE_ID_PLACEHOLDER: &str = "{lake_id}";

// ---------------------------------------------------------------------------
// Config structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where lake data is read from and how resources are named.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DataConfig {
    /// Base URL of the static data host.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Local data directory. When set, files are read from disk instead.
    #[serde(default)]
    pub data_dir: Option<String>,
    /// HTTP request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub paths: DataPaths,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            data_dir: None,
            timeout_secs: default_timeout_secs(),
            paths: DataPaths::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Resource paths relative to the data root. `{lake_id}` is substituted.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DataPaths {
    #[serde(default = "default_timeseries_path")]
    pub timeseries: String,
    #[serde(default = "default_phenology_path")]
    pub phenology: String,
    /// JSON array of `{NAM_OSM, OBJECT_ID}` used by lake search.
    #[serde(default = "default_lookup_path")]
    pub lookup: String,
    /// GeoJSON FeatureCollection of lake outlines with metadata properties.
    #[serde(default = "default_lakes_path")]
    pub lakes: String,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            timeseries: default_timeseries_path(),
            phenology: default_phenology_path(),
            lookup: default_lookup_path(),
            lakes: default_lakes_path(),
        }
    }
}

fn default_timeseries_path() -> String {
    "/data/timeseries/{lake_id}.csv".to_string()
}

fn default_phenology_path() -> String {
    "/data/phenology/{lake_id}.csv".to_string()
}

fn default_lookup_path() -> String {
    "/data/euhydro_lut.json".to_string()
}

fn default_lakes_path() -> String {
    "/data/euhydro.geojson".to_string()
}

impl DataPaths {
    pub fn timeseries_for(&self, lake_id: &str) -> String {
        self.timeseries.replace(LAKE_ID_PLACEHOLDER, lake_id)
    }

    pub fn phenology_for(&self, lake_id: &str) -> String {
        self.phenology.replace(LAKE_ID_PLACEHOLDER, lake_id)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// One of `debug`, `info`, `warn`, `error`.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            timestamps: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// Parsed level; unknown names fall back to `Info`.
    pub fn min_level(&self) -> LogLevel {
        LogLevel::parse(&self.level).unwrap_or(LogLevel::Info)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, message: String },
    Parse { path: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "Failed to read config {}: {}", path, message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Failed to parse config {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Parses configuration from TOML text.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Loads the TOML file at `path`. A missing file yields the defaults.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&text, &path.display().to_string())
    }

    /// Applies environment overrides, reading variables through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_DATA_URL).filter(|v| !v.trim().is_empty()) {
            self.data.base_url = url;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data.data_dir = Some(dir);
        }
    }

    /// Full load: `.env`, then the TOML file, then environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let mut config = Self::load_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = Config::from_toml("", "inline").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data.paths.timeseries_for("123"), "/data/timeseries/123.csv");
        assert_eq!(config.data.paths.phenology_for("123"), "/data/phenology/123.csv");
    }

    #[test]
    fn test_partial_toml_overrides_only_given_fields() {
        let text = r#"
            [data]
            base_url = "https://lakes.example.org/"
            timeout_secs = 5

            [data.paths]
            lookup = "/lut.json"

            [logging]
            level = "debug"
        "#;
        let config = Config::from_toml(text, "inline").unwrap();
        assert_eq!(config.data.base_url, "https://lakes.example.org/");
        assert_eq!(config.data.timeout_secs, 5);
        assert_eq!(config.data.paths.lookup, "/lut.json");
        assert_eq!(config.data.paths.lakes, "/data/euhydro.geojson");
        assert_eq!(config.logging.min_level(), LogLevel::Debug);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Config::from_toml("[data\nbase_url = 1", "bad.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_env_overrides_apply_and_blank_values_are_ignored() {
        let vars: HashMap<&str, &str> = [(ENV_DATA_URL, "https://mirror.example/"), (ENV_DATA_DIR, "  ")]
            .into_iter()
            .collect();
        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.data.base_url, "https://mirror.example/");
        assert_eq!(config.data.data_dir, None);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load_file(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_info() {
        let logging = LoggingConfig {
            level: "chatty".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(logging.min_level(), LogLevel::Info);
    }
}
