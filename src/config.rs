use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub selection: SelectionSettings,
    pub ratings: RatingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    #[serde(default = "default_places_collection")]
    pub places_collection: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_places_collection() -> String { "places".to_string() }
fn default_poll_interval_secs() -> u64 { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionSettings {
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
            radius_km: default_radius_km(),
            max_results: default_max_results(),
        }
    }
}

// Westwood campus center, the map's initial viewport in the original app
fn default_latitude() -> f64 { 34.0689 }
fn default_longitude() -> f64 { -118.4452 }
fn default_radius_km() -> f64 { 3.0 }
fn default_max_results() -> usize { 50 }

#[derive(Debug, Clone, Deserialize)]
pub struct RatingSettings {
    #[serde(default = "default_min_value")]
    pub min_value: f64,
    #[serde(default = "default_max_value")]
    pub max_value: f64,
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: i64,
    #[serde(default = "default_cold_max")]
    pub cold_max: f64,
    #[serde(default = "default_medium_max")]
    pub medium_max: f64,
    #[serde(default = "default_unrated_band")]
    pub unrated_band: String,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            min_value: default_min_value(),
            max_value: default_max_value(),
            expiry_hours: default_expiry_hours(),
            cold_max: default_cold_max(),
            medium_max: default_medium_max(),
            unrated_band: default_unrated_band(),
        }
    }
}

fn default_min_value() -> f64 { 1.0 }
fn default_max_value() -> f64 { 5.0 }
fn default_expiry_hours() -> i64 { 24 }
fn default_cold_max() -> f64 { 2.333 }
fn default_medium_max() -> f64 { 3.666 }
fn default_unrated_band() -> String { "hot".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with BUSYMAP_)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with BUSYMAP_)
            // e.g., BUSYMAP_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("BUSYMAP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("BUSYMAP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

impl RatingSettings {
    /// Parse the configured unrated fallback band, defaulting to hot when
    /// the value is unrecognized
    pub fn unrated_band(&self) -> crate::models::ConfidenceBand {
        use crate::models::ConfidenceBand;
        match self.unrated_band.to_lowercase().as_str() {
            "cold" => ConfidenceBand::Cold,
            "medium" => ConfidenceBand::Medium,
            _ => ConfidenceBand::Hot,
        }
    }
}
