//! Configuration management for the `MuseAtlas` pipeline
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AtlasError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `MuseAtlas` pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Open-data API configuration
    #[serde(default)]
    pub opendata: OpendataConfig,
    /// Routing (isochrone) API configuration
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Wikipedia scraping configuration
    #[serde(default)]
    pub scraping: ScrapingConfig,
    /// Record-linkage configuration
    #[serde(default)]
    pub linker: LinkerConfig,
    /// Output file locations
    #[serde(default)]
    pub output: OutputConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Open-data API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpendataConfig {
    /// Base URL of the Opendatasoft explore API
    #[serde(default = "default_opendata_base_url")]
    pub base_url: String,
    /// Dataset identifier
    #[serde(default = "default_opendata_dataset")]
    pub dataset: String,
    /// Commune filter applied to the query
    #[serde(default = "default_opendata_commune")]
    pub commune: String,
    /// Page size for the paginated query
    #[serde(default = "default_opendata_page_size")]
    pub page_size: u32,
    /// Request timeout in seconds
    #[serde(default = "default_opendata_timeout")]
    pub timeout_seconds: u32,
}

/// Routing API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// OpenRouteService API key
    pub api_key: Option<String>,
    /// Base URL for the routing API
    #[serde(default = "default_routing_base_url")]
    pub base_url: String,
    /// Travel profile used for isochrones
    #[serde(default = "default_routing_profile")]
    pub profile: String,
    /// Travel-time thresholds in seconds, ascending
    #[serde(default = "default_routing_ranges")]
    pub ranges_seconds: Vec<u32>,
    /// Request timeout in seconds
    #[serde(default = "default_routing_timeout")]
    pub timeout_seconds: u32,
}

/// Wikipedia scraping configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingConfig {
    /// URL of the catalog page listing museums
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    /// User agent sent with scraping requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout ceiling in seconds
    #[serde(default = "default_scrape_timeout")]
    pub timeout_seconds: u32,
    /// Word budget for article summaries
    #[serde(default = "default_summary_word_budget")]
    pub summary_word_budget: usize,
}

/// Record-linkage configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Minimum score a candidate must reach to count as a match
    #[serde(default = "default_linker_threshold")]
    pub threshold: f64,
}

/// Output file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base directory for all generated files
    #[serde(default = "default_output_base_dir")]
    pub base_dir: String,
    /// Path to the Paris boundary GeoJSON, relative to `base_dir`
    #[serde(default = "default_boundary_file")]
    pub boundary_file: String,
    /// Path to the stations GeoJSON, relative to `base_dir`
    #[serde(default = "default_stations_file")]
    pub stations_file: String,
    /// Attribution line printed at the bottom of each report
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_opendata_base_url() -> String {
    "https://data.iledefrance.fr/api/explore/v2.1".to_string()
}

fn default_opendata_dataset() -> String {
    "liste_des_musees_franciliens".to_string()
}

fn default_opendata_commune() -> String {
    "Paris".to_string()
}

fn default_opendata_page_size() -> u32 {
    100
}

fn default_opendata_timeout() -> u32 {
    30
}

fn default_routing_base_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_routing_profile() -> String {
    "foot-walking".to_string()
}

fn default_routing_ranges() -> Vec<u32> {
    vec![300, 600]
}

fn default_routing_timeout() -> u32 {
    30
}

fn default_catalog_url() -> String {
    "https://fr.wikipedia.org/wiki/Mus%C3%A9e_de_France".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_scrape_timeout() -> u32 {
    10
}

fn default_summary_word_budget() -> usize {
    150
}

fn default_linker_threshold() -> f64 {
    0.4
}

fn default_output_base_dir() -> String {
    "output".to_string()
}

fn default_boundary_file() -> String {
    "Paris.geojson".to_string()
}

fn default_stations_file() -> String {
    "Gares_4326.geojson".to_string()
}

fn default_attribution() -> String {
    "Atlas des musées de Paris dotés de l'appellation 'Musée de France' au sens du Code du \
     patrimoine.\nSource des données : Open Data Région Ile de France, https://data.iledefrance.fr"
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for OpendataConfig {
    fn default() -> Self {
        Self {
            base_url: default_opendata_base_url(),
            dataset: default_opendata_dataset(),
            commune: default_opendata_commune(),
            page_size: default_opendata_page_size(),
            timeout_seconds: default_opendata_timeout(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_routing_base_url(),
            profile: default_routing_profile(),
            ranges_seconds: default_routing_ranges(),
            timeout_seconds: default_routing_timeout(),
        }
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_scrape_timeout(),
            summary_word_budget: default_summary_word_budget(),
        }
    }
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            threshold: default_linker_threshold(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: default_output_base_dir(),
            boundary_file: default_boundary_file(),
            stations_file: default_stations_file(),
            attribution: default_attribution(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AtlasConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with MUSEATLAS_ prefix
        builder = builder.add_source(
            Environment::with_prefix("MUSEATLAS")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AtlasConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("museatlas").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.opendata.base_url.is_empty() {
            self.opendata.base_url = default_opendata_base_url();
        }
        if self.opendata.dataset.is_empty() {
            self.opendata.dataset = default_opendata_dataset();
        }
        if self.opendata.page_size == 0 {
            self.opendata.page_size = default_opendata_page_size();
        }
        if self.opendata.timeout_seconds == 0 {
            self.opendata.timeout_seconds = default_opendata_timeout();
        }
        if self.routing.base_url.is_empty() {
            self.routing.base_url = default_routing_base_url();
        }
        if self.routing.profile.is_empty() {
            self.routing.profile = default_routing_profile();
        }
        if self.routing.ranges_seconds.is_empty() {
            self.routing.ranges_seconds = default_routing_ranges();
        }
        if self.routing.timeout_seconds == 0 {
            self.routing.timeout_seconds = default_routing_timeout();
        }
        if self.scraping.user_agent.is_empty() {
            self.scraping.user_agent = default_user_agent();
        }
        if self.scraping.timeout_seconds == 0 {
            self.scraping.timeout_seconds = default_scrape_timeout();
        }
        if self.scraping.summary_word_budget == 0 {
            self.scraping.summary_word_budget = default_summary_word_budget();
        }
        if self.output.base_dir.is_empty() {
            self.output.base_dir = default_output_base_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.routing.api_key {
            if api_key.is_empty() {
                return Err(AtlasError::config(
                    "Routing API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(AtlasError::config(
                    "Routing API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.opendata.timeout_seconds > 300 || self.routing.timeout_seconds > 300 {
            return Err(AtlasError::config("API timeouts cannot exceed 300 seconds").into());
        }

        if self.scraping.timeout_seconds > 60 {
            return Err(AtlasError::config("Scraping timeout cannot exceed 60 seconds").into());
        }

        if self.opendata.page_size > 100 {
            return Err(
                AtlasError::config("Open-data page size cannot exceed 100 (API limit)").into(),
            );
        }

        if !(0.0..=1.0).contains(&self.linker.threshold) {
            return Err(
                AtlasError::config("Linker threshold must be between 0.0 and 1.0").into(),
            );
        }

        if self.scraping.summary_word_budget > 1000 {
            return Err(
                AtlasError::config("Summary word budget cannot exceed 1000 words").into(),
            );
        }

        let mut previous = 0;
        for &range in &self.routing.ranges_seconds {
            if range <= previous {
                return Err(AtlasError::config(
                    "Isochrone ranges must be strictly ascending and non-zero",
                )
                .into());
            }
            previous = range;
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AtlasError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AtlasError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (label, url) in [
            ("Open-data base URL", &self.opendata.base_url),
            ("Routing base URL", &self.routing.base_url),
            ("Catalog URL", &self.scraping.catalog_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AtlasError::config(format!(
                    "{label} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
