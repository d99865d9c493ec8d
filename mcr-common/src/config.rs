//! Configuration loading and config file resolution
//!
//! Settings come from four tiers, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Built-in defaults (code constants)
//!
//! This module owns tier 3 and 4. Credentials never live in the TOML file;
//! the service binary reads them from the command line or environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "MCR_CONFIG";

/// ISO A4 in PDF points
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Optional settings loaded from TOML
///
/// Every section and key may be omitted. Missing values fall back to the
/// built-in defaults below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub asana: AsanaConfig,
    pub aggregation: AggregationConfig,
    pub fields: FieldNames,
    pub report: ReportConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Which upstream entities act as containers of client tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerSource {
    /// Portfolio members; records are the tasks assigned to each member
    #[default]
    Members,
    /// Portfolio projects; records are the tasks in each project
    Projects,
}

/// Upstream API settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AsanaConfig {
    pub api_base_url: String,
    pub container_source: ContainerSource,
    pub request_timeout_secs: u64,
    /// Minimum spacing between upstream requests, 0 disables throttling
    pub min_request_interval_ms: u64,
    pub page_size: u32,
}

impl Default for AsanaConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://app.asana.com/api/1.0".to_string(),
            container_source: ContainerSource::Members,
            request_timeout_secs: 30,
            min_request_interval_ms: 0,
            page_size: 100,
        }
    }
}

/// What to do when fetching one container's records fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerErrorPolicy {
    /// Fail the whole request and discard collected results
    #[default]
    Abort,
    /// Log the failure and continue with the remaining containers
    Skip,
}

/// Aggregation phase settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub timeout_secs: u64,
    pub max_concurrent_fetches: usize,
    pub on_container_error: ContainerErrorPolicy,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_concurrent_fetches: 4,
            on_container_error: ContainerErrorPolicy::Abort,
        }
    }
}

/// Upstream custom field names consulted by the field extractor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldNames {
    pub segmentation: String,
    pub email: String,
    pub phone: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            segmentation: "Lead Client Segmentation".to_string(),
            email: "HOH Email".to_string(),
            phone: "Phone Number".to_string(),
        }
    }
}

/// Report document settings, geometry in PDF points
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    /// Download filename sent in Content-Disposition
    pub filename: String,
    pub margin: f32,
    pub row_height: f32,
    /// Vertical position of the header row on the first page
    pub table_top: f32,
    pub table_left: f32,
    pub table_width: f32,
    /// Column start offsets relative to `table_left`
    pub column_offsets: [f32; 3],
    pub title_font_size: f32,
    pub font_size: f32,
    pub fill_opacity: f32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Clients Missing Contact Info".to_string(),
            filename: "missing_clients.pdf".to_string(),
            margin: 30.0,
            row_height: 25.0,
            table_top: 100.0,
            table_left: 50.0,
            table_width: 500.0,
            column_offsets: [0.0, 200.0, 350.0],
            title_font_size: 20.0,
            font_size: 12.0,
            fill_opacity: 0.2,
        }
    }
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        let report = &self.report;

        for (key, value) in [
            ("margin", report.margin),
            ("row_height", report.row_height),
            ("table_top", report.table_top),
            ("table_left", report.table_left),
            ("table_width", report.table_width),
            ("title_font_size", report.title_font_size),
            ("font_size", report.font_size),
            ("fill_opacity", report.fill_opacity),
        ] {
            if !value.is_finite() {
                return Err(Error::Config(format!("report.{} must be a finite number", key)));
            }
        }
        if report.column_offsets.iter().any(|offset| !offset.is_finite()) {
            return Err(Error::Config(
                "report.column_offsets must be finite numbers".to_string(),
            ));
        }

        let [first, second, third] = report.column_offsets;
        if first < 0.0 || first >= second || second >= third || third >= report.table_width {
            return Err(Error::Config(
                "report.column_offsets must increase and stay inside report.table_width"
                    .to_string(),
            ));
        }
        if report.font_size <= 0.0 || report.title_font_size <= 0.0 {
            return Err(Error::Config("report font sizes must be positive".to_string()));
        }
        if report.row_height <= 0.0 {
            return Err(Error::Config("report.row_height must be positive".to_string()));
        }
        if report.margin < 0.0 {
            return Err(Error::Config("report.margin must not be negative".to_string()));
        }
        if report.margin * 2.0 + report.row_height > A4_HEIGHT_PT {
            return Err(Error::Config(
                "report.margin and report.row_height leave no room for a row".to_string(),
            ));
        }
        if report.table_top < report.margin
            || report.table_top + report.row_height > A4_HEIGHT_PT - report.margin
        {
            return Err(Error::Config(
                "report.table_top must place the header row inside the margins".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&report.fill_opacity) {
            return Err(Error::Config(
                "report.fill_opacity must be between 0 and 1".to_string(),
            ));
        }
        if report.filename.trim().is_empty() {
            return Err(Error::Config("report.filename must not be empty".to_string()));
        }
        if self.aggregation.timeout_secs == 0 {
            return Err(Error::Config(
                "aggregation.timeout_secs must be positive".to_string(),
            ));
        }
        if self.aggregation.max_concurrent_fetches == 0 {
            return Err(Error::Config(
                "aggregation.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.asana.page_size == 0 || self.asana.page_size > 100 {
            return Err(Error::Config(
                "asana.page_size must be between 1 and 100".to_string(),
            ));
        }

        let fields = &self.fields;
        for (key, value) in [
            ("segmentation", &fields.segmentation),
            ("email", &fields.email),
            ("phone", &fields.phone),
        ] {
            if !is_valid_value(value) {
                return Err(Error::Config(format!("fields.{} must not be empty", key)));
            }
        }

        Ok(())
    }
}

/// Validate a configured string (non-empty, non-whitespace)
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Resolve which config file to read
///
/// Returns the path and whether it was requested explicitly. An explicit
/// path that does not exist is an error; the platform default is optional.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<(PathBuf, bool)> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some((path.to_path_buf(), true));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if is_valid_value(&path) {
            return Some((PathBuf::from(path), true));
        }
    }

    // Priority 3: Platform config location
    default_config_path().map(|path| (path, false))
}

/// Get default configuration file path for the platform
fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mcr").join("config.toml"));

    if cfg!(target_os = "linux") {
        // ~/.config/mcr/config.toml first, then /etc/mcr/config.toml
        if let Some(path) = user_config.as_ref().filter(|p| p.exists()) {
            return Some(path.clone());
        }
        let system_config = PathBuf::from("/etc/mcr/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
        return user_config;
    }

    user_config
}

/// Load TOML configuration with graceful degradation
///
/// A missing default config file is not an error: a warning is logged and
/// built-in defaults are used. Explicit paths must exist and parse.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some((path, explicit)) = resolve_config_path(cli_arg) else {
        warn!("Could not determine config directory, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        warn!(
            "Config file not found at {}, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let config = load_toml_config(&path)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    TomlConfig::from_toml_str(&content)
}
