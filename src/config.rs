/*!
 * Configuration support for the claims pipeline
 *
 * Every path and sentinel the run depends on lives in [`PipelineConfig`],
 * which is passed explicitly into [`crate::pipeline::Pipeline`].
 */

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{PrcError, Result};

/// Largest accepted window bound, in days before today
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Runtime configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory the claims export is dropped into
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory the cleaned file is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory holding the error log
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Error log file name inside `log_dir`
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,

    /// Extension (without dot) an input file must carry
    #[serde(default = "default_input_extension")]
    pub input_extension: String,

    /// Prefix of the output file name
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Oldest accepted discharge date, in days before today
    #[serde(default = "default_window_start_days")]
    pub window_start_days: i64,

    /// Newest accepted discharge date, in days before today
    #[serde(default = "default_window_end_days")]
    pub window_end_days: i64,

    /// Placeholder discharge date marking deceased/invalid patients
    #[serde(default = "default_deceased_sentinel")]
    pub deceased_sentinel: String,

    /// Physician names used for test encounters
    #[serde(default = "default_test_physician_names")]
    pub test_physician_names: Vec<String>,

    /// Physician NPI value that means "no NPI"
    #[serde(default = "default_npi_missing_sentinel")]
    pub npi_missing_sentinel: i64,

    /// Whether to delete the source export after a successful write
    #[serde(default = "default_delete_source")]
    pub delete_source: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            log_dir: default_log_dir(),
            log_file_name: default_log_file_name(),
            input_extension: default_input_extension(),
            output_prefix: default_output_prefix(),
            window_start_days: default_window_start_days(),
            window_end_days: default_window_end_days(),
            deceased_sentinel: default_deceased_sentinel(),
            test_physician_names: default_test_physician_names(),
            npi_missing_sentinel: default_npi_missing_sentinel(),
            delete_source: default_delete_source(),
        }
    }
}

// Default value functions for serde
fn default_input_dir() -> PathBuf {
    PathBuf::from("ToBeCleaned")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("ToSend")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("Log")
}

fn default_log_file_name() -> String {
    "script_log.txt".to_string()
}

fn default_input_extension() -> String {
    "csv".to_string()
}

fn default_output_prefix() -> String {
    "OP".to_string()
}

fn default_window_start_days() -> i64 {
    14
}

fn default_window_end_days() -> i64 {
    8
}

fn default_deceased_sentinel() -> String {
    "0001-01-01".to_string()
}

fn default_test_physician_names() -> Vec<String> {
    vec!["CPSI TEST PHYSICIAN".to_string(), "CPSI TEST".to_string()]
}

fn default_npi_missing_sentinel() -> i64 {
    -1
}

fn default_delete_source() -> bool {
    true
}

impl PipelineConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - `PRC_OP_INPUT_DIR`: directory path
    /// - `PRC_OP_OUTPUT_DIR`: directory path
    /// - `PRC_OP_LOG_DIR`: directory path
    /// - `PRC_OP_DELETE_SOURCE`: "true" or "false"; any other value is a
    ///   configuration error
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(val) = std::env::var("PRC_OP_INPUT_DIR") {
            self.input_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("PRC_OP_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("PRC_OP_LOG_DIR") {
            self.log_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("PRC_OP_DELETE_SOURCE") {
            self.delete_source = parse_bool_var("PRC_OP_DELETE_SOURCE", &val)?;
        }

        Ok(self)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PrcError::file_not_found_with_suggestion(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = self.to_toml()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PrcError::Configuration {
            message: format!("Failed to serialize config: {}", e),
            suggestion: None,
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/prc-op/config.toml` on Unix-like systems
    /// or `%APPDATA%\prc-op\config\config.toml` on Windows
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "prc-op")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from an explicit file, the default location, or defaults
    ///
    /// Priority order:
    /// 1. `explicit` path (must exist and parse)
    /// 2. Default config file (if it exists)
    /// 3. Built-in defaults
    ///
    /// Environment overrides are applied on top in every case.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings are coherent
    pub fn validate(&self) -> Result<()> {
        if self.window_end_days < 0 || self.window_start_days < self.window_end_days {
            return Err(PrcError::Configuration {
                message: format!(
                    "Invalid discharge window: start {} days ago, end {} days ago",
                    self.window_start_days, self.window_end_days
                ),
                suggestion: Some(
                    "window_start_days must be >= window_end_days and both non-negative".to_string(),
                ),
            });
        }

        if self.window_start_days > MAX_WINDOW_DAYS {
            return Err(PrcError::Configuration {
                message: format!(
                    "window_start_days {} exceeds the limit of {} days",
                    self.window_start_days, MAX_WINDOW_DAYS
                ),
                suggestion: Some("Use a window of at most 100 years".to_string()),
            });
        }

        if self.input_extension.trim_start_matches('.').is_empty() {
            return Err(PrcError::Configuration {
                message: "input_extension cannot be empty".to_string(),
                suggestion: Some("Use \"csv\"".to_string()),
            });
        }

        Ok(())
    }

    /// Inclusive discharge-date window for a run happening on `today`
    pub fn discharge_window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (
            days_before(today, self.window_start_days),
            days_before(today, self.window_end_days),
        )
    }

    /// Full path of the error log
    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file_name)
    }

    /// Extension without a leading dot
    pub fn extension(&self) -> &str {
        self.input_extension.trim_start_matches('.')
    }
}

/// Date `days` before `today`, clamped to the calendar range
fn days_before(today: NaiveDate, days: i64) -> NaiveDate {
    match u64::try_from(days) {
        Ok(back) => today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN),
        Err(_) => today
            .checked_add_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MAX),
    }
}

/// Strict boolean for environment overrides
fn parse_bool_var(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(PrcError::Configuration {
            message: format!("{} must be \"true\" or \"false\", got \"{}\"", name, other),
            suggestion: Some(format!("Set {}=true or {}=false", name, name)),
        }),
    }
}

/// Builder for customizing configuration
pub struct ConfigBuilder {
    config: PipelineConfig,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn input_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.input_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn input_extension(mut self, extension: &str) -> Self {
        self.config.input_extension = extension.to_string();
        self
    }

    pub fn output_prefix(mut self, prefix: &str) -> Self {
        self.config.output_prefix = prefix.to_string();
        self
    }

    /// Set the discharge window, in days before the run date
    pub fn window_days(mut self, start_days_ago: i64, end_days_ago: i64) -> Self {
        self.config.window_start_days = start_days_ago;
        self.config.window_end_days = end_days_ago;
        self
    }

    pub fn deceased_sentinel(mut self, sentinel: &str) -> Self {
        self.config.deceased_sentinel = sentinel.to_string();
        self
    }

    pub fn test_physician_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.test_physician_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn npi_missing_sentinel(mut self, sentinel: i64) -> Self {
        self.config.npi_missing_sentinel = sentinel;
        self
    }

    pub fn delete_source(mut self, delete: bool) -> Self {
        self.config.delete_source = delete;
        self
    }

    /// Build the configuration
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}
