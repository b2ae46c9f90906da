//! Configuration sections.

use serde::{Deserialize, Serialize};
use sextant_extract::{DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_FIELDS, DEFAULT_MAX_FIELD_SIZE};
use sextant_telemetry::LogConfig;

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingSection {
    /// Converts the section into the telemetry logging configuration.
    ///
    /// ```
    /// use sextant_config::{LogFormat, LoggingSection};
    ///
    /// let section = LoggingSection { format: LogFormat::Pretty, ..Default::default() };
    /// assert!(!section.to_log_config().json_format);
    /// ```
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            file_line_info: self.include_location,
            ansi: self.ansi_enabled,
            ..LogConfig::production()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[body]` section: request body limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BodySection {
    /// Maximum buffered body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Maximum number of multipart parts.
    #[serde(default = "default_multipart_max_fields")]
    pub multipart_max_fields: usize,

    /// Maximum size of a single multipart part in bytes.
    #[serde(default = "default_multipart_max_field_size")]
    pub multipart_max_field_size: usize,
}

impl Default for BodySection {
    fn default() -> Self {
        Self {
            max_body_size: default_max_body_size(),
            multipart_max_fields: default_multipart_max_fields(),
            multipart_max_field_size: default_multipart_max_field_size(),
        }
    }
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

fn default_multipart_max_fields() -> usize {
    DEFAULT_MAX_FIELDS
}

fn default_multipart_max_field_size() -> usize {
    DEFAULT_MAX_FIELD_SIZE
}

/// `[api]` section: client credentials for the described API.
///
/// The values are stored and validated here; nothing in Sextant calls out
/// with them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    /// Base URL of the API.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Client ID used by SDK tooling.
    #[serde(default)]
    pub sdkgen_client_id: Option<String>,

    /// Client secret used by SDK tooling.
    #[serde(default)]
    pub sdkgen_client_secret: Option<String>,
}
