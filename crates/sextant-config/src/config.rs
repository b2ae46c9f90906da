//! The root configuration type.

use serde::{Deserialize, Serialize};
use sextant_extract::{BodyLimits, MultipartLimits};

use crate::{ApiSection, BodySection, ConfigError, LogFormat, LoggingSection};

/// Complete Sextant configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use sextant_config::SextantConfig;
///
/// let config = SextantConfig::default();
/// assert_eq!(config.body.max_body_size, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SextantConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Request body limits.
    #[serde(default)]
    pub body: BodySection,

    /// API client settings.
    #[serde(default)]
    pub api: ApiSection,
}

impl SextantConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A body limit is zero
    /// - The multipart part limit exceeds the body limit
    /// - The log level is empty
    /// - `api.base_url` is not an http(s) URL
    /// - Only one of the two SDK client credentials is set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }

        let body = &self.body;
        if body.max_body_size == 0 {
            return Err(ConfigError::invalid_value("body.max_body_size", "must be greater than 0"));
        }
        if body.multipart_max_fields == 0 {
            return Err(ConfigError::invalid_value(
                "body.multipart_max_fields",
                "must be greater than 0",
            ));
        }
        if body.multipart_max_field_size == 0 {
            return Err(ConfigError::invalid_value(
                "body.multipart_max_field_size",
                "must be greater than 0",
            ));
        }
        if body.multipart_max_field_size > body.max_body_size {
            return Err(ConfigError::invalid_value(
                "body.multipart_max_field_size",
                format!(
                    "{} exceeds body.max_body_size ({})",
                    body.multipart_max_field_size, body.max_body_size
                ),
            ));
        }

        if let Some(url) = &self.api.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::invalid_value(
                    "api.base_url",
                    format!("expected an http(s) URL, got '{url}'"),
                ));
            }
        }

        match (&self.api.sdkgen_client_id, &self.api.sdkgen_client_secret) {
            (Some(_), None) => Err(ConfigError::missing_field("api.sdkgen_client_secret")),
            (None, Some(_)) => Err(ConfigError::missing_field("api.sdkgen_client_id")),
            _ => Ok(()),
        }
    }

    /// Development preset: pretty debug logs with source locations.
    ///
    /// ```
    /// use sextant_config::SextantConfig;
    ///
    /// let config = SextantConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;
        config
    }

    /// Production preset: JSON info logs.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;
        config
    }

    /// Limits for the body decoder.
    ///
    /// ```
    /// use sextant_config::SextantConfig;
    ///
    /// let mut config = SextantConfig::default();
    /// config.body.max_body_size = 4096;
    /// assert_eq!(config.extract_limits().max_body_size, 4096);
    /// ```
    #[must_use]
    pub fn extract_limits(&self) -> BodyLimits {
        BodyLimits {
            max_body_size: self.body.max_body_size,
            multipart: MultipartLimits {
                max_field_size: self.body.multipart_max_field_size,
                max_fields: self.body.multipart_max_fields,
            },
        }
    }
}
