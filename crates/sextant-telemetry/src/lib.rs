//! Logging setup for Sextant services.
//!
//! The resolver and the error mapper emit `tracing` events; this crate
//! installs the subscriber that writes them, either as JSON lines for
//! production or in a human-readable layout for development.
//!
//! # Example
//!
//! ```rust,no_run
//! use sextant_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).expect("logging");
//!
//! tracing::info!(operation_id = "getUser", "Resolving arguments");
//! ```

#![doc(html_root_url = "https://docs.rs/sextant-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
