//! Typed configuration for Sextant.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`PREFIX__SECTION__KEY`)
//! - `.env` files via `dotenvy`
//! - Strict parsing: unknown fields are errors
//!
//! # Configuration File Format
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "json"
//! ansi_enabled = false
//! include_location = false
//!
//! [body]
//! max_body_size = 1048576
//! multipart_max_fields = 100
//! multipart_max_field_size = 1048576
//!
//! [api]
//! base_url = "https://api.example.com"
//! ```
//!
//! # Example
//!
//! ```
//! use sextant_config::ConfigLoader;
//! use sextant_extract::BodyDecoder;
//!
//! let config = ConfigLoader::new()
//!     .with_string("[body]\nmax_body_size = 8192", "toml")?
//!     .load()?;
//!
//! let decoder = BodyDecoder::new(config.extract_limits());
//! assert_eq!(decoder.limits().max_body_size, 8192);
//! # Ok::<(), sextant_config::ConfigError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/sextant-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::SextantConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{ApiSection, BodySection, LogFormat, LoggingSection};
