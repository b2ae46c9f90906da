//! # Sextant Extract
//!
//! Reads controller arguments out of HTTP requests according to an
//! operation description.
//!
//! | Stage | Entry point | Description |
//! |-------|-------------|-------------|
//! | Coercion | [`coerce`] | Raw string to typed [`Scalar`] by declared [`PropertyType`] |
//! | Body decoding | [`BodyDecoder::decode`] | Buffered body to [`Payload`] by declared schema |
//! | Resolution | [`ArgumentResolver::resolve`] | Request to ordered [`Arguments`] |
//!
//! ## Example
//!
//! ```rust
//! use sextant_core::{Argument, Definitions, OperationDescription, Parameter, PropertyType, Signature, SourceTag};
//! use sextant_extract::{ArgumentResolver, IncomingRequest};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let operation = OperationDescription::builder("getUser")
//!     .argument("id", Argument::path(PropertyType::Integer))
//!     .build();
//! let signature = Signature::new().parameter(Parameter::new("id").tagged(SourceTag::path()));
//! let request = IncomingRequest::builder().path_attribute("id", "42").build();
//!
//! let arguments = ArgumentResolver::default()
//!     .resolve(&operation, &Definitions::new(), &signature, &request)
//!     .await
//!     .unwrap();
//!
//! assert_eq!(arguments.get("id").and_then(|v| v.as_i64()), Some(42));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Client-facing failures are [`ExtractionError`]s. Each carries its source,
//! its HTTP status, and the place it was raised, and converts into a
//! [`sextant_core::HttpError`]:
//!
//! ```rust
//! use sextant_extract::{ExtractionError, ExtractionSource};
//!
//! let err = ExtractionError::missing(ExtractionSource::Path, "user_id");
//! assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
//! ```
//!
//! [`PropertyType`]: sextant_core::PropertyType

#![doc(html_root_url = "https://docs.rs/sextant-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod coerce;
mod context;
mod error;
mod form;
mod multipart;
mod resolve;
pub mod response;
mod validator;

pub use body::{BodyDecoder, BodyLimits, Payload, DEFAULT_MAX_BODY_SIZE, PASSTHRU};
pub use coerce::{coerce, parse_format, CoercionError, Scalar};
pub use context::{IncomingRequest, IncomingRequestBuilder};
pub use error::{ExtractionError, ExtractionSource};
pub use form::{FormData, FormValue};
pub use multipart::{
    is_multipart, MultipartData, MultipartLimits, UploadedFile, DEFAULT_MAX_FIELDS,
    DEFAULT_MAX_FIELD_SIZE,
};
pub use resolve::{ArgumentResolver, ArgumentValue, Arguments, ResolveError};
pub use validator::{DefinitionValidator, SchemaValidator};
