//! Extraction error types.
//!
//! An [`ExtractionError`] is a client-facing failure raised while reading an
//! argument out of a request. Each one knows which part of the request it
//! came from, the HTTP status it maps to, and where in the code it was
//! raised, so it converts losslessly into an [`HttpError`].

use std::fmt;
use std::panic::Location as SourceLocation;

use http::StatusCode;
use sextant_core::{HttpError, Location};

/// Source of extraction (where data was being extracted from).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Route-matched path attributes
    Path,
    /// Query string parameters
    Query,
    /// HTTP headers
    Header,
    /// Request body (JSON, form, multipart, ...)
    Body,
    /// Content-Type header specifically
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
            Self::Body => write!(f, "body"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

impl From<Location> for ExtractionSource {
    fn from(location: Location) -> Self {
        match location {
            Location::Path => Self::Path,
            Location::Query => Self::Query,
            Location::Header => Self::Header,
            Location::Body => Self::Body,
        }
    }
}

/// Error that occurs during extraction.
///
/// # Example
///
/// ```rust
/// use sextant_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::missing(ExtractionSource::Path, "user_id");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.extraction_source(), ExtractionSource::Path);
/// assert_eq!(err.to_string(), r#"Missing path parameter "user_id""#);
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    field: Option<String>,
    message: String,
    raised_at: &'static SourceLocation<'static>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Required parameter is absent
    Missing,
    /// Value does not match its declared format
    InvalidFormat,
    /// Body could not be parsed at all
    DeserializationFailed,
    /// Body is too large
    PayloadTooLarge,
    /// Content-Type does not match the declaration
    UnsupportedMediaType,
    /// Body failed schema validation; carries the validator's status
    SchemaValidation(StatusCode),
}

impl ExtractionError {
    /// Creates an error for a missing required parameter.
    #[must_use]
    #[track_caller]
    pub fn missing(source: ExtractionSource, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Missing,
            message: format!("Missing {source} parameter \"{field}\""),
            field: Some(field),
            raised_at: SourceLocation::caller(),
        }
    }

    /// Creates an error for a value that does not match its declared format.
    #[must_use]
    #[track_caller]
    pub fn invalid_format(
        source: ExtractionSource,
        field: impl Into<String>,
        details: impl fmt::Display,
    ) -> Self {
        let field = field.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::InvalidFormat,
            message: format!("Invalid {source} parameter \"{field}\": {details}"),
            field: Some(field),
            raised_at: SourceLocation::caller(),
        }
    }

    /// Creates an error for a body that could not be parsed.
    #[must_use]
    #[track_caller]
    pub fn deserialization_failed(source: ExtractionSource, error: impl fmt::Display) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::DeserializationFailed,
            message: format!("Failed to deserialize {source}: {error}"),
            field: None,
            raised_at: SourceLocation::caller(),
        }
    }

    /// Creates an error for a payload that's too large.
    #[must_use]
    #[track_caller]
    pub fn payload_too_large(max_size: usize, actual_size: usize) -> Self {
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("Payload too large: max {max_size} bytes, got {actual_size} bytes"),
            field: None,
            raised_at: SourceLocation::caller(),
        }
    }

    /// Creates an error for a body whose actual encoding does not match the
    /// declared content type.
    #[must_use]
    #[track_caller]
    pub fn unsupported_media_type(expected: &str, actual: Option<&str>) -> Self {
        let actual = actual.unwrap_or("none");
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::UnsupportedMediaType,
            message: format!("Unsupported content type: expected '{expected}', got '{actual}'"),
            field: None,
            raised_at: SourceLocation::caller(),
        }
    }

    /// Creates a schema validation error.
    ///
    /// `pointer` is the JSON pointer of the offending value (`""` for the
    /// document root).
    #[must_use]
    #[track_caller]
    pub fn schema_validation(
        status: StatusCode,
        pointer: impl Into<String>,
        details: impl fmt::Display,
    ) -> Self {
        let pointer = pointer.into();
        let at = if pointer.is_empty() { "/" } else { &pointer };
        Self {
            extraction_source: ExtractionSource::Body,
            kind: ExtractionErrorKind::SchemaValidation(status),
            message: format!("Validation failed at {at}: {details}"),
            field: Some(pointer),
            raised_at: SourceLocation::caller(),
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the field name (or JSON pointer) if applicable.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns where the error was raised.
    #[must_use]
    pub fn raised_at(&self) -> &'static SourceLocation<'static> {
        self.raised_at
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Missing
            | ExtractionErrorKind::InvalidFormat
            | ExtractionErrorKind::DeserializationFailed => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractionErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ExtractionErrorKind::SchemaValidation(status) => status,
        }
    }

    /// Returns the error kind name used as the title of error responses.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Missing => "BadRequest",
            ExtractionErrorKind::InvalidFormat => "InvalidFormat",
            ExtractionErrorKind::DeserializationFailed => "MalformedBody",
            ExtractionErrorKind::PayloadTooLarge => "PayloadTooLarge",
            ExtractionErrorKind::UnsupportedMediaType => "UnsupportedMediaType",
            ExtractionErrorKind::SchemaValidation(_) => "SchemaValidation",
        }
    }

    /// Returns `true` for a missing required parameter.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.kind == ExtractionErrorKind::Missing
    }

    /// Returns `true` for a body/content-type mismatch.
    #[must_use]
    pub fn is_unsupported_media_type(&self) -> bool {
        self.kind == ExtractionErrorKind::UnsupportedMediaType
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

impl From<ExtractionError> for HttpError {
    fn from(err: ExtractionError) -> Self {
        HttpError::new(err.status_code(), err.title(), err.message).with_location(err.raised_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_error() {
        let err = ExtractionError::missing(ExtractionSource::Query, "limit");

        assert_eq!(err.extraction_source(), ExtractionSource::Query);
        assert_eq!(err.field(), Some("limit"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.title(), "BadRequest");
        assert!(err.is_missing());
        assert_eq!(err.to_string(), "Missing query parameter \"limit\"");
    }

    #[test]
    fn test_invalid_format_error() {
        let err = ExtractionError::invalid_format(
            ExtractionSource::Header,
            "if-modified-since",
            "expected date",
        );

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.title(), "InvalidFormat");
        assert!(err.to_string().contains("if-modified-since"));
        assert!(err.to_string().contains("expected date"));
    }

    #[test]
    fn test_deserialization_failed_error() {
        let err = ExtractionError::deserialization_failed(
            ExtractionSource::Body,
            "unexpected token at position 5",
        );

        assert_eq!(err.field(), None);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("position 5"));
    }

    #[test]
    fn test_payload_too_large_error() {
        let err = ExtractionError::payload_too_large(1024, 2048);

        assert_eq!(err.extraction_source(), ExtractionSource::Body);
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.to_string().contains("1024"));
        assert!(err.to_string().contains("2048"));
    }

    #[test]
    fn test_unsupported_media_type_error() {
        let err =
            ExtractionError::unsupported_media_type("multipart/form-data", Some("application/json"));

        assert_eq!(err.extraction_source(), ExtractionSource::ContentType);
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(err.is_unsupported_media_type());
        assert!(err.to_string().contains("application/json"));
    }

    #[test]
    fn test_schema_validation_carries_status() {
        let err = ExtractionError::schema_validation(
            StatusCode::UNPROCESSABLE_ENTITY,
            "/author/name",
            "required property is missing",
        );

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.field(), Some("/author/name"));
        assert!(err.to_string().contains("/author/name"));

        let root = ExtractionError::schema_validation(StatusCode::BAD_REQUEST, "", "not an object");
        assert_eq!(root.status_code(), StatusCode::BAD_REQUEST);
        assert!(root.to_string().contains("at /:"));
    }

    #[test]
    fn test_into_http_error_keeps_status_and_location() {
        let line = line!() + 1;
        let err = ExtractionError::missing(ExtractionSource::Path, "id");
        let http: HttpError = err.into();

        assert_eq!(http.status(), StatusCode::BAD_REQUEST);
        assert_eq!(http.title(), "BadRequest");
        assert_eq!(http.message(), "Missing path parameter \"id\"");
        assert_eq!(http.location().line(), line);
    }

    #[test]
    fn test_extraction_source_from_location() {
        assert_eq!(ExtractionSource::from(Location::Path), ExtractionSource::Path);
        assert_eq!(ExtractionSource::from(Location::Query), ExtractionSource::Query);
        assert_eq!(ExtractionSource::from(Location::Header), ExtractionSource::Header);
        assert_eq!(ExtractionSource::from(Location::Body), ExtractionSource::Body);
        assert_eq!(ExtractionSource::ContentType.to_string(), "content-type");
    }
}
