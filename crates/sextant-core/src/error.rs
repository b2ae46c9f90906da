//! Status-carrying errors and the JSON error body they render to.
//!
//! [`HttpError`] is the only error kind the error response mapper
//! intercepts. Anything else a controller returns is left to the host.
//!
//! Every `HttpError` remembers where it was raised (via `#[track_caller]`)
//! and always captures a backtrace, independent of `RUST_BACKTRACE`, so the
//! rendered [`ErrorBody`] can point at the offending line.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Result type alias using [`HttpError`].
pub type HttpResult<T> = Result<T, HttpError>;

/// An error that carries the HTTP status it should be answered with.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use sextant_core::HttpError;
///
/// fn find_user(id: i64) -> Result<String, HttpError> {
///     Err(HttpError::not_found(format!("User {id} does not exist")))
/// }
///
/// let err = find_user(7).unwrap_err();
/// assert_eq!(err.status(), StatusCode::NOT_FOUND);
/// assert_eq!(err.title(), "NotFound");
/// ```
pub struct HttpError {
    status: StatusCode,
    title: String,
    message: String,
    location: &'static Location<'static>,
    backtrace: Backtrace,
}

impl HttpError {
    /// Creates an error with an explicit status, kind name and message.
    #[track_caller]
    pub fn new(status: StatusCode, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            message: message.into(),
            location: Location::caller(),
            backtrace: Backtrace::force_capture(),
        }
    }

    /// 400 Bad Request.
    #[track_caller]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", message)
    }

    /// 401 Unauthorized.
    #[track_caller]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", message)
    }

    /// 403 Forbidden.
    #[track_caller]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", message)
    }

    /// 404 Not Found.
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", message)
    }

    /// 409 Conflict.
    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "Conflict", message)
    }

    /// 413 Payload Too Large.
    #[track_caller]
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "PayloadTooLarge", message)
    }

    /// 415 Unsupported Media Type.
    #[track_caller]
    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UnsupportedMediaType",
            message,
        )
    }

    /// 422 Unprocessable Entity.
    #[track_caller]
    pub fn unprocessable_entity(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "UnprocessableEntity",
            message,
        )
    }

    /// 500 Internal Server Error.
    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "InternalServerError",
            message,
        )
    }

    /// Replaces the recorded source location.
    ///
    /// Used when converting from an error that already knows where it was
    /// raised.
    #[must_use]
    pub fn with_location(mut self, location: &'static Location<'static>) -> Self {
        self.location = location;
        self
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the kind name.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the bare message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the source location the error was raised at.
    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Returns the captured backtrace.
    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Renders the JSON error body.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            success: false,
            title: self.title.clone(),
            message: format!(
                "{} in {} on line {}",
                self.message,
                self.location.file(),
                self.location.line()
            ),
            trace: self.trace(),
        }
    }

    /// Renders the diagnostic trace: the raise site first, then the
    /// captured frames.
    #[must_use]
    pub fn trace(&self) -> String {
        format!(
            "#0 {}:{}:{}\n{}",
            self.location.file(),
            self.location.line(),
            self.location.column(),
            self.backtrace
        )
    }
}

impl fmt::Debug for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpError")
            .field("status", &self.status)
            .field("title", &self.title)
            .field("message", &self.message)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

impl std::error::Error for HttpError {}

/// Structured error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Error kind name.
    pub title: String,
    /// Message plus the source location it was raised at.
    pub message: String,
    /// Diagnostic stack trace.
    pub trace: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_statuses() {
        let cases = [
            (HttpError::bad_request("x"), StatusCode::BAD_REQUEST, "BadRequest"),
            (HttpError::unauthorized("x"), StatusCode::UNAUTHORIZED, "Unauthorized"),
            (HttpError::forbidden("x"), StatusCode::FORBIDDEN, "Forbidden"),
            (HttpError::not_found("x"), StatusCode::NOT_FOUND, "NotFound"),
            (HttpError::conflict("x"), StatusCode::CONFLICT, "Conflict"),
            (
                HttpError::payload_too_large("x"),
                StatusCode::PAYLOAD_TOO_LARGE,
                "PayloadTooLarge",
            ),
            (
                HttpError::unsupported_media_type("x"),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UnsupportedMediaType",
            ),
            (
                HttpError::unprocessable_entity("x"),
                StatusCode::UNPROCESSABLE_ENTITY,
                "UnprocessableEntity",
            ),
            (
                HttpError::internal("x"),
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
            ),
        ];

        for (error, status, title) in cases {
            assert_eq!(error.status(), status);
            assert_eq!(error.title(), title);
            assert!(status.is_client_error() || status.is_server_error());
        }
    }

    #[test]
    fn test_location_points_at_caller() {
        let line = line!() + 1;
        let error = HttpError::not_found("gone");
        assert_eq!(error.location().file(), file!());
        assert_eq!(error.location().line(), line);
    }

    #[test]
    fn test_body_shape() {
        let error = HttpError::new(StatusCode::IM_A_TEAPOT, "Teapot", "short and stout");
        let body = error.to_body();

        assert!(!body.success);
        assert_eq!(body.title, "Teapot");
        assert!(body.message.starts_with("short and stout in "));
        assert!(body.message.contains(file!()));
        assert!(body.message.contains(" on line "));
    }

    #[test]
    fn test_body_serialization() {
        let body = HttpError::not_found("Not Found").to_body();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["title"], "NotFound");
        assert!(json["trace"].is_string());
    }

    #[test]
    fn test_trace_is_captured_without_backtrace_env() {
        let line = line!() + 1;
        let error = HttpError::internal("boom");
        let trace = error.to_body().trace;

        assert!(trace.starts_with(&format!("#0 {}:{line}:", file!())));
        assert!(!trace.contains("disabled backtrace"));
        assert_ne!(
            error.backtrace().status(),
            std::backtrace::BacktraceStatus::Disabled
        );
    }

    #[test]
    fn test_display_and_debug() {
        let error = HttpError::bad_request("Missing path parameter \"id\"");
        assert_eq!(
            error.to_string(),
            "BadRequest: Missing path parameter \"id\""
        );
        assert!(format!("{error:?}").contains("BadRequest"));
    }

    #[test]
    fn test_is_std_error() {
        let boxed: Box<dyn std::error::Error + Send + Sync> =
            Box::new(HttpError::conflict("duplicate"));
        assert!(boxed.downcast_ref::<HttpError>().is_some());
    }
}
