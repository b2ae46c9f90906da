//! Mapping of status-carrying errors to JSON error responses.

use bytes::Bytes;
use http::Response;
use sextant_core::HttpError;
use sextant_extract::response::JsonResponse;
use tracing::{debug, error};

use crate::MatchedRoute;

/// Turns an [`HttpError`] raised while handling a request into its JSON
/// error response.
///
/// Errors of any other type are left to the host.
///
/// # Example
///
/// ```
/// use sextant::{ExceptionResponseMapper, MatchedRoute};
/// use sextant_core::HttpError;
///
/// let route = MatchedRoute::controller("Users::show");
/// let err = anyhow::Error::new(HttpError::not_found("Not Found"));
///
/// let response = ExceptionResponseMapper::new().on_exception(&route, &err).unwrap();
/// assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExceptionResponseMapper;

impl ExceptionResponseMapper {
    /// Creates a mapper.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the response to send instead, or `None` to let the error
    /// pass through.
    ///
    /// Nothing is intercepted on the error-rendering route.
    pub fn on_exception(
        &self,
        route: &MatchedRoute,
        error: &anyhow::Error,
    ) -> Option<Response<Bytes>> {
        if route.is_error_renderer() {
            return None;
        }

        let http_error = error.downcast_ref::<HttpError>()?;
        self.render(http_error)
    }

    /// Renders an error as `{success, title, message, trace}` with the
    /// error's status.
    ///
    /// Returns `None` only if the body cannot be serialized.
    pub fn render(&self, http_error: &HttpError) -> Option<Response<Bytes>> {
        debug!(
            http.status_code = http_error.status().as_u16(),
            error.title = http_error.title(),
            "Rendering error response"
        );

        match JsonResponse::new(http_error.to_body())
            .with_status(http_error.status())
            .into_response()
        {
            Ok(response) => Some(response),
            Err(err) => {
                error!(error = %err, "Failed to serialize error body");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use sextant_core::ErrorBody;

    fn route() -> MatchedRoute {
        MatchedRoute::controller("Users::show")
    }

    fn body(response: &Response<Bytes>) -> ErrorBody {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_maps_http_error() {
        let err = anyhow::Error::new(HttpError::not_found("Not Found"));
        let response = ExceptionResponseMapper::new()
            .on_exception(&route(), &err)
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[http::header::CONTENT_TYPE],
            "application/json"
        );

        let body = body(&response);
        assert!(!body.success);
        assert_eq!(body.title, "NotFound");
        assert!(body.message.starts_with("Not Found in "));
        assert!(body.message.contains(file!()));
    }

    #[test]
    fn test_custom_status_and_title() {
        let err = anyhow::Error::new(HttpError::new(
            StatusCode::IM_A_TEAPOT,
            "Teapot",
            "short and stout",
        ));
        let response = ExceptionResponseMapper::new()
            .on_exception(&route(), &err)
            .unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(body(&response).title, "Teapot");
    }

    #[test]
    fn test_context_wrapped_error_is_found() {
        let err = anyhow::Error::new(HttpError::conflict("duplicate")).context("saving user");
        let response = ExceptionResponseMapper::new().on_exception(&route(), &err);
        assert_eq!(response.map(|r| r.status()), Some(StatusCode::CONFLICT));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = anyhow::anyhow!("database unavailable");
        assert!(ExceptionResponseMapper::new()
            .on_exception(&route(), &err)
            .is_none());
    }

    #[test]
    fn test_error_renderer_is_exempt() {
        let err = anyhow::Error::new(HttpError::internal("boom"));
        assert!(ExceptionResponseMapper::new()
            .on_exception(&MatchedRoute::error_renderer(), &err)
            .is_none());
    }
}
