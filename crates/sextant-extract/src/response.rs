//! JSON response building.
//!
//! Error responses and most controller responses are JSON documents;
//! [`JsonResponse`] turns any `Serialize` value into an
//! `http::Response<Bytes>` with the right content type.

use bytes::Bytes;
use http::{header, HeaderValue, Response, StatusCode};
use serde::Serialize;

/// JSON response builder.
///
/// # Example
///
/// ```rust
/// use sextant_extract::response::JsonResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct ApiResponse {
///     success: bool,
///     message: String,
/// }
///
/// let response = JsonResponse::new(ApiResponse {
///     success: true,
///     message: "Operation completed".into(),
/// })
/// .into_response()
/// .unwrap();
///
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.headers()["content-type"], "application/json");
/// ```
#[derive(Debug)]
pub struct JsonResponse<T> {
    data: T,
    status: StatusCode,
}

impl<T: Serialize> JsonResponse<T> {
    /// Creates a new JSON response with status 200 OK.
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    /// Creates a JSON response with status 201 Created.
    #[must_use]
    pub fn created(data: T) -> Self {
        Self {
            data,
            status: StatusCode::CREATED,
        }
    }

    /// Sets a custom status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns a reference to the data.
    #[must_use]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Builds the HTTP response.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be serialized.
    pub fn into_response(self) -> Result<Response<Bytes>, serde_json::Error> {
        let body = serde_json::to_vec(&self.data)?;

        let mut response = Response::new(Bytes::from(body));
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(response)
    }
}
