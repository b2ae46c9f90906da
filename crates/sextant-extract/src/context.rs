//! The buffered request the resolver reads arguments from.
//!
//! The [`IncomingRequest`] gives the pipeline the four lookups it needs:
//! path attributes, query parameters, headers, and the raw body. The body is
//! fully buffered, so every reader can look at it as often as it likes.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use sextant_core::PathAttributes;

/// A buffered HTTP request plus the path attributes its route matched.
///
/// # Example
///
/// ```rust
/// use sextant_extract::IncomingRequest;
/// use sextant_core::PathAttributes;
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let attributes: PathAttributes = [("id", "123")].into_iter().collect();
///
/// let request = IncomingRequest::new(
///     Method::GET,
///     Uri::from_static("/users/123?expand=roles"),
///     HeaderMap::new(),
///     Bytes::new(),
///     attributes,
/// );
///
/// assert_eq!(request.path_attribute("id"), Some("123"));
/// assert_eq!(request.query("expand").as_deref(), Some("roles"));
/// ```
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_attributes: PathAttributes,
}

impl IncomingRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_attributes: PathAttributes,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            path_attributes,
        }
    }

    /// Starts building a request.
    #[must_use]
    pub fn builder() -> IncomingRequestBuilder {
        IncomingRequestBuilder::default()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the buffered body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the route-matched path attributes.
    #[must_use]
    pub fn path_attributes(&self) -> &PathAttributes {
        &self.path_attributes
    }

    /// Looks up a path attribute.
    #[must_use]
    pub fn path_attribute(&self, name: &str) -> Option<&str> {
        self.path_attributes.get(name)
    }

    /// Looks up a query parameter, percent-decoded.
    ///
    /// When a name occurs more than once the last occurrence wins.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<String> {
        let query = self.uri.query()?;
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
        pairs
            .into_iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Looks up a header by case-insensitive name.
    ///
    /// Values that are not visible ASCII are treated as absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Looks up a header by case-insensitive name, keeping opaque values
    /// distinct from absent ones.
    ///
    /// # Errors
    ///
    /// Returns the conversion error when the value is not visible ASCII.
    pub fn try_header(&self, name: &str) -> Result<Option<&str>, header::ToStrError> {
        self.headers.get(name).map(HeaderValue::to_str).transpose()
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// Returns the parsed Content-Type, if present and well-formed.
    #[must_use]
    pub fn mime(&self) -> Option<mime::Mime> {
        self.content_type().and_then(|ct| ct.parse().ok())
    }
}

/// Builder for constructing an [`IncomingRequest`].
///
/// Method defaults to `GET` and the URI to `/`.
#[derive(Debug, Default)]
pub struct IncomingRequestBuilder {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_attributes: PathAttributes,
}

impl IncomingRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    /// Sets all headers at once.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a single header; invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a single path attribute.
    #[must_use]
    pub fn path_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_attributes.insert(name, value);
        self
    }

    /// Builds the request.
    #[must_use]
    pub fn build(self) -> IncomingRequest {
        IncomingRequest {
            method: self.method,
            uri: self.uri,
            headers: self.headers,
            body: self.body,
            path_attributes: self.path_attributes,
        }
    }
}
