//! Body decoding.
//!
//! [`BodyDecoder::decode`] turns the buffered request body into a
//! [`Payload`] according to the argument's declared schema:
//!
//! - content-type markers pick a reader (binary, form, JSON, multipart, text)
//! - the `Passthru` reference reads the body generically, without validation
//! - any other reference parses the body and hands it to a [`SchemaValidator`];
//!   form fields are first coerced to the scalar types the target declares
//! - a plain property type on a body yields nothing

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use sextant_core::{ArgumentSchema, ContentType, Definitions, PropertyType};

use crate::coerce::{coerce, Scalar};
use crate::form::FormData;
use crate::multipart::{is_multipart, MultipartData, MultipartLimits};
use crate::validator::{DefinitionValidator, SchemaValidator};
use crate::{ExtractionError, ExtractionSource, IncomingRequest};

/// Reference target that skips schema validation.
pub const PASSTHRU: &str = "Passthru";

/// Default maximum body size (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// A decoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The raw bytes, untouched.
    Binary(Bytes),
    /// A URL-encoded form.
    Form(FormData),
    /// A generic JSON value.
    Json(Value),
    /// A multipart form with fields and files.
    Multipart(MultipartData),
    /// The body as text.
    Text(String),
    /// A JSON value accepted by the schema validator.
    Object(Value),
}

impl Payload {
    /// Returns the JSON value of a JSON or validated body.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) | Self::Object(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the raw bytes of a binary body.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the text of a text body.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the decoded form.
    #[must_use]
    pub fn as_form(&self) -> Option<&FormData> {
        match self {
            Self::Form(form) => Some(form),
            _ => None,
        }
    }

    /// Returns the decoded multipart body.
    #[must_use]
    pub fn as_multipart(&self) -> Option<&MultipartData> {
        match self {
            Self::Multipart(data) => Some(data),
            _ => None,
        }
    }
}

/// Size limits applied before and while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimits {
    /// Maximum buffered body size in bytes.
    pub max_body_size: usize,
    /// Limits for multipart bodies.
    pub multipart: MultipartLimits,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            multipart: MultipartLimits::default(),
        }
    }
}

/// Decodes request bodies by declared schema.
#[derive(Clone)]
pub struct BodyDecoder {
    limits: BodyLimits,
    validator: Arc<dyn SchemaValidator>,
}

impl Default for BodyDecoder {
    fn default() -> Self {
        Self::new(BodyLimits::default())
    }
}

impl std::fmt::Debug for BodyDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyDecoder")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl BodyDecoder {
    /// Creates a decoder using the built-in [`DefinitionValidator`].
    #[must_use]
    pub fn new(limits: BodyLimits) -> Self {
        Self {
            limits,
            validator: Arc::new(DefinitionValidator::new()),
        }
    }

    /// Replaces the schema validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl SchemaValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Replaces the limits, keeping the validator.
    #[must_use]
    pub fn with_limits(mut self, limits: BodyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the configured limits.
    #[must_use]
    pub fn limits(&self) -> &BodyLimits {
        &self.limits
    }

    /// Decodes the body of `request` according to `schema`.
    ///
    /// Returns `Ok(None)` when the schema is a non-reference property type,
    /// which carries no instructions for reading a body.
    ///
    /// # Errors
    ///
    /// - `PayloadTooLarge` if the body exceeds the configured limit
    /// - `UnsupportedMediaType` if a multipart body is declared but the
    ///   request is not multipart
    /// - a deserialization error for malformed JSON, form, or text bodies
    /// - whatever the schema validator reports for reference types
    pub async fn decode(
        &self,
        schema: &ArgumentSchema,
        request: &IncomingRequest,
        definitions: &Definitions,
    ) -> Result<Option<Payload>, ExtractionError> {
        let body = request.body();
        if body.len() > self.limits.max_body_size {
            return Err(ExtractionError::payload_too_large(
                self.limits.max_body_size,
                body.len(),
            ));
        }

        let payload = match schema {
            ArgumentSchema::Content { content_type } => {
                self.decode_content(*content_type, request).await?
            }
            ArgumentSchema::Property(PropertyType::Reference { target }) if target == PASSTHRU => {
                self.decode_generic(request).await?
            }
            ArgumentSchema::Property(PropertyType::Reference { target }) => {
                let value = self.parse_structured(request, target, definitions)?;
                let value = self.validator.validate(target, value, definitions)?;
                Payload::Object(value)
            }
            ArgumentSchema::Property(_) => return Ok(None),
        };

        Ok(Some(payload))
    }

    async fn decode_content(
        &self,
        content_type: ContentType,
        request: &IncomingRequest,
    ) -> Result<Payload, ExtractionError> {
        let body = request.body();
        match content_type {
            ContentType::Binary => Ok(Payload::Binary(body.clone())),
            ContentType::Form => FormData::parse(body).map(Payload::Form),
            ContentType::Json => parse_json(body).map(Payload::Json),
            ContentType::Multipart => {
                if !is_multipart(request.content_type()) {
                    return Err(ExtractionError::unsupported_media_type(
                        ContentType::Multipart.as_str(),
                        request.content_type(),
                    ));
                }
                self.read_multipart(request).await
            }
            ContentType::Text => String::from_utf8(body.to_vec())
                .map(Payload::Text)
                .map_err(|e| {
                    ExtractionError::deserialization_failed(
                        ExtractionSource::Body,
                        format!("invalid UTF-8: {e}"),
                    )
                }),
        }
    }

    /// Reads the body by the request's own Content-Type: forms and multipart
    /// by their readers, anything else as JSON. An empty body reads as null.
    async fn decode_generic(&self, request: &IncomingRequest) -> Result<Payload, ExtractionError> {
        if is_multipart(request.content_type()) {
            return self.read_multipart(request).await;
        }
        if is_form(request) {
            return FormData::parse(request.body()).map(Payload::Form);
        }
        if request.body().is_empty() {
            return Ok(Payload::Json(Value::Null));
        }
        parse_json(request.body()).map(Payload::Json)
    }

    fn parse_structured(
        &self,
        request: &IncomingRequest,
        target: &str,
        definitions: &Definitions,
    ) -> Result<Value, ExtractionError> {
        if is_multipart(request.content_type()) {
            return Err(ExtractionError::unsupported_media_type(
                ContentType::Json.as_str(),
                request.content_type(),
            ));
        }
        if is_form(request) {
            return FormData::parse(request.body())
                .map(|form| coerce_form_fields(&form, target, definitions));
        }
        parse_json(request.body())
    }

    async fn read_multipart(&self, request: &IncomingRequest) -> Result<Payload, ExtractionError> {
        MultipartData::read(
            request.content_type(),
            request.body().clone(),
            self.limits.multipart,
        )
        .await
        .map(Payload::Multipart)
    }
}

fn is_form(request: &IncomingRequest) -> bool {
    request
        .mime()
        .is_some_and(|m| m.essence_str() == ContentType::Form.as_str())
}

/// Form fields arrive as strings. Single values of integer, number, and
/// boolean properties on the target type are coerced the way path and query
/// values are; everything else is left for the validator.
fn coerce_form_fields(form: &FormData, target: &str, definitions: &Definitions) -> Value {
    let mut value = form.to_json();
    let Some(definition) = definitions.get(target) else {
        return value;
    };

    if let Value::Object(object) = &mut value {
        for (name, property) in &definition.properties {
            if !matches!(
                property,
                PropertyType::Integer | PropertyType::Number | PropertyType::Boolean
            ) {
                continue;
            }
            let Some(slot) = object.get_mut(name) else {
                continue;
            };
            let coerced = match slot {
                Value::String(raw) => coerce(property, Some(raw.as_str())).ok().flatten(),
                _ => None,
            };
            match coerced {
                Some(Scalar::Integer(n)) => *slot = Value::from(n),
                Some(Scalar::Number(n)) => *slot = Value::from(n),
                Some(Scalar::Boolean(b)) => *slot = Value::Bool(b),
                _ => {}
            }
        }
    }

    value
}

fn parse_json(body: &[u8]) -> Result<Value, ExtractionError> {
    if body.is_empty() {
        return Err(ExtractionError::deserialization_failed(
            ExtractionSource::Body,
            "empty request body",
        ));
    }
    serde_json::from_slice(body)
        .map_err(|e| ExtractionError::deserialization_failed(ExtractionSource::Body, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::tests::create_multipart_body;
    use http::StatusCode;
    use serde_json::json;
    use sextant_core::TypeDefinition;

    fn json_request(body: &str) -> IncomingRequest {
        IncomingRequest::builder()
            .header("content-type", "application/json")
            .body(body.to_string())
            .build()
    }

    fn definitions() -> Definitions {
        Definitions::new().with(
            "Note",
            TypeDefinition::new().required_property("text", PropertyType::string()),
        )
    }

    async fn decode(schema: impl Into<ArgumentSchema>, request: &IncomingRequest) -> Result<Option<Payload>, ExtractionError> {
        BodyDecoder::default()
            .decode(&schema.into(), request, &definitions())
            .await
    }

    #[tokio::test]
    async fn test_binary_is_untouched() {
        let request = IncomingRequest::builder().body(vec![0u8, 159, 146, 150]).build();
        let payload = decode(ContentType::Binary, &request).await.unwrap().unwrap();
        assert_eq!(payload.as_bytes().map(|b| &b[..]), Some(&[0u8, 159, 146, 150][..]));
    }

    #[tokio::test]
    async fn test_json_body() {
        let payload = decode(ContentType::Json, &json_request(r#"{"a":1}"#))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payload, Payload::Json(json!({ "a": 1 })));
    }

    #[tokio::test]
    async fn test_json_ignores_request_content_type() {
        let request = IncomingRequest::builder()
            .header("content-type", "text/plain")
            .body("[1,2]")
            .build();
        let payload = decode(ContentType::Json, &request).await.unwrap().unwrap();
        assert_eq!(payload.as_json(), Some(&json!([1, 2])));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let err = decode(ContentType::Json, &json_request("{not json"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = decode(ContentType::Json, &json_request("")).await.unwrap_err();
        assert!(err.to_string().contains("empty request body"));
    }

    #[tokio::test]
    async fn test_form_body() {
        let request = IncomingRequest::builder()
            .header("content-type", "application/x-www-form-urlencoded")
            .body("name=Alice&tag=a&tag=b")
            .build();
        let payload = decode(ContentType::Form, &request).await.unwrap().unwrap();

        let form = payload.as_form().unwrap();
        assert_eq!(form.get("tag").unwrap().all(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_text_body() {
        let request = IncomingRequest::builder().body("plain words").build();
        let payload = decode(ContentType::Text, &request).await.unwrap().unwrap();
        assert_eq!(payload.as_text(), Some("plain words"));

        let bad = IncomingRequest::builder().body(vec![0xffu8, 0xfe]).build();
        assert!(decode(ContentType::Text, &bad).await.is_err());
    }

    #[tokio::test]
    async fn test_multipart_body() {
        let body = create_multipart_body("xyz", &[("title", "text/plain", None, b"Hello")]);
        let request = IncomingRequest::builder()
            .header("content-type", "multipart/form-data; boundary=xyz")
            .body(body)
            .build();

        let payload = decode(ContentType::Multipart, &request).await.unwrap().unwrap();
        assert_eq!(payload.as_multipart().unwrap().field("title"), Some("Hello"));
    }

    #[tokio::test]
    async fn test_multipart_declared_but_json_sent() {
        let err = decode(ContentType::Multipart, &json_request(r#"{"a":1}"#))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_passthru_returns_parsed_body_unvalidated() {
        let document = json!({ "anything": [true, null, { "deep": 1.5 }] });
        let payload = decode(
            PropertyType::reference(PASSTHRU),
            &json_request(&document.to_string()),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(payload, Payload::Json(document));
    }

    #[tokio::test]
    async fn test_passthru_reads_forms_by_content_type() {
        let request = IncomingRequest::builder()
            .header("content-type", "application/x-www-form-urlencoded")
            .body("a=1")
            .build();
        let payload = decode(PropertyType::reference(PASSTHRU), &request)
            .await
            .unwrap()
            .unwrap();
        assert!(payload.as_form().is_some());
    }

    #[tokio::test]
    async fn test_reference_is_validated() {
        let payload = decode(PropertyType::reference("Note"), &json_request(r#"{"text":"hi"}"#))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payload, Payload::Object(json!({ "text": "hi" })));

        let err = decode(PropertyType::reference("Note"), &json_request("{}"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_reference_accepts_form_encoding() {
        let request = IncomingRequest::builder()
            .header("content-type", "application/x-www-form-urlencoded")
            .body("text=hello")
            .build();
        let payload = decode(PropertyType::reference("Note"), &request)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payload.as_json(), Some(&json!({ "text": "hello" })));
    }

    #[tokio::test]
    async fn test_reference_form_fields_are_coerced_to_declared_types() {
        let definitions = Definitions::new().with(
            "Post",
            TypeDefinition::new()
                .required_property("title", PropertyType::string())
                .property("views", PropertyType::Integer)
                .property("score", PropertyType::Number)
                .property("draft", PropertyType::Boolean),
        );
        let request = IncomingRequest::builder()
            .header("content-type", "application/x-www-form-urlencoded")
            .body("title=5&views=5&score=2.5&draft=0&extra=7")
            .build();

        let payload = BodyDecoder::default()
            .decode(&PropertyType::reference("Post").into(), &request, &definitions)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            payload,
            Payload::Object(json!({
                "title": "5",
                "views": 5,
                "score": 2.5,
                "draft": false,
                "extra": "7"
            }))
        );
    }

    #[tokio::test]
    async fn test_reference_form_repeated_scalar_still_fails_validation() {
        let definitions = Definitions::new().with(
            "Post",
            TypeDefinition::new().property("views", PropertyType::Integer),
        );
        let request = IncomingRequest::builder()
            .header("content-type", "application/x-www-form-urlencoded")
            .body("views=1&views=2")
            .build();

        let err = BodyDecoder::default()
            .decode(&PropertyType::reference("Post").into(), &request, &definitions)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.field(), Some("/views"));
    }

    #[tokio::test]
    async fn test_passthru_empty_body_is_null() {
        let request = IncomingRequest::builder().build();
        let payload = decode(PropertyType::reference(PASSTHRU), &request)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(payload, Payload::Json(Value::Null));
    }

    #[tokio::test]
    async fn test_custom_validator_is_used() {
        struct RejectAll;

        impl SchemaValidator for RejectAll {
            fn validate(&self, target: &str, _: Value, _: &Definitions) -> Result<Value, ExtractionError> {
                Err(ExtractionError::schema_validation(StatusCode::BAD_REQUEST, "", format!("{target} rejected")))
            }
        }

        let decoder = BodyDecoder::default().with_validator(RejectAll);
        let err = decoder
            .decode(
                &PropertyType::reference("Note").into(),
                &json_request(r#"{"text":"hi"}"#),
                &definitions(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("Note rejected"));
    }

    #[tokio::test]
    async fn test_plain_property_type_yields_nothing() {
        let result = decode(PropertyType::string(), &json_request("\"x\"")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let decoder = BodyDecoder::new(BodyLimits {
            max_body_size: 4,
            ..BodyLimits::default()
        });
        let err = decoder
            .decode(
                &ContentType::Text.into(),
                &IncomingRequest::builder().body("too long").build(),
                &Definitions::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
