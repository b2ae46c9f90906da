//! Argument resolution.
//!
//! Given the operation description of the matched controller method, the
//! method's [`Signature`], and the request, [`ArgumentResolver::resolve`]
//! produces one value per tagged parameter, in parameter order.
//!
//! For each tagged parameter the resolver:
//!
//! 1. maps the parameter name to its real argument name,
//! 2. looks up the argument descriptor by real name,
//! 3. reads the raw value from the descriptor's location,
//! 4. rejects an absent value for a non-nullable parameter before any
//!    coercion,
//! 5. coerces scalars or decodes the body.
//!
//! The first failure aborts resolution; no partial list is returned.

use std::borrow::Cow;

use sextant_core::{
    ArgumentSchema, Definitions, Location, OperationDescription, Parameter, PropertyType,
    Signature,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::body::{BodyDecoder, Payload};
use crate::coerce::{coerce, Scalar};
use crate::{ExtractionError, ExtractionSource, IncomingRequest};

/// A resolved controller argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// Absent value of a nullable parameter, or a body with no reader.
    Null,
    /// Coerced path, query, or header value.
    Scalar(Scalar),
    /// Decoded body.
    Body(Payload),
}

impl ArgumentValue {
    /// Returns `true` for [`ArgumentValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the scalar, if any.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Returns the body payload, if any.
    #[must_use]
    pub fn as_payload(&self) -> Option<&Payload> {
        match self {
            Self::Body(payload) => Some(payload),
            _ => None,
        }
    }

    /// Returns an integer scalar.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Scalar::as_i64)
    }

    /// Returns a numeric scalar.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Scalar::as_f64)
    }

    /// Returns a boolean scalar.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Scalar::as_bool)
    }

    /// Returns a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Returns the JSON value of a JSON or validated body.
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        self.as_payload().and_then(Payload::as_json)
    }
}

/// Resolved arguments, keyed by parameter name, in parameter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, ArgumentValue)>,
}

impl Arguments {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a value by parameter name.
    #[must_use]
    pub fn get(&self, parameter: &str) -> Option<&ArgumentValue> {
        self.values
            .iter()
            .find(|(name, _)| name == parameter)
            .map(|(_, value)| value)
    }

    /// Iterates over `(parameter, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the number of resolved arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the list and returns the values in order.
    #[must_use]
    pub fn into_values(self) -> Vec<ArgumentValue> {
        self.values.into_iter().map(|(_, v)| v).collect()
    }

    fn push(&mut self, parameter: impl Into<String>, value: ArgumentValue) {
        self.values.push((parameter.into(), value));
    }
}

/// Failure to resolve the arguments of one call.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The request did not satisfy the operation; answer the client.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A tagged parameter has no argument in the operation description.
    #[error(
        "parameter '{parameter}' maps to argument '{real_name}', \
         which operation '{operation_id}' does not declare"
    )]
    UndeclaredArgument {
        /// Operation being resolved.
        operation_id: String,
        /// Controller parameter name.
        parameter: String,
        /// Real argument name the parameter maps to.
        real_name: String,
    },
}

/// Resolves controller arguments from a request.
#[derive(Debug, Clone, Default)]
pub struct ArgumentResolver {
    decoder: BodyDecoder,
}

impl ArgumentResolver {
    /// Creates a resolver around a body decoder.
    #[must_use]
    pub fn new(decoder: BodyDecoder) -> Self {
        Self { decoder }
    }

    /// Returns the body decoder.
    #[must_use]
    pub fn decoder(&self) -> &BodyDecoder {
        &self.decoder
    }

    /// Resolves every tagged parameter of `signature`.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Extraction`] for any client-facing failure
    /// - [`ResolveError::UndeclaredArgument`] when the signature and the
    ///   operation description disagree
    pub async fn resolve(
        &self,
        operation: &OperationDescription,
        definitions: &Definitions,
        signature: &Signature,
        request: &IncomingRequest,
    ) -> Result<Arguments, ResolveError> {
        let mut arguments = Arguments::new();

        for parameter in signature.parameters() {
            let (Some(tag), Some(real_name)) = (parameter.tag(), parameter.real_name()) else {
                continue;
            };

            let Some(argument) = operation.argument(real_name) else {
                error!(
                    operation_id = operation.operation_id(),
                    parameter = parameter.name(),
                    real_name,
                    "Controller parameter has no matching operation argument"
                );
                return Err(ResolveError::UndeclaredArgument {
                    operation_id: operation.operation_id().to_string(),
                    parameter: parameter.name().to_string(),
                    real_name: real_name.to_string(),
                });
            };

            if tag.location() != argument.location() {
                warn!(
                    operation_id = operation.operation_id(),
                    parameter = parameter.name(),
                    tagged = %tag.location(),
                    declared = %argument.location(),
                    "Parameter tag disagrees with operation; using declared location"
                );
            }

            let value = match argument.location() {
                Location::Body => self
                    .decoder
                    .decode(argument.schema(), request, definitions)
                    .await?
                    .map_or(ArgumentValue::Null, ArgumentValue::Body),
                location => {
                    resolve_scalar(parameter, real_name, location, argument.schema(), request)?
                }
            };

            debug!(
                operation_id = operation.operation_id(),
                parameter = parameter.name(),
                real_name,
                location = %argument.location(),
                null = value.is_null(),
                "Resolved controller argument"
            );
            arguments.push(parameter.name(), value);
        }

        Ok(arguments)
    }
}

fn resolve_scalar(
    parameter: &Parameter,
    real_name: &str,
    location: Location,
    schema: &ArgumentSchema,
    request: &IncomingRequest,
) -> Result<ArgumentValue, ExtractionError> {
    let source = ExtractionSource::from(location);
    let raw: Option<Cow<'_, str>> = match location {
        Location::Path => request.path_attribute(real_name).map(Cow::Borrowed),
        Location::Query => request.query(real_name).map(Cow::Owned),
        Location::Header => request
            .try_header(real_name)
            .map_err(|e| ExtractionError::invalid_format(source, real_name, e))?
            .map(Cow::Borrowed),
        Location::Body => None,
    };

    if raw.is_none() && !parameter.is_nullable() {
        return Err(ExtractionError::missing(source, real_name));
    }

    // Non-body arguments always carry a property type; a stray content
    // marker is read as an unconstrained value.
    let any = PropertyType::Any;
    let declared = match schema {
        ArgumentSchema::Property(property) => property,
        ArgumentSchema::Content { .. } => &any,
    };

    let coerced = coerce(declared, raw.as_deref())
        .map_err(|e| ExtractionError::invalid_format(source, real_name, e))?;

    Ok(coerced.map_or(ArgumentValue::Null, ArgumentValue::Scalar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{StatusCode, Uri};
    use serde_json::json;
    use sextant_core::{Argument, ContentType, Format, SourceTag};

    fn operation() -> OperationDescription {
        OperationDescription::builder("listItems")
            .argument("id", Argument::path(PropertyType::Integer))
            .argument("limit", Argument::query(PropertyType::Integer))
            .argument("since", Argument::query(PropertyType::formatted(Format::Date)))
            .argument("x-tenant", Argument::header(PropertyType::string()))
            .argument("payload", Argument::body(ContentType::Json))
            .build()
    }

    async fn resolve(signature: &Signature, request: &IncomingRequest) -> Result<Arguments, ResolveError> {
        ArgumentResolver::default()
            .resolve(&operation(), &Definitions::new(), signature, request)
            .await
    }

    #[tokio::test]
    async fn test_path_integer() {
        let signature = Signature::new().parameter(Parameter::new("id").tagged(SourceTag::path()));
        let request = IncomingRequest::builder().path_attribute("id", "42").build();

        let arguments = resolve(&signature, &request).await.unwrap();
        assert_eq!(arguments.into_values(), vec![ArgumentValue::Scalar(Scalar::Integer(42))]);
    }

    #[tokio::test]
    async fn test_nullable_query_absent_is_null() {
        let signature = Signature::new()
            .parameter(Parameter::new("limit").nullable().tagged(SourceTag::query()));
        let request = IncomingRequest::builder().uri(Uri::from_static("/items")).build();

        let arguments = resolve(&signature, &request).await.unwrap();
        assert_eq!(arguments.into_values(), vec![ArgumentValue::Null]);
    }

    #[tokio::test]
    async fn test_required_query_absent_is_bad_request() {
        let signature = Signature::new().parameter(Parameter::new("limit").tagged(SourceTag::query()));
        let request = IncomingRequest::builder().uri(Uri::from_static("/items")).build();

        let err = resolve(&signature, &request).await.unwrap_err();
        let ResolveError::Extraction(err) = err else {
            panic!("expected extraction error");
        };
        assert!(err.is_missing());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing query parameter \"limit\"");
    }

    #[tokio::test]
    async fn test_missing_is_reported_before_coercion() {
        // A date argument that is absent must fail as missing, not as format.
        let signature = Signature::new().parameter(Parameter::new("since").tagged(SourceTag::query()));
        let request = IncomingRequest::builder().build();

        let ResolveError::Extraction(err) = resolve(&signature, &request).await.unwrap_err() else {
            panic!("expected extraction error");
        };
        assert!(err.is_missing());
    }

    #[tokio::test]
    async fn test_invalid_date_format() {
        let signature = Signature::new().parameter(Parameter::new("since").tagged(SourceTag::query()));
        let request = IncomingRequest::builder()
            .uri(Uri::from_static("/items?since=yesterday"))
            .build();

        let ResolveError::Extraction(err) = resolve(&signature, &request).await.unwrap_err() else {
            panic!("expected extraction error");
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field(), Some("since"));
    }

    #[tokio::test]
    async fn test_header_with_name_override() {
        let signature = Signature::new()
            .parameter(Parameter::new("tenant").tagged(SourceTag::header().named("x-tenant")));
        let request = IncomingRequest::builder().header("X-Tenant", "acme").build();

        let arguments = resolve(&signature, &request).await.unwrap();
        assert_eq!(arguments.get("tenant").and_then(ArgumentValue::as_str), Some("acme"));
    }

    #[tokio::test]
    async fn test_required_header_absent_is_bad_request() {
        let signature = Signature::new()
            .parameter(Parameter::new("tenant").tagged(SourceTag::header().named("x-tenant")));
        let request = IncomingRequest::builder().build();

        let ResolveError::Extraction(err) = resolve(&signature, &request).await.unwrap_err() else {
            panic!("expected extraction error");
        };
        assert!(err.is_missing());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing header parameter \"x-tenant\"");
    }

    #[tokio::test]
    async fn test_opaque_header_is_invalid_format() {
        let mut headers = http::HeaderMap::new();
        headers.insert("x-tenant", http::HeaderValue::from_bytes(b"caf\xe9").unwrap());
        let signature = Signature::new()
            .parameter(Parameter::new("tenant").tagged(SourceTag::header().named("x-tenant")));
        let request = IncomingRequest::builder().headers(headers).build();

        let ResolveError::Extraction(err) = resolve(&signature, &request).await.unwrap_err() else {
            panic!("expected extraction error");
        };
        assert!(!err.is_missing());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field(), Some("x-tenant"));
        assert!(err.to_string().starts_with("Invalid header parameter \"x-tenant\""));
    }

    #[tokio::test]
    async fn test_query_name_override_is_independent_of_path() {
        let signature = Signature::new()
            .parameter(Parameter::new("id").tagged(SourceTag::path()))
            .parameter(Parameter::new("pageSize").nullable().tagged(SourceTag::query().named("limit")));
        let request = IncomingRequest::builder()
            .uri(Uri::from_static("/items/1?limit=25&pageSize=99"))
            .path_attribute("id", "1")
            .build();

        let arguments = resolve(&signature, &request).await.unwrap();
        assert_eq!(arguments.get("pageSize").and_then(ArgumentValue::as_i64), Some(25));
    }

    #[tokio::test]
    async fn test_order_follows_signature_and_skips_untagged() {
        let signature = Signature::new()
            .parameter(Parameter::new("payload").tagged(SourceTag::body()))
            .parameter(Parameter::new("logger"))
            .parameter(Parameter::new("id").tagged(SourceTag::path()));
        let request = IncomingRequest::builder()
            .path_attribute("id", "7")
            .body(r#"{"a":1}"#)
            .build();

        let arguments = resolve(&signature, &request).await.unwrap();
        let names: Vec<_> = arguments.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["payload", "id"]);
        assert_eq!(arguments.get("payload").and_then(ArgumentValue::as_json), Some(&json!({ "a": 1 })));
        assert_eq!(arguments.get("logger"), None);
    }

    #[tokio::test]
    async fn test_undeclared_argument_is_programming_error() {
        let signature = Signature::new().parameter(Parameter::new("ghost").tagged(SourceTag::query()));
        let request = IncomingRequest::builder().build();

        let err = resolve(&signature, &request).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UndeclaredArgument { ref real_name, .. } if real_name == "ghost"
        ));
        assert!(err.to_string().contains("listItems"));
    }

    #[tokio::test]
    async fn test_declared_location_wins_over_tag() {
        // Tagged as header, but the operation says path.
        let signature = Signature::new().parameter(Parameter::new("id").tagged(SourceTag::header()));
        let request = IncomingRequest::builder()
            .path_attribute("id", "5")
            .header("id", "6")
            .build();

        let arguments = resolve(&signature, &request).await.unwrap();
        assert_eq!(arguments.get("id").and_then(ArgumentValue::as_i64), Some(5));
    }

    #[tokio::test]
    async fn test_first_failure_aborts() {
        let signature = Signature::new()
            .parameter(Parameter::new("id").tagged(SourceTag::path()))
            .parameter(Parameter::new("payload").tagged(SourceTag::body()));
        let request = IncomingRequest::builder().body("{broken").build();

        let ResolveError::Extraction(err) = resolve(&signature, &request).await.unwrap_err() else {
            panic!("expected extraction error");
        };
        assert!(err.is_missing());
    }
}
