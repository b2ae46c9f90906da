//! Operation descriptions.
//!
//! An [`OperationDescription`] is what the API description says about one
//! controller method: which arguments it takes, where each one comes from in
//! the request, and how its raw value must be interpreted. Descriptions are
//! built once (usually deserialized from an API description document) and
//! then shared read-only across requests.
//!
//! # Example
//!
//! ```
//! use sextant_core::{Argument, ContentType, OperationDescription, PropertyType};
//!
//! let operation = OperationDescription::builder("updateUser")
//!     .argument("id", Argument::path(PropertyType::Integer))
//!     .argument("payload", Argument::body(ContentType::Json))
//!     .build();
//!
//! assert_eq!(operation.operation_id(), "updateUser");
//! assert_eq!(operation.arguments().len(), 2);
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::definitions::Definitions;

/// Where in the request an argument is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Route-matched path attribute.
    Path,
    /// Query string parameter.
    Query,
    /// Request header.
    Header,
    /// Request body.
    Body,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
            Self::Body => write!(f, "body"),
        }
    }
}

/// String formats that change how a raw string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Date and time of day with an offset (RFC 3339).
    DateTime,
    /// Time of day, `HH:MM[:SS[.fff]]`.
    Time,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::DateTime => write!(f, "date-time"),
            Self::Time => write!(f, "time"),
        }
    }
}

/// Declared type of a scalar property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertyType {
    /// Text, optionally constrained to a date/time format.
    String {
        /// Optional format.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<Format>,
    },
    /// Whole number.
    Integer,
    /// Floating point number.
    Number,
    /// Boolean flag.
    Boolean,
    /// Unconstrained value.
    Any,
    /// Reference to a named type in the [`Definitions`].
    Reference {
        /// Name of the referenced type.
        target: String,
    },
}

impl PropertyType {
    /// Plain string without a format.
    #[must_use]
    pub const fn string() -> Self {
        Self::String { format: None }
    }

    /// String with the given format.
    #[must_use]
    pub const fn formatted(format: Format) -> Self {
        Self::String {
            format: Some(format),
        }
    }

    /// Reference to a named type.
    #[must_use]
    pub fn reference(target: impl Into<String>) -> Self {
        Self::Reference {
            target: target.into(),
        }
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::String { .. } => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Any => "any",
            Self::Reference { target } => target,
        }
    }
}

/// Content types a body argument can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// Raw bytes, handed over untouched.
    #[serde(rename = "application/octet-stream")]
    Binary,
    /// `application/x-www-form-urlencoded`.
    #[serde(rename = "application/x-www-form-urlencoded")]
    Form,
    /// `application/json`.
    #[serde(rename = "application/json")]
    Json,
    /// `multipart/form-data`.
    #[serde(rename = "multipart/form-data")]
    Multipart,
    /// `text/plain`.
    #[serde(rename = "text/plain")]
    Text,
}

impl ContentType {
    /// Returns the MIME essence string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "application/octet-stream",
            Self::Form => "application/x-www-form-urlencoded",
            Self::Json => "application/json",
            Self::Multipart => "multipart/form-data",
            Self::Text => "text/plain",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema of an argument: either a content-type marker or a property type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentSchema {
    /// Body declared by content type.
    Content {
        /// The declared content type.
        #[serde(rename = "contentType")]
        content_type: ContentType,
    },
    /// Value declared by property type.
    Property(PropertyType),
}

impl From<ContentType> for ArgumentSchema {
    fn from(content_type: ContentType) -> Self {
        Self::Content { content_type }
    }
}

impl From<PropertyType> for ArgumentSchema {
    fn from(property: PropertyType) -> Self {
        Self::Property(property)
    }
}

/// Errors raised while building an operation description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptionError {
    /// A content-type marker was attached to a non-body argument.
    #[error("{location} argument cannot be declared with content type {content_type}")]
    ContentTypeOutsideBody {
        /// Location of the offending argument.
        location: Location,
        /// The content type that was declared.
        content_type: ContentType,
    },
}

/// Descriptor of a single operation argument.
///
/// Only body arguments may carry a content-type marker; path, query and
/// header arguments always have a property type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawArgument", into = "RawArgument")]
pub struct Argument {
    location: Location,
    schema: ArgumentSchema,
}

#[derive(Serialize, Deserialize)]
struct RawArgument {
    #[serde(rename = "in")]
    location: Location,
    schema: ArgumentSchema,
}

impl TryFrom<RawArgument> for Argument {
    type Error = DescriptionError;

    fn try_from(raw: RawArgument) -> Result<Self, Self::Error> {
        Self::new(raw.location, raw.schema)
    }
}

impl From<Argument> for RawArgument {
    fn from(argument: Argument) -> Self {
        Self {
            location: argument.location,
            schema: argument.schema,
        }
    }
}

impl Argument {
    /// Creates an argument, enforcing that content types only appear on bodies.
    pub fn new(
        location: Location,
        schema: impl Into<ArgumentSchema>,
    ) -> Result<Self, DescriptionError> {
        let schema = schema.into();
        if let ArgumentSchema::Content { content_type } = schema {
            if location != Location::Body {
                return Err(DescriptionError::ContentTypeOutsideBody {
                    location,
                    content_type,
                });
            }
        }
        Ok(Self { location, schema })
    }

    /// Path argument of the given type.
    #[must_use]
    pub fn path(property: PropertyType) -> Self {
        Self {
            location: Location::Path,
            schema: ArgumentSchema::Property(property),
        }
    }

    /// Query argument of the given type.
    #[must_use]
    pub fn query(property: PropertyType) -> Self {
        Self {
            location: Location::Query,
            schema: ArgumentSchema::Property(property),
        }
    }

    /// Header argument of the given type.
    #[must_use]
    pub fn header(property: PropertyType) -> Self {
        Self {
            location: Location::Header,
            schema: ArgumentSchema::Property(property),
        }
    }

    /// Body argument; accepts a [`ContentType`] or a [`PropertyType`].
    #[must_use]
    pub fn body(schema: impl Into<ArgumentSchema>) -> Self {
        Self {
            location: Location::Body,
            schema: schema.into(),
        }
    }

    /// Returns where the argument is read from.
    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns the declared schema.
    #[must_use]
    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }
}

/// Description of one operation: its id and its named arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescription {
    #[serde(skip)]
    operation_id: String,
    #[serde(default)]
    arguments: IndexMap<String, Argument>,
}

impl OperationDescription {
    /// Starts building an operation description.
    #[must_use]
    pub fn builder(operation_id: impl Into<String>) -> OperationDescriptionBuilder {
        OperationDescriptionBuilder {
            operation: Self {
                operation_id: operation_id.into(),
                arguments: IndexMap::new(),
            },
        }
    }

    /// Returns the operation id.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns all arguments keyed by real name, in declaration order.
    #[must_use]
    pub fn arguments(&self) -> &IndexMap<String, Argument> {
        &self.arguments
    }

    /// Looks up an argument by its real name.
    #[must_use]
    pub fn argument(&self, real_name: &str) -> Option<&Argument> {
        self.arguments.get(real_name)
    }
}

/// Builder for [`OperationDescription`].
#[derive(Debug)]
pub struct OperationDescriptionBuilder {
    operation: OperationDescription,
}

impl OperationDescriptionBuilder {
    /// Adds an argument under its real name.
    #[must_use]
    pub fn argument(mut self, real_name: impl Into<String>, argument: Argument) -> Self {
        self.operation.arguments.insert(real_name.into(), argument);
        self
    }

    /// Finishes the description.
    #[must_use]
    pub fn build(self) -> OperationDescription {
        self.operation
    }
}

/// An API description: the operations of one controller plus the type
/// definitions their body schemas refer to.
///
/// # Example
///
/// ```
/// use sextant_core::Specification;
///
/// let specification = Specification::from_json(r#"{
///     "operations": {
///         "getUser": {
///             "arguments": {
///                 "id": { "in": "path", "schema": { "type": "integer" } }
///             }
///         }
///     }
/// }"#).unwrap();
///
/// let operation = specification.operation("getUser").unwrap();
/// assert_eq!(operation.operation_id(), "getUser");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSpecification")]
pub struct Specification {
    operations: IndexMap<String, OperationDescription>,
    #[serde(default)]
    definitions: Definitions,
}

#[derive(Deserialize)]
struct RawSpecification {
    #[serde(default)]
    operations: IndexMap<String, OperationDescription>,
    #[serde(default)]
    definitions: Definitions,
}

impl From<RawSpecification> for Specification {
    fn from(raw: RawSpecification) -> Self {
        let operations = raw
            .operations
            .into_iter()
            .map(|(id, mut operation)| {
                operation.operation_id.clone_from(&id);
                (id, operation)
            })
            .collect();
        Self {
            operations,
            definitions: raw.definitions,
        }
    }
}

impl Specification {
    /// Creates an empty specification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a specification from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds an operation, keyed by its id.
    #[must_use]
    pub fn with_operation(mut self, operation: OperationDescription) -> Self {
        self.operations
            .insert(operation.operation_id.clone(), operation);
        self
    }

    /// Replaces the type definitions.
    #[must_use]
    pub fn with_definitions(mut self, definitions: Definitions) -> Self {
        self.definitions = definitions;
        self
    }

    /// Looks up an operation by id.
    #[must_use]
    pub fn operation(&self, operation_id: &str) -> Option<&OperationDescription> {
        self.operations.get(operation_id)
    }

    /// Returns all operations.
    #[must_use]
    pub fn operations(&self) -> &IndexMap<String, OperationDescription> {
        &self.operations
    }

    /// Returns the type definitions.
    #[must_use]
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_rejected_outside_body() {
        let err = Argument::new(Location::Query, ContentType::Json).unwrap_err();
        assert_eq!(
            err,
            DescriptionError::ContentTypeOutsideBody {
                location: Location::Query,
                content_type: ContentType::Json,
            }
        );
        assert!(err.to_string().contains("application/json"));
    }

    #[test]
    fn test_body_accepts_both_schema_kinds() {
        assert!(Argument::new(Location::Body, ContentType::Multipart).is_ok());
        assert!(Argument::new(Location::Body, PropertyType::reference("User")).is_ok());
        assert!(Argument::new(Location::Header, PropertyType::string()).is_ok());
    }

    #[test]
    fn test_builder_preserves_declaration_order() {
        let operation = OperationDescription::builder("search")
            .argument("q", Argument::query(PropertyType::string()))
            .argument("limit", Argument::query(PropertyType::Integer))
            .argument("x-tenant", Argument::header(PropertyType::string()))
            .build();

        let names: Vec<_> = operation.arguments().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["q", "limit", "x-tenant"]);
        assert_eq!(
            operation.argument("limit").map(Argument::location),
            Some(Location::Query)
        );
        assert!(operation.argument("missing").is_none());
    }

    #[test]
    fn test_specification_from_json() {
        let specification = Specification::from_json(
            r#"{
                "operations": {
                    "createEvent": {
                        "arguments": {
                            "day": { "in": "query", "schema": { "type": "string", "format": "date" } },
                            "upload": { "in": "body", "schema": { "contentType": "multipart/form-data" } },
                            "event": { "in": "body", "schema": { "type": "reference", "target": "Event" } }
                        }
                    }
                },
                "definitions": {
                    "Event": { "properties": { "title": { "type": "string" } }, "required": ["title"] }
                }
            }"#,
        )
        .unwrap();

        let operation = specification.operation("createEvent").unwrap();
        assert_eq!(operation.operation_id(), "createEvent");
        assert_eq!(
            operation.argument("day").unwrap().schema(),
            &ArgumentSchema::Property(PropertyType::formatted(Format::Date))
        );
        assert_eq!(
            operation.argument("upload").unwrap().schema(),
            &ArgumentSchema::from(ContentType::Multipart)
        );
        assert_eq!(
            operation.argument("event").unwrap().schema(),
            &ArgumentSchema::Property(PropertyType::reference("Event"))
        );
        assert!(specification.definitions().get("Event").is_some());
    }

    #[test]
    fn test_specification_rejects_content_type_on_header() {
        let result = Specification::from_json(
            r#"{
                "operations": {
                    "op": {
                        "arguments": {
                            "h": { "in": "header", "schema": { "contentType": "text/plain" } }
                        }
                    }
                }
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_argument_serializes_with_in_key() {
        let json = serde_json::to_value(Argument::path(PropertyType::Integer)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "in": "path", "schema": { "type": "integer" } })
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Location::Header.to_string(), "header");
        assert_eq!(Format::DateTime.to_string(), "date-time");
        assert_eq!(ContentType::Form.to_string(), "application/x-www-form-urlencoded");
        assert_eq!(PropertyType::reference("User").type_name(), "User");
    }
}
