//! Schema validation for reference-typed bodies.
//!
//! The body decoder only picks the schema and parses the body; checking the
//! parsed value against the named type is delegated to a [`SchemaValidator`].
//! [`DefinitionValidator`] is the built-in implementation that walks a
//! [`Definitions`] registry.

use http::StatusCode;
use serde_json::Value;
use sextant_core::{Definitions, PropertyType};

use crate::coerce::parse_format;
use crate::ExtractionError;

/// Validates a parsed body against a named type.
pub trait SchemaValidator: Send + Sync {
    /// Checks `value` against the type named `target` and returns the
    /// accepted value.
    ///
    /// # Errors
    ///
    /// Returns a schema validation error carrying whatever status the
    /// validator considers appropriate.
    fn validate(
        &self,
        target: &str,
        value: Value,
        definitions: &Definitions,
    ) -> Result<Value, ExtractionError>;
}

/// Validator backed by the [`Definitions`] registry.
///
/// Checks object shape, required properties, scalar property types, nested
/// references, and date/time string formats. Properties not declared on a
/// type are kept as they are.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use sextant_core::{Definitions, PropertyType, TypeDefinition};
/// use sextant_extract::{DefinitionValidator, SchemaValidator};
///
/// let definitions = Definitions::new().with(
///     "User",
///     TypeDefinition::new().required_property("name", PropertyType::string()),
/// );
///
/// let validator = DefinitionValidator::new();
/// assert!(validator.validate("User", json!({"name": "Ada"}), &definitions).is_ok());
/// assert!(validator.validate("User", json!({}), &definitions).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DefinitionValidator {
    status: StatusCode,
}

impl Default for DefinitionValidator {
    fn default() -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl DefinitionValidator {
    /// Creates a validator that reports failures as 422.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the status reported on failure.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    fn fail(&self, pointer: &str, details: impl std::fmt::Display) -> ExtractionError {
        ExtractionError::schema_validation(self.status, pointer, details)
    }

    fn check_reference(
        &self,
        target: &str,
        value: Value,
        definitions: &Definitions,
        pointer: &str,
    ) -> Result<Value, ExtractionError> {
        let Some(definition) = definitions.get(target) else {
            return Err(ExtractionError::schema_validation(
                StatusCode::INTERNAL_SERVER_ERROR,
                pointer,
                format!("unknown type \"{target}\""),
            ));
        };

        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(self.fail(
                    pointer,
                    format!("expected {target} object, got {}", kind(&other)),
                ));
            }
        };

        for name in &definition.required {
            if object.get(name).map_or(true, Value::is_null) {
                return Err(self.fail(&child(pointer, name), "required property is missing"));
            }
        }

        for (name, property) in &definition.properties {
            let Some(slot) = object.get_mut(name) else {
                continue;
            };
            if slot.is_null() {
                continue;
            }
            let checked = self.check(property, slot.take(), definitions, &child(pointer, name))?;
            *slot = checked;
        }

        Ok(Value::Object(object))
    }

    fn check(
        &self,
        property: &PropertyType,
        value: Value,
        definitions: &Definitions,
        pointer: &str,
    ) -> Result<Value, ExtractionError> {
        let accepted = match property {
            PropertyType::Reference { target } => {
                return self.check_reference(target, value, definitions, pointer);
            }
            PropertyType::Any => true,
            PropertyType::String { format } => match (&value, format) {
                (Value::String(s), Some(format)) => {
                    parse_format(*format, s).map_err(|e| self.fail(pointer, e))?;
                    true
                }
                (Value::String(_), None) => true,
                _ => false,
            },
            PropertyType::Integer => value.is_i64() || value.is_u64(),
            PropertyType::Number => value.is_number(),
            PropertyType::Boolean => value.is_boolean(),
        };

        if accepted {
            Ok(value)
        } else {
            Err(self.fail(
                pointer,
                format!("expected {}, got {}", property.type_name(), kind(&value)),
            ))
        }
    }
}

impl SchemaValidator for DefinitionValidator {
    fn validate(
        &self,
        target: &str,
        value: Value,
        definitions: &Definitions,
    ) -> Result<Value, ExtractionError> {
        self.check_reference(target, value, definitions, "")
    }
}

fn child(pointer: &str, name: &str) -> String {
    format!("{pointer}/{}", name.replace('~', "~0").replace('/', "~1"))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sextant_core::{Format, TypeDefinition};

    fn definitions() -> Definitions {
        Definitions::new()
            .with(
                "Author",
                TypeDefinition::new()
                    .required_property("name", PropertyType::string())
                    .property("born", PropertyType::formatted(Format::Date)),
            )
            .with(
                "Post",
                TypeDefinition::new()
                    .required_property("title", PropertyType::string())
                    .property("views", PropertyType::Integer)
                    .property("score", PropertyType::Number)
                    .property("draft", PropertyType::Boolean)
                    .property("meta", PropertyType::Any)
                    .property("author", PropertyType::reference("Author")),
            )
    }

    #[test]
    fn test_valid_document_is_returned_unchanged() {
        let document = json!({
            "title": "Hello",
            "views": 10,
            "score": 4.5,
            "draft": false,
            "meta": [1, "two"],
            "author": { "name": "Ada", "born": "1815-12-10" },
            "extra": "kept"
        });

        let validated = DefinitionValidator::new()
            .validate("Post", document.clone(), &definitions())
            .unwrap();
        assert_eq!(validated, document);
    }

    #[test]
    fn test_missing_required_property() {
        let err = DefinitionValidator::new()
            .validate("Post", json!({ "views": 1 }), &definitions())
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.field(), Some("/title"));
    }

    #[test]
    fn test_null_required_property_counts_as_missing() {
        let err = DefinitionValidator::new()
            .validate("Post", json!({ "title": null }), &definitions())
            .unwrap_err();
        assert_eq!(err.field(), Some("/title"));
    }

    #[test]
    fn test_optional_null_is_accepted() {
        let result = DefinitionValidator::new().validate(
            "Post",
            json!({ "title": "t", "views": null }),
            &definitions(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_wrong_scalar_types() {
        let cases = [
            (json!({ "title": 5 }), "/title"),
            (json!({ "title": "t", "views": 1.5 }), "/views"),
            (json!({ "title": "t", "score": "high" }), "/score"),
            (json!({ "title": "t", "draft": "no" }), "/draft"),
        ];

        for (document, pointer) in cases {
            let err = DefinitionValidator::new()
                .validate("Post", document, &definitions())
                .unwrap_err();
            assert_eq!(err.field(), Some(pointer));
        }
    }

    #[test]
    fn test_nested_reference_errors_point_into_child() {
        let err = DefinitionValidator::new()
            .validate(
                "Post",
                json!({ "title": "t", "author": { "born": "1815-12-10" } }),
                &definitions(),
            )
            .unwrap_err();
        assert_eq!(err.field(), Some("/author/name"));

        let err = DefinitionValidator::new()
            .validate(
                "Post",
                json!({ "title": "t", "author": { "name": "Ada", "born": "10.12.1815" } }),
                &definitions(),
            )
            .unwrap_err();
        assert_eq!(err.field(), Some("/author/born"));
        assert!(err.to_string().contains("date"));
    }

    #[test]
    fn test_root_must_be_object() {
        let err = DefinitionValidator::new()
            .validate("Post", json!([1, 2]), &definitions())
            .unwrap_err();
        assert_eq!(err.field(), Some(""));
        assert!(err.to_string().contains("got array"));
    }

    #[test]
    fn test_unknown_type_is_server_error() {
        let err = DefinitionValidator::new()
            .validate("Missing", json!({}), &definitions())
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_custom_status() {
        let err = DefinitionValidator::new()
            .with_status(StatusCode::BAD_REQUEST)
            .validate("Post", json!({}), &definitions())
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_pointer_escaping() {
        assert_eq!(child("", "a/b"), "/a~1b");
        assert_eq!(child("/x", "m~n"), "/x/m~0n");
    }
}
