//! Named type definitions referenced by body schemas.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::operation::PropertyType;

/// A named struct type: typed properties plus the list of required ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Properties in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, PropertyType>,
    /// Names of properties that must be present and non-null.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl TypeDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an optional property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, property: PropertyType) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    /// Adds a required property.
    #[must_use]
    pub fn required_property(mut self, name: impl Into<String>, property: PropertyType) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, property);
        self
    }

    /// Returns `true` if `name` is listed as required.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Registry of named types, keyed by the name schemas refer to.
///
/// # Example
///
/// ```
/// use sextant_core::{Definitions, PropertyType, TypeDefinition};
///
/// let definitions = Definitions::new().with(
///     "User",
///     TypeDefinition::new().required_property("name", PropertyType::string()),
/// );
///
/// assert!(definitions.get("User").unwrap().is_required("name"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Definitions {
    types: IndexMap<String, TypeDefinition>,
}

impl Definitions {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type under `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, definition: TypeDefinition) -> Self {
        self.types.insert(name.into(), definition);
        self
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Format;

    #[test]
    fn test_definition_builders() {
        let definition = TypeDefinition::new()
            .required_property("title", PropertyType::string())
            .property("starts", PropertyType::formatted(Format::DateTime));

        assert!(definition.is_required("title"));
        assert!(!definition.is_required("starts"));
        assert_eq!(definition.properties.len(), 2);
    }

    #[test]
    fn test_definitions_deserialize_from_map() {
        let definitions: Definitions = serde_json::from_str(
            r#"{
                "Tag": { "properties": { "label": { "type": "string" } } },
                "Post": {
                    "properties": {
                        "tag": { "type": "reference", "target": "Tag" },
                        "views": { "type": "integer" }
                    },
                    "required": ["tag"]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(definitions.len(), 2);
        let post = definitions.get("Post").unwrap();
        assert_eq!(post.properties["tag"], PropertyType::reference("Tag"));
        assert!(post.is_required("tag"));
        assert!(definitions.get("Tag").unwrap().required.is_empty());
    }
}
