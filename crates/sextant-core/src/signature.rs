//! Controller call signatures.
//!
//! A [`Signature`] lists the parameters of a controller method in call order.
//! Each parameter may carry one [`SourceTag`] saying where its value comes
//! from; untagged parameters are left for the host to fill.

use std::fmt;

use thiserror::Error;

use crate::operation::Location;

/// Source tag attached to a controller parameter.
///
/// `name` overrides the real argument name; without it the parameter name is
/// used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTag {
    location: Location,
    name: Option<String>,
}

impl SourceTag {
    /// Tag for a path attribute.
    #[must_use]
    pub fn path() -> Self {
        Self::at(Location::Path)
    }

    /// Tag for a query parameter.
    #[must_use]
    pub fn query() -> Self {
        Self::at(Location::Query)
    }

    /// Tag for a header.
    #[must_use]
    pub fn header() -> Self {
        Self::at(Location::Header)
    }

    /// Tag for the body.
    #[must_use]
    pub fn body() -> Self {
        Self::at(Location::Body)
    }

    /// Tag for an arbitrary location.
    #[must_use]
    pub fn at(location: Location) -> Self {
        Self {
            location,
            name: None,
        }
    }

    /// Overrides the real argument name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the tagged location.
    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Returns the name override, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// One controller parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    nullable: bool,
    tag: Option<SourceTag>,
}

impl Parameter {
    /// Creates a required, untagged parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            tag: None,
        }
    }

    /// Marks the parameter as accepting null.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attaches a source tag.
    #[must_use]
    pub fn tagged(mut self, tag: SourceTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Returns the parameter name as declared on the controller.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if null is an acceptable value.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the source tag.
    #[must_use]
    pub fn tag(&self) -> Option<&SourceTag> {
        self.tag.as_ref()
    }

    /// Returns the real argument name, or `None` for untagged parameters.
    #[must_use]
    pub fn real_name(&self) -> Option<&str> {
        self.tag
            .as_ref()
            .map(|tag| tag.name().unwrap_or(&self.name))
    }
}

/// Ordered parameter list of a controller method.
///
/// # Example
///
/// ```
/// use sextant_core::{Parameter, Signature, SourceTag};
///
/// let signature = Signature::new()
///     .parameter(Parameter::new("id").tagged(SourceTag::path()))
///     .parameter(Parameter::new("tenant").tagged(SourceTag::header().named("x-tenant")))
///     .parameter(Parameter::new("logger"));
///
/// let mapping: Vec<_> = signature.argument_names().collect();
/// assert_eq!(mapping, vec![("id", "id"), ("tenant", "x-tenant")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    /// Creates an empty signature.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Returns the parameters in call order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Maps parameter names to real argument names, skipping untagged ones.
    pub fn argument_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters
            .iter()
            .filter_map(|p| p.real_name().map(|real| (p.name(), real)))
    }
}

/// Error raised for a controller callable that is not `Class::method`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid controller callable '{callable}', must be in the format Class::method")]
pub struct InvalidCallable {
    callable: String,
}

/// Identity of a controller method: its class and method names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerRef {
    class: String,
    method: String,
}

impl ControllerRef {
    /// Creates a reference from its parts.
    #[must_use]
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Parses a `Class::method` callable name.
    ///
    /// The class part may itself contain `::` path separators; the method is
    /// whatever follows the last one.
    pub fn parse(callable: &str) -> Result<Self, InvalidCallable> {
        match callable.rsplit_once("::") {
            Some((class, method)) if !class.is_empty() && !method.is_empty() => {
                Ok(Self::new(class, method))
            }
            _ => Err(InvalidCallable {
                callable: callable.to_string(),
            }),
        }
    }

    /// Returns the controller class.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Returns the method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class, self.method)
    }
}
