//! Lookup of API descriptions and controller signatures.
//!
//! The host builds this information once (from attributes, a schema file,
//! or code) and the controller-arguments stage only reads it.

use std::collections::HashMap;
use std::sync::Arc;

use sextant_core::{ControllerRef, Signature, Specification};

/// Source of operation metadata for controllers.
pub trait OperationRegistry: Send + Sync {
    /// Returns the API description that covers a controller class.
    fn specification(&self, class: &str) -> Option<Arc<Specification>>;

    /// Returns the operation ID of a controller method.
    fn operation_id(&self, controller: &ControllerRef) -> String;

    /// Returns the call signature of a controller method.
    fn signature(&self, controller: &ControllerRef) -> Option<Signature>;
}

/// In-memory registry.
///
/// Operation IDs not registered explicitly default to
/// `{ShortClassName}.{method}`, where the short class name is the last
/// `::` or `\` separated segment.
///
/// # Example
///
/// ```
/// use sextant::{OperationRegistry, StaticRegistry};
/// use sextant_core::{ControllerRef, Signature, Specification};
///
/// let show = ControllerRef::new("app::Users", "show");
/// let registry = StaticRegistry::new()
///     .api("app::Users", Specification::new())
///     .controller(show.clone(), Signature::new());
///
/// assert_eq!(registry.operation_id(&show), "Users.show");
/// assert!(registry.specification("app::Users").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    apis: HashMap<String, Arc<Specification>>,
    operation_ids: HashMap<ControllerRef, String>,
    signatures: HashMap<ControllerRef, Signature>,
}

impl StaticRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the API description for a controller class.
    #[must_use]
    pub fn api(mut self, class: impl Into<String>, specification: Specification) -> Self {
        self.apis.insert(class.into(), Arc::new(specification));
        self
    }

    /// Registers a controller method with the default operation ID.
    #[must_use]
    pub fn controller(mut self, controller: ControllerRef, signature: Signature) -> Self {
        self.signatures.insert(controller, signature);
        self
    }

    /// Registers a controller method under an explicit operation ID.
    #[must_use]
    pub fn operation(
        mut self,
        controller: ControllerRef,
        operation_id: impl Into<String>,
        signature: Signature,
    ) -> Self {
        self.operation_ids
            .insert(controller.clone(), operation_id.into());
        self.signatures.insert(controller, signature);
        self
    }

    /// Number of registered controller methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether no controller method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl OperationRegistry for StaticRegistry {
    fn specification(&self, class: &str) -> Option<Arc<Specification>> {
        self.apis.get(class).cloned()
    }

    fn operation_id(&self, controller: &ControllerRef) -> String {
        if let Some(id) = self.operation_ids.get(controller) {
            return id.clone();
        }

        let class = controller.class();
        let short = class
            .rsplit(|c: char| c == ':' || c == '\\')
            .next()
            .unwrap_or(class);
        format!("{short}.{}", controller.method())
    }

    fn signature(&self, controller: &ControllerRef) -> Option<Signature> {
        self.signatures.get(controller).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_core::{Parameter, SourceTag};

    #[test]
    fn test_default_operation_id() {
        let registry = StaticRegistry::new();

        let cases = [
            (ControllerRef::new("Users", "show"), "Users.show"),
            (ControllerRef::new("app::http::Users", "list"), "Users.list"),
            (ControllerRef::new("App\\Controller\\Users", "create"), "Users.create"),
        ];
        for (controller, expected) in cases {
            assert_eq!(registry.operation_id(&controller), expected);
        }
    }

    #[test]
    fn test_explicit_operation_id() {
        let controller = ControllerRef::new("Users", "show");
        let registry = StaticRegistry::new().operation(controller.clone(), "getUser", Signature::new());

        assert_eq!(registry.operation_id(&controller), "getUser");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_signature_lookup() {
        let controller = ControllerRef::new("Users", "show");
        let signature = Signature::new().parameter(Parameter::new("id").tagged(SourceTag::path()));
        let registry = StaticRegistry::new().controller(controller.clone(), signature.clone());

        assert_eq!(registry.signature(&controller), Some(signature));
        assert_eq!(registry.signature(&ControllerRef::new("Users", "delete")), None);
        assert!(registry.specification("Users").is_none());
    }
}
