//! The route a request was matched to.

/// What a matched route dispatches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    /// A controller method, by callable name (`Class::method`).
    Controller(String),
    /// The host's built-in error-rendering controller.
    ErrorRenderer,
}

/// A route as handed over by the host router.
///
/// ```
/// use sextant::MatchedRoute;
///
/// let route = MatchedRoute::controller("UserController::show");
/// assert_eq!(route.callable(), Some("UserController::show"));
/// assert!(!route.is_error_renderer());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute {
    target: RouteTarget,
}

impl MatchedRoute {
    /// A route to a controller method.
    #[must_use]
    pub fn controller(callable: impl Into<String>) -> Self {
        Self {
            target: RouteTarget::Controller(callable.into()),
        }
    }

    /// A route to the error-rendering controller.
    #[must_use]
    pub fn error_renderer() -> Self {
        Self {
            target: RouteTarget::ErrorRenderer,
        }
    }

    /// Returns the target.
    #[must_use]
    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    /// Returns the controller callable name, if any.
    #[must_use]
    pub fn callable(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::Controller(callable) => Some(callable),
            RouteTarget::ErrorRenderer => None,
        }
    }

    /// Whether this route renders errors.
    #[must_use]
    pub fn is_error_renderer(&self) -> bool {
        self.target == RouteTarget::ErrorRenderer
    }
}
