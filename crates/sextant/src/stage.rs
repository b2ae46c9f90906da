//! The controller-arguments stage.
//!
//! Runs after routing and before the controller: finds the operation behind
//! the matched controller and resolves its arguments from the request.

use std::sync::Arc;

use sextant_core::{ControllerRef, HttpError, InvalidCallable};
use sextant_extract::{ArgumentResolver, Arguments, IncomingRequest, ResolveError};
use thiserror::Error;
use tracing::error;

use crate::{MatchedRoute, OperationRegistry};

/// Failure of the controller-arguments stage.
///
/// Only [`ResolveError::Extraction`] is the client's fault; every other
/// variant means the registry and the routes disagree.
#[derive(Debug, Error)]
pub enum StageError {
    /// Argument resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The route's callable is not `Class::method`.
    #[error(transparent)]
    InvalidController(#[from] InvalidCallable),

    /// No API description covers the controller class.
    #[error("no API description registered for controller '{controller}'")]
    UnknownApi {
        /// Controller method.
        controller: ControllerRef,
    },

    /// The API description has no operation with the controller's ID.
    #[error("API description has no operation '{operation_id}' for controller '{controller}'")]
    UnknownOperation {
        /// Controller method.
        controller: ControllerRef,
        /// Operation ID the registry produced.
        operation_id: String,
    },

    /// No signature is registered for the controller method.
    #[error("no signature registered for controller '{controller}'")]
    UnknownSignature {
        /// Controller method.
        controller: ControllerRef,
    },
}

impl StageError {
    /// Whether the error should be answered with a client error response.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Resolve(ResolveError::Extraction(_)))
    }

    /// Converts into the error type controllers return.
    ///
    /// Client errors become an [`HttpError`] so the error response mapper
    /// intercepts them; the rest stay as they are.
    #[must_use]
    pub fn into_anyhow(self) -> anyhow::Error {
        match self {
            Self::Resolve(ResolveError::Extraction(err)) => anyhow::Error::new(HttpError::from(err)),
            other => anyhow::Error::new(other),
        }
    }
}

/// Resolves controller arguments for matched routes.
#[derive(Clone)]
pub struct ControllerArgumentsStage {
    registry: Arc<dyn OperationRegistry>,
    resolver: ArgumentResolver,
}

impl std::fmt::Debug for ControllerArgumentsStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerArgumentsStage")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl ControllerArgumentsStage {
    /// Creates a stage over a registry with the default resolver.
    #[must_use]
    pub fn new(registry: Arc<dyn OperationRegistry>) -> Self {
        Self {
            registry,
            resolver: ArgumentResolver::default(),
        }
    }

    /// Replaces the argument resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: ArgumentResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Returns the argument resolver.
    #[must_use]
    pub fn resolver(&self) -> &ArgumentResolver {
        &self.resolver
    }

    /// Resolves the arguments for `route`.
    ///
    /// Returns `Ok(None)` for the error-rendering controller, which keeps
    /// whatever arguments the host gives it.
    ///
    /// # Errors
    ///
    /// See [`StageError`].
    pub async fn on_controller_arguments(
        &self,
        route: &MatchedRoute,
        request: &IncomingRequest,
    ) -> Result<Option<Arguments>, StageError> {
        let Some(callable) = route.callable() else {
            return Ok(None);
        };

        let controller = ControllerRef::parse(callable).map_err(|err| {
            error!(controller = callable, "Route does not name a Class::method controller");
            err
        })?;

        let Some(specification) = self.registry.specification(controller.class()) else {
            error!(controller = %controller, "No API description for controller");
            return Err(StageError::UnknownApi { controller });
        };

        let operation_id = self.registry.operation_id(&controller);
        let Some(operation) = specification.operation(&operation_id) else {
            error!(
                controller = %controller,
                operation_id = %operation_id,
                "API description has no such operation"
            );
            return Err(StageError::UnknownOperation {
                controller,
                operation_id,
            });
        };

        let Some(signature) = self.registry.signature(&controller) else {
            error!(controller = %controller, "No signature for controller");
            return Err(StageError::UnknownSignature { controller });
        };

        let arguments = self
            .resolver
            .resolve(operation, specification.definitions(), &signature, request)
            .await?;

        Ok(Some(arguments))
    }
}
