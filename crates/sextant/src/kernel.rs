//! One request through stage, controller and error mapper.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http::Response;
use sextant_config::SextantConfig;
use sextant_extract::{ArgumentResolver, Arguments, BodyLimits, IncomingRequest};
use sextant_telemetry::{init_logging, TelemetryResult};

use crate::{ControllerArgumentsStage, ExceptionResponseMapper, MatchedRoute, OperationRegistry};

/// Drives a matched request.
///
/// The host router matches the route and buffers the request; the kernel
/// resolves the controller arguments, calls the controller, and maps any
/// [`HttpError`](sextant_core::HttpError) it raises (or that resolution
/// raises) to a JSON response. Other errors are returned unchanged.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use sextant::{Kernel, MatchedRoute, StaticRegistry};
/// use sextant_core::{
///     Argument, ControllerRef, OperationDescription, Parameter, PropertyType, Signature,
///     SourceTag, Specification,
/// };
/// use sextant_extract::{response::JsonResponse, IncomingRequest};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> anyhow::Result<()> {
/// let specification = Specification::new().with_operation(
///     OperationDescription::builder("Users.show")
///         .argument("id", Argument::path(PropertyType::Integer))
///         .build(),
/// );
/// let registry = StaticRegistry::new().api("Users", specification).controller(
///     ControllerRef::new("Users", "show"),
///     Signature::new().parameter(Parameter::new("id").tagged(SourceTag::path())),
/// );
///
/// let kernel = Kernel::new(Arc::new(registry));
/// let request = IncomingRequest::builder().path_attribute("id", "42").build();
///
/// let response = kernel
///     .handle(&MatchedRoute::controller("Users::show"), &request, |args| async move {
///         let id = args.get("id").and_then(|v| v.as_i64());
///         JsonResponse::new(id).into_response().map_err(anyhow::Error::from)
///     })
///     .await?;
///
/// assert_eq!(&response.body()[..], b"42");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Kernel {
    stage: ControllerArgumentsStage,
    mapper: ExceptionResponseMapper,
}

impl Kernel {
    /// Creates a kernel with default body limits.
    #[must_use]
    pub fn new(registry: Arc<dyn OperationRegistry>) -> Self {
        Self {
            stage: ControllerArgumentsStage::new(registry),
            mapper: ExceptionResponseMapper::new(),
        }
    }

    /// Creates a kernel whose body limits come from configuration.
    #[must_use]
    pub fn from_config(registry: Arc<dyn OperationRegistry>, config: &SextantConfig) -> Self {
        Self::new(registry).with_limits(config.extract_limits())
    }

    /// Installs the configured global log subscriber, then builds the kernel
    /// with [`from_config`](Self::from_config).
    ///
    /// Call once per process.
    ///
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use sextant::{config::ConfigLoader, Kernel, StaticRegistry};
    ///
    /// let config = ConfigLoader::new()
    ///     .with_defaults()
    ///     .with_optional_file("sextant.toml")?
    ///     .with_env_prefix("SEXTANT")
    ///     .load()?;
    /// let kernel = Kernel::bootstrap(Arc::new(StaticRegistry::new()), &config)?;
    /// # let _ = kernel;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the telemetry error when the filter directive is invalid or a
    /// global subscriber is already installed.
    pub fn bootstrap(
        registry: Arc<dyn OperationRegistry>,
        config: &SextantConfig,
    ) -> TelemetryResult<Self> {
        init_logging(&config.logging.to_log_config())?;
        Ok(Self::from_config(registry, config))
    }

    /// Replaces the body limits, keeping the schema validator.
    #[must_use]
    pub fn with_limits(self, limits: BodyLimits) -> Self {
        let decoder = self.stage.resolver().decoder().clone().with_limits(limits);
        self.with_resolver(ArgumentResolver::new(decoder))
    }

    /// Replaces the argument resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: ArgumentResolver) -> Self {
        self.stage = self.stage.with_resolver(resolver);
        self
    }

    /// Returns the controller-arguments stage.
    #[must_use]
    pub fn stage(&self) -> &ControllerArgumentsStage {
        &self.stage
    }

    /// Handles one request.
    ///
    /// The error-rendering route gets empty arguments and its errors are
    /// never mapped.
    ///
    /// # Errors
    ///
    /// Returns any error that is not an `HttpError`, including wiring
    /// errors from the stage.
    pub async fn handle<F, Fut>(
        &self,
        route: &MatchedRoute,
        request: &IncomingRequest,
        controller: F,
    ) -> anyhow::Result<Response<Bytes>>
    where
        F: FnOnce(Arguments) -> Fut,
        Fut: Future<Output = anyhow::Result<Response<Bytes>>>,
    {
        let arguments = match self.stage.on_controller_arguments(route, request).await {
            Ok(arguments) => arguments.unwrap_or_default(),
            Err(err) => return self.recover(route, err.into_anyhow()),
        };

        match controller(arguments).await {
            Ok(response) => Ok(response),
            Err(err) => self.recover(route, err),
        }
    }

    fn recover(&self, route: &MatchedRoute, err: anyhow::Error) -> anyhow::Result<Response<Bytes>> {
        match self.mapper.on_exception(route, &err) {
            Some(response) => Ok(response),
            None => Err(err),
        }
    }
}
