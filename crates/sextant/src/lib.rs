//! # Sextant
//!
//! Typed controller arguments from HTTP requests, driven by an API
//! description, and JSON error responses from status-carrying errors.
//!
//! ## Pipeline
//!
//! ```text
//! host router ─▶ MatchedRoute + IncomingRequest
//!                      │
//!                      ▼
//!      ControllerArgumentsStage ── OperationRegistry ─▶ OperationDescription, Signature
//!                      │
//!                      ▼
//!              ArgumentResolver ─▶ coerce / BodyDecoder / SchemaValidator
//!                      │
//!                      ▼
//!                 controller(Arguments)
//!                      │ Err(HttpError)
//!                      ▼
//!           ExceptionResponseMapper ─▶ {"success": false, "title", "message", "trace"}
//! ```
//!
//! [`Kernel`] runs the whole sequence for one request; the stage and the
//! mapper can also be called separately by hosts with their own dispatch.
//!
//! ## Crates
//!
//! - [`core`]: data model and [`HttpError`](sextant_core::HttpError)
//! - [`extract`]: coercion, body decoding and argument resolution
//! - [`config`]: layered configuration
//! - [`telemetry`]: logging setup

#![doc(html_root_url = "https://docs.rs/sextant/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod exception;
mod kernel;
mod registry;
mod route;
mod stage;

pub use sextant_config as config;
pub use sextant_core as core;
pub use sextant_extract as extract;
pub use sextant_telemetry as telemetry;

pub use exception::ExceptionResponseMapper;
pub use kernel::Kernel;
pub use registry::{OperationRegistry, StaticRegistry};
pub use route::{MatchedRoute, RouteTarget};
pub use stage::{ControllerArgumentsStage, StageError};

/// Prelude module for convenient imports.
///
/// ```
/// use sextant::prelude::*;
///
/// let err = HttpError::not_found("no such user");
/// assert_eq!(err.status(), http::StatusCode::NOT_FOUND);
/// ```
pub mod prelude {
    pub use crate::{
        ExceptionResponseMapper, Kernel, MatchedRoute, OperationRegistry, StaticRegistry,
    };
    pub use sextant_core::{
        Argument, ControllerRef, HttpError, OperationDescription, Parameter, PropertyType,
        Signature, SourceTag, Specification,
    };
    pub use sextant_extract::{ArgumentValue, Arguments, IncomingRequest, Payload};
}
