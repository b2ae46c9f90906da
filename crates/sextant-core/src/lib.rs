//! # Sextant Core
//!
//! Shared data model for the Sextant request pipeline.
//!
//! - [`Specification`] / [`OperationDescription`] / [`Argument`] - what an API
//!   description says about each controller method
//! - [`Definitions`] - named types that body schemas refer to
//! - [`Signature`] / [`Parameter`] / [`SourceTag`] - controller parameters and
//!   where their values come from
//! - [`PathAttributes`] - route-matched path segments
//! - [`HttpError`] / [`ErrorBody`] - status-carrying errors and their JSON body

#![doc(html_root_url = "https://docs.rs/sextant-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod definitions;
mod error;
mod operation;
mod params;
mod signature;

pub use definitions::{Definitions, TypeDefinition};
pub use error::{ErrorBody, HttpError, HttpResult};
pub use operation::{
    Argument, ArgumentSchema, ContentType, DescriptionError, Format, Location,
    OperationDescription, OperationDescriptionBuilder, PropertyType, Specification,
};
pub use params::PathAttributes;
pub use signature::{ControllerRef, InvalidCallable, Parameter, Signature, SourceTag};
