//! # Keryx Core
//!
//! Core types for the Keryx contract-binding engine.
//!
//! One service-interface declaration — a [`ContractDescriptor`] with its
//! [`OperationDescriptor`]s — is interpreted two ways: as an HTTP client stub
//! (`keryx-client`) and as an HTTP server dispatcher (`keryx-server`). This
//! crate holds the shared source of truth:
//!
//! - [`ContractDescriptor`] / [`OperationDescriptor`] - immutable per-contract metadata
//! - [`PathTemplate`] - `{name}` placeholder route strings
//! - [`BindingKind`] / [`ParameterSpec`] - parameter classification
//! - [`Fault`] / [`Envelope`] - fault taxonomy and wire envelope
//! - [`ContractRegistry`] - explicit startup-time composition root
//! - [`CallerIdentity`] - the evaluated caller shape for authorization

#![doc(html_root_url = "https://docs.rs/keryx-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod binding;
pub mod casing;
mod fault;
mod identity;
mod operation;
mod registry;
mod template;

pub use binding::{BindingKind, ParameterSpec};
pub use fault::{Envelope, Fault, FaultKind, FaultResult};
pub use identity::{CallerIdentity, UserIdentity};
pub use operation::{
    AuthorizeSpec, ContractBuilder, ContractDescriptor, OperationBuilder, OperationDescriptor, Verb,
};
pub use registry::{BoxFuture, ContractRegistration, ContractRegistry, OperationDispatch};
pub use template::{Params, PathTemplate};
