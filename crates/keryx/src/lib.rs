//! # Keryx
//!
//! **A contract-binding engine: one service declaration, two interpretations.**
//!
//! A Keryx [`ContractDescriptor`](keryx_core::ContractDescriptor) names a
//! service's operations once - verb, path template, parameter bindings,
//! authorization annotations. The same declaration is then interpreted two
//! ways:
//!
//! - as an **HTTP client stub** (`keryx-client`): a method call becomes one
//!   outbound request, the response decodes into the declared payload
//! - as an **HTTP server dispatcher** (`keryx-server`): an inbound request is
//!   matched, authorized, extracted, and dispatched to the bound
//!   implementation
//!
//! Because both sides read the same descriptor, the wire contract cannot
//! drift between them. Faults travel as a uniform JSON envelope and surface
//! on the caller's side as the same [`Fault`](keryx_core::Fault) the
//! implementation raised.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keryx::prelude::*;
//! use std::sync::Arc;
//!
//! // Declare the contract once, at startup.
//! let contract = ContractDescriptor::builder("Items")
//!     .operation(
//!         OperationDescriptor::builder("GetItem")
//!             .verb(Verb::Get)
//!             .path("/item/{id}")
//!             .parameter(ParameterSpec::route("id"))
//!             .returns_value(true)
//!             .build(),
//!     )
//!     .build()?;
//!
//! // Server side: bind the implementation and dispatch requests.
//! let mut registry = ContractRegistry::new();
//! registry.register_bound(contract.clone(), Arc::new(ItemsDispatch::new(service)))?;
//! let mut routes = RouteTable::new();
//! routes.bind_registry(&registry)?;
//!
//! // Client side: the same declaration drives outbound calls.
//! let transport = Arc::new(HttpTransport::new("http://localhost:8080"));
//! let client = ContractClient::new(Arc::new(contract), transport);
//! let item: Option<Item> = client.invoke_as("GetItem", &[serde_json::json!("42")]).await?;
//! ```

#![doc(html_root_url = "https://docs.rs/keryx/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the contract model and fault taxonomy
pub use keryx_core as core;

// Re-export the client invocation engine
pub use keryx_client as client;

// Re-export the server dispatch engine
pub use keryx_server as server;

// Re-export authorization compilation and evaluation
pub use keryx_authz as authz;

// Re-export OpenAPI generation
pub use keryx_docs as docs;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use keryx::prelude::*;
/// ```
pub mod prelude {
    pub use keryx_core::{
        AuthorizeSpec, BindingKind, BoxFuture, CallerIdentity, ContractDescriptor,
        ContractRegistry, Envelope, Fault, FaultKind, FaultResult, OperationDescriptor,
        OperationDispatch, ParameterSpec, Params, PathTemplate, UserIdentity, Verb,
    };

    // Client engine
    pub use keryx_client::{ContractClient, HttpTransport, Transport, TransportResponse};

    // Server engine
    pub use keryx_server::{
        decode_arg, decode_query_arg, handle, RouteTable, ServerRequest, ServerResponse,
    };

    // Authorization
    pub use keryx_authz::{compile, evaluate, CompiledAuthorization, Requirement};

    // Documentation
    pub use keryx_docs::DocumentGenerator;
}
