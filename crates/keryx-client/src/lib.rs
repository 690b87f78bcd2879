//! # Keryx Client
//!
//! Client invocation engine for Keryx contracts.
//!
//! A [`ContractClient`] interprets a [`keryx_core::ContractDescriptor`] as an
//! HTTP client stub: method calls become outbound requests, responses decode
//! into declared payloads. Per-contract stubs are hand-written (or generated)
//! adapters that delegate every method to [`ContractClient::invoke`] keyed by
//! operation name.
//!
//! ```no_run
//! use keryx_client::{ContractClient, HttpTransport};
//! use keryx_core::{ContractDescriptor, OperationDescriptor, ParameterSpec, Verb};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() -> keryx_core::FaultResult<()> {
//! let contract = Arc::new(
//!     ContractDescriptor::builder("Items")
//!         .operation(
//!             OperationDescriptor::builder("GetItem")
//!                 .verb(Verb::Get)
//!                 .path("/item/{id}")
//!                 .parameter(ParameterSpec::route("id"))
//!                 .returns_value(true)
//!                 .build(),
//!         )
//!         .build()?,
//! );
//!
//! let transport = Arc::new(HttpTransport::new("http://localhost:8080"));
//! let client = ContractClient::new(contract, transport);
//! let item: Option<String> = client.invoke_as("GetItem", &[json!("42")]).await?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/keryx-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod invoker;
mod transport;

pub use invoker::ContractClient;
pub use transport::{HttpTransport, Transport, TransportResponse};
