//! # Keryx Server
//!
//! Server dispatch engine for Keryx contracts.
//!
//! The same [`keryx_core::ContractDescriptor`] a client interprets as a stub
//! is interpreted here as an inbound dispatcher. At startup, [`RouteTable::bind`]
//! turns each routed operation into a [`BoundRoute`] carrying its path
//! template, dispatch table, and compiled authorization; per request,
//! [`handle`] runs the fixed pipeline: match, authorize, extract, invoke,
//! respond.
//!
//! The engine is transport-neutral: the embedding HTTP host converts its
//! native request into a [`ServerRequest`], resolves the caller into a
//! [`keryx_core::CallerIdentity`], and copies the resulting
//! [`ServerResponse`] back out.
//!
//! ```
//! use keryx_core::{
//!     BoxFuture, CallerIdentity, ContractDescriptor, FaultResult, OperationDescriptor,
//!     OperationDispatch, ParameterSpec, Verb,
//! };
//! use keryx_server::{handle, RouteTable, ServerRequest};
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! struct ItemsDispatch;
//!
//! impl OperationDispatch for ItemsDispatch {
//!     fn call(
//!         &self,
//!         operation: &str,
//!         args: Vec<Value>,
//!     ) -> BoxFuture<'static, FaultResult<Option<Value>>> {
//!         let operation = operation.to_string();
//!         Box::pin(async move {
//!             match operation.as_str() {
//!                 "GetItem" => Ok(Some(json!("hello"))),
//!                 _ => Ok(None),
//!             }
//!         })
//!     }
//! }
//!
//! # async fn example() -> FaultResult<()> {
//! let contract = ContractDescriptor::builder("Items")
//!     .anonymous()
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
//! let mut table = RouteTable::new();
//! table.bind(Arc::new(contract), Arc::new(ItemsDispatch))?;
//!
//! let request = ServerRequest::new(http::Method::GET, "/item/42");
//! let response = handle(&table, request, &CallerIdentity::Anonymous).await;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/keryx-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatch;
mod extract;
mod request;
mod response;
mod routes;

pub use dispatch::{dispatch, handle};
pub use extract::{decode_arg, decode_query_arg, extract_arguments};
pub use request::ServerRequest;
pub use response::{ServerResponse, APPLICATION_JSON};
pub use routes::{BoundRoute, RouteTable};
