//! # Keryx Docs
//!
//! OpenAPI 3.1 document generation for Keryx contracts.
//!
//! [`DocumentGenerator`] derives the published API surface from the same
//! [`keryx_core::ContractRegistry`] the dispatch engine binds, so the
//! documentation and the dispatchable routes share one source of truth.

#![doc(html_root_url = "https://docs.rs/keryx-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod generator;
pub mod openapi;

pub use generator::DocumentGenerator;
pub use openapi::OpenApi;
