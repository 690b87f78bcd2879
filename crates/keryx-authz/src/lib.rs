//! # Keryx Authz
//!
//! Authorization policy compilation and evaluation for Keryx contracts.
//!
//! Contract- and operation-scope [`keryx_core::AuthorizeSpec`] annotations
//! are compiled once at route-registration time ([`compile`]) and evaluated
//! per request ([`evaluate`]).
//!
//! The merge semantics follow the source declarations exactly: "allow
//! anonymous" at either scope overrides everything, and stacked annotations
//! are conjunctive (all must pass). If alternative-policy (OR) semantics are
//! ever needed, that is a different compilation, not a flag on this one.

#![doc(html_root_url = "https://docs.rs/keryx-authz/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod evaluator;
mod policy;

pub use evaluator::evaluate;
pub use policy::{compile, split_roles, CompiledAuthorization, Requirement, POLICY_CLAIM_KEY};
