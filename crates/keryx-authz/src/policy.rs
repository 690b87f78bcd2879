//! Authorization policy compilation.
//!
//! Contract- and operation-scope [`AuthorizeSpec`] annotations are compiled
//! once, at route-registration time, into a [`CompiledAuthorization`] that the
//! dispatcher evaluates per request.
//!
//! Merge rules:
//!
//! - "allow anonymous" declared at either scope wins unconditionally, no
//!   matter what other annotations are present at either scope.
//! - Otherwise contract-scope annotations are concatenated before
//!   operation-scope ones, order preserved, and each becomes one independent
//!   [`Requirement`]. All requirements must pass (conjunctive). Within one
//!   requirement the role list is any-of.
//! - An empty concatenation compiles to an empty requirement list, which
//!   falls through to whatever default policy the host applies.

use keryx_core::{AuthorizeSpec, ContractDescriptor, OperationDescriptor};
use serde::{Deserialize, Serialize};

/// The claim key checked when a requirement names a policy claim.
pub const POLICY_CLAIM_KEY: &str = "policy";

/// The compiled authorization attached to one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompiledAuthorization {
    /// Anonymous access; no requirement is evaluated.
    Anonymous,
    /// All listed requirements must pass. An empty list defers to the
    /// host's default policy (allowed here).
    Requirements(Vec<Requirement>),
}

impl CompiledAuthorization {
    /// Whether this compilation lets unauthenticated callers through.
    #[must_use]
    pub fn allows_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// One independent, evaluable authorization requirement.
///
/// Every requirement implies "the caller must be authenticated".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Required value of the caller's `policy` claim, if any.
    pub policy_claim: Option<String>,
    /// Roles of which the caller must hold at least one; empty means no
    /// role constraint.
    pub roles: Vec<String>,
}

/// Compiles the authorization annotations for one operation.
#[must_use]
pub fn compile(
    contract: &ContractDescriptor,
    operation: &OperationDescriptor,
) -> CompiledAuthorization {
    if contract.anonymous() || operation.anonymous() {
        return CompiledAuthorization::Anonymous;
    }

    let requirements = contract
        .authorize()
        .iter()
        .chain(operation.authorize())
        .map(to_requirement)
        .collect();
    CompiledAuthorization::Requirements(requirements)
}

fn to_requirement(spec: &AuthorizeSpec) -> Requirement {
    Requirement {
        policy_claim: spec
            .policy
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(ToString::to_string),
        roles: spec
            .roles
            .as_deref()
            .map(split_roles)
            .unwrap_or_default(),
    }
}

/// Splits a comma-separated role list, trimming entries and discarding
/// empty ones.
#[must_use]
pub fn split_roles(roles: &str) -> Vec<String> {
    roles
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
        .collect()
}
