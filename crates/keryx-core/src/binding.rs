//! Parameter binding classification.
//!
//! Every operation parameter carries exactly one binding kind, derived once
//! at descriptor-construction time. Parameters with no binding annotation are
//! `Unbound` and are never transmitted.

use serde::{Deserialize, Serialize};

/// How an operation parameter maps onto the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// Scalar value substituted into a `{name}` path placeholder.
    Route,
    /// Value carried in the query string.
    Query,
    /// Value serialized wholesale as the request payload.
    Body,
    /// Not transmitted; the server passes the type's default.
    Unbound,
}

/// Declared metadata for one operation parameter.
///
/// A query-bound parameter is either a scalar bound directly under its own
/// name, or a composite whose fields each expand into independent query
/// entries (`composite = true`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name; for route parameters it must match a placeholder.
    pub name: String,
    /// Binding classification.
    pub kind: BindingKind,
    /// Whether a query-bound value expands field-by-field.
    #[serde(default)]
    pub composite: bool,
}

impl ParameterSpec {
    /// A route-bound scalar parameter.
    #[must_use]
    pub fn route(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: BindingKind::Route,
            composite: false,
        }
    }

    /// A query-bound scalar parameter, bound directly under its own name.
    #[must_use]
    pub fn query(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: BindingKind::Query,
            composite: false,
        }
    }

    /// A query-bound composite parameter whose fields expand into
    /// independent query entries.
    #[must_use]
    pub fn query_object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: BindingKind::Query,
            composite: true,
        }
    }

    /// A body-bound parameter serialized as the request payload.
    #[must_use]
    pub fn body(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: BindingKind::Body,
            composite: false,
        }
    }

    /// An unbound parameter, never transmitted.
    #[must_use]
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: BindingKind::Unbound,
            composite: false,
        }
    }
}
