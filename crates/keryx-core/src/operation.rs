//! Contract and operation descriptors.
//!
//! A [`ContractDescriptor`] is the single source of truth for one service
//! interface: a named, ordered set of [`OperationDescriptor`]s built once at
//! startup and immutable thereafter. The client invocation engine and the
//! server dispatch engine both consume the same descriptor; they agree on the
//! wire format through it and nothing else.
//!
//! # Example
//!
//! ```
//! use keryx_core::{ContractDescriptor, OperationDescriptor, ParameterSpec, Verb};
//!
//! let contract = ContractDescriptor::builder("Items")
//!     .operation(
//!         OperationDescriptor::builder("GetItem")
//!             .verb(Verb::Get)
//!             .path("/item/{id}")
//!             .parameter(ParameterSpec::route("id"))
//!             .returns_value(true)
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(contract.operations().len(), 1);
//! assert_eq!(contract.route_name(contract.operation("GetItem").unwrap()), "Items.GetItem");
//! ```

use crate::binding::{BindingKind, ParameterSpec};
use crate::fault::{Fault, FaultResult};
use crate::template::PathTemplate;
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP verb for an operation.
///
/// `Patch` is recognized so that declarations carrying it are representable,
/// but it is unsupported everywhere: client invocation and server route
/// registration both fail fast on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    /// GET; no request payload.
    Get,
    /// POST; payload serialized as JSON.
    Post,
    /// PUT; payload serialized as JSON.
    Put,
    /// DELETE; no request payload.
    Delete,
    /// Recognized but unsupported; always fails at the point of use.
    Patch,
}

impl Verb {
    /// Returns the verb as its wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    /// Whether this verb carries a request payload.
    #[must_use]
    pub const fn has_payload(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    /// Whether this verb is supported by the engines.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Patch)
    }

    /// Converts to the `http` crate method type.
    #[must_use]
    pub fn to_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
            Self::Patch => Method::PATCH,
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw authorization annotation attached at contract or operation scope.
///
/// This is the declaration form; the policy compiler in `keryx-authz` turns
/// the concatenated annotations into evaluable requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeSpec {
    /// Required policy claim value, checked under the fixed `policy` claim key.
    pub policy: Option<String>,
    /// Comma-separated role list; the user must hold at least one.
    pub roles: Option<String>,
}

impl AuthorizeSpec {
    /// Requires only an authenticated user.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Requires an authenticated user carrying the given policy claim.
    #[must_use]
    pub fn policy(policy: impl Into<String>) -> Self {
        Self {
            policy: Some(policy.into()),
            roles: None,
        }
    }

    /// Requires an authenticated user holding at least one of the given
    /// comma-separated roles.
    #[must_use]
    pub fn roles(roles: impl Into<String>) -> Self {
        Self {
            policy: None,
            roles: Some(roles.into()),
        }
    }

    /// Requires both a policy claim and at least one of the roles.
    #[must_use]
    pub fn policy_and_roles(policy: impl Into<String>, roles: impl Into<String>) -> Self {
        Self {
            policy: Some(policy.into()),
            roles: Some(roles.into()),
        }
    }
}

/// Derived, immutable metadata for one contract operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDescriptor {
    name: String,
    verb: Verb,
    /// `None` means the operation carries no routing metadata. That is not an
    /// error here; the failure is deferred to first use so interfaces can mix
    /// routed and non-routed helper methods.
    path: Option<PathTemplate>,
    parameters: Vec<ParameterSpec>,
    returns_value: bool,
    anonymous: bool,
    authorize: Vec<AuthorizeSpec>,
    summary: Option<String>,
    description: Option<String>,
}

impl OperationDescriptor {
    /// Creates a new operation builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> OperationBuilder {
        OperationBuilder::new(name)
    }

    /// Returns the operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the HTTP verb.
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Returns the path template, if the operation is routed.
    #[must_use]
    pub fn path(&self) -> Option<&PathTemplate> {
        self.path.as_ref()
    }

    /// Returns the ordered parameter specifications.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Whether the asynchronous result carries a payload.
    #[must_use]
    pub fn returns_value(&self) -> bool {
        self.returns_value
    }

    /// Whether access requires no authentication.
    #[must_use]
    pub fn anonymous(&self) -> bool {
        self.anonymous
    }

    /// Returns the operation-scope authorization annotations.
    #[must_use]
    pub fn authorize(&self) -> &[AuthorizeSpec] {
        &self.authorize
    }

    /// Returns the documentation summary, if set.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns the documentation description, if set.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the first body-bound parameter's position, if any.
    ///
    /// More than one body parameter is a declaration defect; the first one
    /// wins, and tests are expected to flag the extras.
    #[must_use]
    pub fn body_parameter(&self) -> Option<usize> {
        self.parameters
            .iter()
            .position(|p| p.kind == BindingKind::Body)
    }
}

/// Builder for [`OperationDescriptor`].
#[derive(Debug)]
pub struct OperationBuilder {
    name: String,
    verb: Verb,
    path: Option<PathTemplate>,
    parameters: Vec<ParameterSpec>,
    returns_value: bool,
    anonymous: bool,
    authorize: Vec<AuthorizeSpec>,
    summary: Option<String>,
    description: Option<String>,
}

impl OperationBuilder {
    /// Creates a new builder for the named operation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verb: Verb::Get,
            path: None,
            parameters: Vec::new(),
            returns_value: false,
            anonymous: false,
            authorize: Vec::new(),
            summary: None,
            description: None,
        }
    }

    /// Sets the HTTP verb.
    #[must_use]
    pub fn verb(mut self, verb: Verb) -> Self {
        self.verb = verb;
        self
    }

    /// Sets the path template.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(PathTemplate::new(path));
        self
    }

    /// Appends a parameter specification. Order matters.
    #[must_use]
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Declares whether the result carries a payload.
    #[must_use]
    pub fn returns_value(mut self, returns_value: bool) -> Self {
        self.returns_value = returns_value;
        self
    }

    /// Allows anonymous access, overriding every authorization annotation.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Appends an operation-scope authorization annotation.
    #[must_use]
    pub fn authorize(mut self, spec: AuthorizeSpec) -> Self {
        self.authorize.push(spec);
        self
    }

    /// Sets the documentation summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the documentation description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builds the descriptor.
    #[must_use]
    pub fn build(self) -> OperationDescriptor {
        OperationDescriptor {
            name: self.name,
            verb: self.verb,
            path: self.path,
            parameters: self.parameters,
            returns_value: self.returns_value,
            anonymous: self.anonymous,
            authorize: self.authorize,
            summary: self.summary,
            description: self.description,
        }
    }
}

/// A named set of operation descriptors for one service interface.
///
/// Serialize-only: descriptors are constructed through the builder (which
/// maintains the operation name index), never parsed back from JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ContractDescriptor {
    name: String,
    anonymous: bool,
    authorize: Vec<AuthorizeSpec>,
    operations: Vec<OperationDescriptor>,
    #[serde(skip)]
    operation_index: HashMap<String, usize>,
}

impl ContractDescriptor {
    /// Creates a new contract builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder::new(name)
    }

    /// Returns the contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the whole contract allows anonymous access.
    #[must_use]
    pub fn anonymous(&self) -> bool {
        self.anonymous
    }

    /// Returns the contract-scope authorization annotations.
    #[must_use]
    pub fn authorize(&self) -> &[AuthorizeSpec] {
        &self.authorize
    }

    /// Returns all operations in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    /// Looks up an operation by name.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operation_index
            .get(name)
            .map(|&idx| &self.operations[idx])
    }

    /// Returns the deterministic route name for an operation.
    #[must_use]
    pub fn route_name(&self, operation: &OperationDescriptor) -> String {
        format!("{}.{}", self.name, operation.name())
    }

    fn rebuild_index(&mut self) {
        self.operation_index.clear();
        for (idx, op) in self.operations.iter().enumerate() {
            self.operation_index.insert(op.name.clone(), idx);
        }
    }
}

/// Builder for [`ContractDescriptor`].
#[derive(Debug)]
pub struct ContractBuilder {
    name: String,
    anonymous: bool,
    authorize: Vec<AuthorizeSpec>,
    operations: Vec<OperationDescriptor>,
}

impl ContractBuilder {
    /// Creates a new builder for the named contract.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anonymous: false,
            authorize: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Allows anonymous access for every operation on the contract.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Appends a contract-scope authorization annotation.
    #[must_use]
    pub fn authorize(mut self, spec: AuthorizeSpec) -> Self {
        self.authorize.push(spec);
        self
    }

    /// Appends an operation.
    #[must_use]
    pub fn operation(mut self, operation: OperationDescriptor) -> Self {
        self.operations.push(operation);
        self
    }

    /// Appends multiple operations.
    #[must_use]
    pub fn operations(mut self, operations: impl IntoIterator<Item = OperationDescriptor>) -> Self {
        self.operations.extend(operations);
        self
    }

    /// Builds the contract descriptor.
    ///
    /// Duplicate operation names are a configuration defect and fail with a
    /// `Conflict` fault here rather than at first dispatch.
    pub fn build(self) -> FaultResult<ContractDescriptor> {
        let mut seen = HashMap::new();
        for op in &self.operations {
            if seen.insert(op.name.clone(), ()).is_some() {
                return Err(Fault::conflict(format!(
                    "contract '{}' declares operation '{}' more than once",
                    self.name, op.name
                )));
            }
        }
        let mut contract = ContractDescriptor {
            name: self.name,
            anonymous: self.anonymous,
            authorize: self.authorize,
            operations: self.operations,
            operation_index: HashMap::new(),
        };
        contract.rebuild_index();
        Ok(contract)
    }
}
