//! Route-table construction.
//!
//! Binding walks a contract's operations once at startup and produces one
//! route per routed operation, carrying the parsed path template, the bound
//! dispatch table, and the compiled authorization. Binding is deterministic
//! and fails fast on configuration defects; the resulting table is immutable
//! and safe for unsynchronized concurrent matching.

use http::Method;
use keryx_authz::CompiledAuthorization;
use keryx_core::{
    ContractDescriptor, ContractRegistry, Fault, FaultResult, OperationDescriptor,
    OperationDispatch, Params, PathTemplate, Verb,
};
use std::sync::Arc;
use tracing::debug;

/// One bound route: a routed operation attached to its implementation.
#[derive(Clone)]
pub struct BoundRoute {
    name: String,
    verb: Verb,
    template: PathTemplate,
    contract: Arc<ContractDescriptor>,
    operation: usize,
    dispatch: Arc<dyn OperationDispatch>,
    authorization: CompiledAuthorization,
}

impl BoundRoute {
    /// Returns the route name, `{contract}.{operation}`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the HTTP verb.
    #[must_use]
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Returns the path template.
    #[must_use]
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Returns the owning contract descriptor.
    #[must_use]
    pub fn contract(&self) -> &Arc<ContractDescriptor> {
        &self.contract
    }

    /// Returns the operation descriptor behind this route.
    #[must_use]
    pub fn operation(&self) -> &OperationDescriptor {
        &self.contract.operations()[self.operation]
    }

    /// Returns the bound dispatch table.
    #[must_use]
    pub fn dispatch(&self) -> &Arc<dyn OperationDispatch> {
        &self.dispatch
    }

    /// Returns the compiled authorization for this route.
    #[must_use]
    pub fn authorization(&self) -> &CompiledAuthorization {
        &self.authorization
    }
}

impl std::fmt::Debug for BoundRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundRoute")
            .field("name", &self.name)
            .field("verb", &self.verb)
            .field("template", &self.template.as_str())
            .finish()
    }
}

/// The dispatch engine's registration product.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<BoundRoute>,
}

impl RouteTable {
    /// Creates an empty route table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds every routed operation of one contract.
    ///
    /// Operations without routing metadata are skipped: server-side, an
    /// unrouted operation is simply unreachable over HTTP. An operation
    /// declaring an unsupported verb, or colliding with an already-bound
    /// `(verb, template)` pair, is a configuration defect and fails the
    /// whole startup.
    pub fn bind(
        &mut self,
        descriptor: Arc<ContractDescriptor>,
        dispatch: Arc<dyn OperationDispatch>,
    ) -> FaultResult<()> {
        for (index, operation) in descriptor.operations().iter().enumerate() {
            let Some(template) = operation.path() else {
                continue;
            };
            let name = descriptor.route_name(operation);

            if !operation.verb().is_supported() {
                return Err(Fault::conflict(format!(
                    "operation '{name}' uses HTTP method {} which is not supported",
                    operation.verb()
                )));
            }

            if let Some(existing) = self.find_collision(operation.verb(), template) {
                return Err(Fault::conflict(format!(
                    "operation '{name}' collides with '{existing}' on {} {}",
                    operation.verb(),
                    template.as_str()
                )));
            }

            debug!(route = %name, verb = %operation.verb(), path = %template.as_str(), "binding route");
            self.routes.push(BoundRoute {
                name,
                verb: operation.verb(),
                template: template.clone(),
                contract: Arc::clone(&descriptor),
                operation: index,
                dispatch: Arc::clone(&dispatch),
                authorization: keryx_authz::compile(&descriptor, operation),
            });
        }
        Ok(())
    }

    /// Binds every contract in a registry.
    ///
    /// Every registered contract must carry a bound implementation; a
    /// descriptor-only registration is a configuration defect here.
    pub fn bind_registry(&mut self, registry: &ContractRegistry) -> FaultResult<()> {
        for registration in registry.contracts() {
            let descriptor = registration.descriptor();
            let dispatch = registration.dispatch().ok_or_else(|| {
                Fault::conflict(format!(
                    "contract '{}' has no bound implementation",
                    descriptor.name()
                ))
            })?;
            self.bind(Arc::clone(descriptor), Arc::clone(dispatch))?;
        }
        Ok(())
    }

    /// Matches a request method and path to a bound route.
    ///
    /// Routes are tried in binding order; the first template match wins.
    /// PATCH can never match because binding rejects it.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<(&BoundRoute, Params)> {
        self.routes
            .iter()
            .filter(|route| route.verb.to_method() == *method)
            .find_map(|route| route.template.match_path(path).map(|params| (route, params)))
    }

    /// Returns the bound routes in binding order.
    #[must_use]
    pub fn routes(&self) -> &[BoundRoute] {
        &self.routes
    }

    fn find_collision(&self, verb: Verb, template: &PathTemplate) -> Option<&str> {
        self.routes
            .iter()
            .find(|route| route.verb == verb && route.template.as_str() == template.as_str())
            .map(|route| route.name.as_str())
    }
}
