//! Contract registry and dispatch-table trait.
//!
//! The registry is the explicit composition root: contracts and their bound
//! implementations are registered once at process startup, in place of any
//! global type scanning. Registration is deterministic and side-effect-free;
//! the resulting set is immutable and safe for unsynchronized concurrent
//! reads.
//!
//! Read-only consumers (documentation generation) may register a descriptor
//! without an implementation. Consumers that need to invoke the contract
//! (route binding, dispatch) use [`ContractRegistry::bound`], which fails
//! with a `Conflict` fault when no implementation was bound.

use crate::fault::{Fault, FaultResult};
use crate::operation::ContractDescriptor;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future, used to keep the dispatch trait object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The typed dispatch table bound to one contract implementation.
///
/// Implementations map an operation name to an invocation closure over the
/// live service instance; the table is hand-written (or generated) per
/// contract and built once at registration time. Arguments arrive as JSON
/// values in declared parameter order; the result is the operation's payload,
/// or `None` for bare completion.
pub trait OperationDispatch: Send + Sync {
    /// Invokes the named operation with extracted arguments.
    fn call(&self, operation: &str, args: Vec<Value>)
        -> BoxFuture<'static, FaultResult<Option<Value>>>;
}

impl std::fmt::Debug for dyn OperationDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OperationDispatch")
    }
}

/// One registered contract, with or without a bound implementation.
#[derive(Clone)]
pub struct ContractRegistration {
    descriptor: Arc<ContractDescriptor>,
    dispatch: Option<Arc<dyn OperationDispatch>>,
}

impl ContractRegistration {
    /// Returns the contract descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<ContractDescriptor> {
        &self.descriptor
    }

    /// Returns the bound dispatch table, if an implementation was registered.
    #[must_use]
    pub fn dispatch(&self) -> Option<&Arc<dyn OperationDispatch>> {
        self.dispatch.as_ref()
    }
}

impl std::fmt::Debug for ContractRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractRegistration")
            .field("contract", &self.descriptor.name())
            .field("bound", &self.dispatch.is_some())
            .finish()
    }
}

/// Startup-time registry of contracts and bound implementations.
#[derive(Default)]
pub struct ContractRegistry {
    entries: Vec<ContractRegistration>,
    index: HashMap<String, usize>,
}

impl ContractRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a contract descriptor without an implementation.
    ///
    /// Sufficient for read-only consumers; dispatch consumers will fail on
    /// [`Self::bound`] until an implementation is registered instead.
    pub fn register(&mut self, descriptor: ContractDescriptor) -> FaultResult<()> {
        self.insert(descriptor, None)
    }

    /// Registers a contract descriptor together with its dispatch table.
    pub fn register_bound(
        &mut self,
        descriptor: ContractDescriptor,
        dispatch: Arc<dyn OperationDispatch>,
    ) -> FaultResult<()> {
        self.insert(descriptor, Some(dispatch))
    }

    fn insert(
        &mut self,
        descriptor: ContractDescriptor,
        dispatch: Option<Arc<dyn OperationDispatch>>,
    ) -> FaultResult<()> {
        if self.index.contains_key(descriptor.name()) {
            return Err(Fault::conflict(format!(
                "contract '{}' is already registered",
                descriptor.name()
            )));
        }
        self.index
            .insert(descriptor.name().to_string(), self.entries.len());
        self.entries.push(ContractRegistration {
            descriptor: Arc::new(descriptor),
            dispatch,
        });
        Ok(())
    }

    /// Iterates registrations in registration order.
    pub fn contracts(&self) -> impl Iterator<Item = &ContractRegistration> {
        self.entries.iter()
    }

    /// Looks up a descriptor by contract name.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&Arc<ContractDescriptor>> {
        self.index.get(name).map(|&i| &self.entries[i].descriptor)
    }

    /// Looks up a contract that must have a bound implementation.
    ///
    /// A registered contract without an implementation is a configuration
    /// defect for any caller that needs to invoke it.
    pub fn bound(
        &self,
        name: &str,
    ) -> FaultResult<(&Arc<ContractDescriptor>, &Arc<dyn OperationDispatch>)> {
        let entry = self
            .index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| Fault::conflict(format!("contract '{name}' is not registered")))?;
        let dispatch = entry.dispatch.as_ref().ok_or_else(|| {
            Fault::conflict(format!("contract '{name}' has no bound implementation"))
        })?;
        Ok((&entry.descriptor, dispatch))
    }

    /// Returns the number of registered contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractRegistry")
            .field("entries", &self.entries)
            .finish()
    }
}
