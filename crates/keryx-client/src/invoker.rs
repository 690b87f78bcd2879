//! Client invocation engine.
//!
//! [`ContractClient`] turns a named operation call with argument values into
//! exactly one outbound HTTP request, and decodes the response according to
//! the operation's declaration. Per-contract client stubs are thin adapters
//! over [`ContractClient::invoke`], one method per operation.

use crate::transport::Transport;
use keryx_core::casing::normalize_keys;
use keryx_core::{BindingKind, ContractDescriptor, Fault, FaultResult, OperationDescriptor};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A client bound to one contract descriptor and one transport.
///
/// Cheap to clone; safe for concurrent use. Each invocation is an
/// independent, stateless unit of work.
#[derive(Clone)]
pub struct ContractClient {
    contract: Arc<ContractDescriptor>,
    transport: Arc<dyn Transport>,
}

impl ContractClient {
    /// Creates a client for the given contract over the given transport.
    #[must_use]
    pub fn new(contract: Arc<ContractDescriptor>, transport: Arc<dyn Transport>) -> Self {
        Self {
            contract,
            transport,
        }
    }

    /// Returns the bound contract descriptor.
    #[must_use]
    pub fn contract(&self) -> &Arc<ContractDescriptor> {
        &self.contract
    }

    /// Invokes an operation by name with arguments in declared order.
    ///
    /// Returns the decoded response payload, or `None` when the operation is
    /// a bare completion signal (or the server sent an empty success body).
    ///
    /// Configuration defects fail before any network activity: an unknown
    /// operation name, a missing path template, an unsupported verb, or an
    /// unresolved path placeholder all surface as `Conflict` with zero
    /// outbound calls.
    pub async fn invoke(&self, operation: &str, args: &[Value]) -> FaultResult<Option<Value>> {
        let op = self.contract.operation(operation).ok_or_else(|| {
            Fault::conflict(format!(
                "contract '{}' has no operation '{operation}'",
                self.contract.name()
            ))
        })?;

        let route_name = self.contract.route_name(op);
        let template = op.path().ok_or_else(|| {
            Fault::conflict(format!("operation '{route_name}' is missing routing metadata"))
        })?;

        if !op.verb().is_supported() {
            return Err(Fault::conflict(format!(
                "operation '{route_name}' uses HTTP method {} which is not supported",
                op.verb()
            )));
        }

        if args.len() != op.parameters().len() {
            return Err(Fault::conflict(format!(
                "operation '{route_name}' expects {} arguments, got {}",
                op.parameters().len(),
                args.len()
            )));
        }

        let mut path = template.render(&route_arguments(op, args))?;

        let query = query_arguments(op, args)?;
        if !query.is_empty() {
            let encoded = serde_urlencoded::to_string(&query)
                .map_err(|e| Fault::internal_with_source("failed to encode query string", e))?;
            path.push('?');
            path.push_str(&encoded);
        }

        let payload = op
            .body_parameter()
            .filter(|_| op.verb().has_payload())
            .map(|idx| args[idx].clone());

        debug!(operation = %route_name, verb = %op.verb(), path = %path, "sending contract request");

        let response = self
            .transport
            .send(op.verb(), path, payload)
            .await?;

        if !response.status.is_success() {
            let body = String::from_utf8_lossy(&response.body);
            return Err(Fault::from_status(response.status, &body));
        }

        if !op.returns_value() || response.body.is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_slice(&response.body).map_err(|e| {
            Fault::internal_with_source(
                format!("operation '{route_name}' returned an undecodable payload"),
                e,
            )
        })?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(normalize_keys(value)))
    }

    /// Invokes an operation and decodes the payload into `T`.
    ///
    /// Field-name matching is case-insensitive: incoming keys are folded to
    /// `snake_case` before deserialization, so casing disagreements between
    /// the two sides never cause spurious failures.
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        operation: &str,
        args: &[Value],
    ) -> FaultResult<Option<T>> {
        match self.invoke(operation, args).await? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| Fault::internal_with_source("failed to decode response payload", e)),
        }
    }
}

impl std::fmt::Debug for ContractClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractClient")
            .field("contract", &self.contract.name())
            .finish()
    }
}

/// Collects route-bound arguments as (placeholder, string form) pairs.
fn route_arguments(op: &OperationDescriptor, args: &[Value]) -> Vec<(String, String)> {
    op.parameters()
        .iter()
        .zip(args)
        .filter(|(spec, _)| spec.kind == BindingKind::Route)
        .map(|(spec, value)| (spec.name.clone(), scalar_string(value)))
        .collect()
}

/// Builds the query pairs for all query-bound arguments.
///
/// Scalars bind directly under the parameter's own name. Composites expand
/// field-by-field, and a field holding the type's zero/default value is
/// omitted so defaults never clutter the wire or overwrite server-side
/// defaults.
fn query_arguments(op: &OperationDescriptor, args: &[Value]) -> FaultResult<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for (spec, value) in op.parameters().iter().zip(args) {
        if spec.kind != BindingKind::Query {
            continue;
        }
        if value.is_null() {
            continue;
        }
        if !spec.composite {
            pairs.push((spec.name.clone(), scalar_string(value)));
            continue;
        }
        let fields = value.as_object().ok_or_else(|| {
            Fault::conflict(format!(
                "composite query parameter '{}' must serialize to an object",
                spec.name
            ))
        })?;
        for (name, field) in fields {
            if is_default_value(field) {
                continue;
            }
            pairs.push((name.clone(), scalar_string(field)));
        }
    }
    Ok(pairs)
}

/// Whether a composite field holds its type's zero/default value.
///
/// Null, numeric zero, and `false` are defaults; strings (including the
/// empty string) always transmit.
fn is_default_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Renders a scalar value as its query/route string form.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keryx_core::{OperationDescriptor, ParameterSpec, Verb};
    use serde_json::json;

    fn op_with_query(spec: ParameterSpec) -> OperationDescriptor {
        OperationDescriptor::builder("List")
            .verb(Verb::Get)
            .path("/items")
            .parameter(spec)
            .build()
    }

    #[test]
    fn scalar_query_binds_under_own_name() {
        let op = op_with_query(ParameterSpec::query("page"));
        let pairs = query_arguments(&op, &[json!(3)]).expect("pairs");
        assert_eq!(pairs, vec![("page".to_string(), "3".to_string())]);
    }

    #[test]
    fn composite_default_fields_are_omitted() {
        let op = op_with_query(ParameterSpec::query_object("filter"));
        let pairs = query_arguments(
            &op,
            &[json!({"Page": 0, "Size": 25, "Archived": false, "Search": ""})],
        )
        .expect("pairs");
        // Page=0, Archived=false are type defaults; the empty string is not.
        assert_eq!(
            pairs,
            vec![
                ("Search".to_string(), String::new()),
                ("Size".to_string(), "25".to_string()),
            ]
        );
    }

    #[test]
    fn null_composite_is_skipped_entirely() {
        let op = op_with_query(ParameterSpec::query_object("filter"));
        let pairs = query_arguments(&op, &[Value::Null]).expect("pairs");
        assert!(pairs.is_empty());
    }

    #[test]
    fn non_object_composite_is_a_conflict() {
        let op = op_with_query(ParameterSpec::query_object("filter"));
        let err = query_arguments(&op, &[json!(42)]).expect_err("must fail");
        assert_eq!(err.kind(), keryx_core::FaultKind::Conflict);
    }

    #[test]
    fn route_arguments_use_string_form() {
        let op = OperationDescriptor::builder("Get")
            .verb(Verb::Get)
            .path("/item/{id}")
            .parameter(ParameterSpec::route("id"))
            .build();
        let route = route_arguments(&op, &[json!(42)]);
        assert_eq!(route, vec![("id".to_string(), "42".to_string())]);
    }
}
