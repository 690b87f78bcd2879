//! Per-request dispatch.
//!
//! One request flows through a fixed pipeline: match, authorize, extract,
//! invoke, respond. Every failure funnels through a single catch point that
//! writes the uniform fault envelope, so a contract implementation never has
//! to know what the wire shape of an error is.

use crate::extract::extract_arguments;
use crate::request::ServerRequest;
use crate::response::ServerResponse;
use crate::routes::{BoundRoute, RouteTable};
use keryx_core::{CallerIdentity, Fault, FaultKind, FaultResult};
use serde_json::Value;
use tracing::{debug, error};

/// Handles one request against a route table.
///
/// An unmatched method/path pair produces a `404` envelope; everything else
/// delegates to [`dispatch`] with the matched route parameters attached.
pub async fn handle(
    table: &RouteTable,
    request: ServerRequest,
    identity: &CallerIdentity,
) -> ServerResponse {
    let Some((route, params)) = table.match_route(request.method(), request.path()) else {
        let mut response = ServerResponse::new();
        response.write_fault(&Fault::not_found(format!(
            "no route matches {} {}",
            request.method(),
            request.path()
        )));
        return response;
    };
    dispatch(route, request.with_route_params(params), identity).await
}

/// Dispatches one matched request to its bound operation.
pub async fn dispatch(
    route: &BoundRoute,
    request: ServerRequest,
    identity: &CallerIdentity,
) -> ServerResponse {
    let mut response = ServerResponse::new();
    match run(route, &request, identity).await {
        Ok(Some(payload)) => {
            if response.write_json(&payload).is_err() {
                // Unreachable with a fresh response; keep the catch total.
                response.write_fault(&Fault::of_kind(FaultKind::Internal));
            }
        }
        Ok(None) => {
            let _ = response.write_no_content();
        }
        Err(fault) => {
            if fault.kind() == FaultKind::Internal {
                error!(
                    route = %route.name(),
                    caller = %identity.log_id(),
                    fault = %fault,
                    source = ?std::error::Error::source(&fault),
                    "operation failed unexpectedly"
                );
                // Internal details stay server-side.
                response.write_fault(&Fault::of_kind(FaultKind::Internal));
            } else {
                debug!(route = %route.name(), caller = %identity.log_id(), fault = %fault, "operation faulted");
                response.write_fault(&fault);
            }
        }
    }
    response
}

async fn run(
    route: &BoundRoute,
    request: &ServerRequest,
    identity: &CallerIdentity,
) -> FaultResult<Option<Value>> {
    keryx_authz::evaluate(route.authorization(), identity)?;

    let operation = route.operation();
    let args = extract_arguments(operation, request)?;

    debug!(route = %route.name(), caller = %identity.log_id(), "dispatching");
    let payload = route.dispatch().call(operation.name(), args).await?;

    // A null payload and no payload are the same completion signal.
    match payload {
        Some(Value::Null) | None => Ok(None),
        Some(value) if !operation.returns_value() => {
            debug!(route = %route.name(), ?value, "discarding payload from void operation");
            Ok(None)
        }
        Some(value) => Ok(Some(value)),
    }
}
