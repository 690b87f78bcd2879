//! Full-pipeline dispatch tests: match, authorize, extract, invoke, respond.

use http::{Method, StatusCode};
use keryx_core::{
    AuthorizeSpec, BoxFuture, CallerIdentity, ContractDescriptor, ContractRegistry, Fault,
    FaultResult, OperationDescriptor, OperationDispatch, ParameterSpec, Verb,
};
use keryx_server::{decode_arg, decode_query_arg, handle, RouteTable, ServerRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
struct ItemFilter {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    search: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct NewItem {
    display_name: String,
}

/// The hand-written dispatch table for the `Items` contract.
struct ItemsDispatch;

impl OperationDispatch for ItemsDispatch {
    fn call(
        &self,
        operation: &str,
        mut args: Vec<Value>,
    ) -> BoxFuture<'static, FaultResult<Option<Value>>> {
        let operation = operation.to_string();
        Box::pin(async move {
            match operation.as_str() {
                "GetItem" => {
                    let id: u64 = decode_arg(args.remove(0))?;
                    if id == 42 {
                        Ok(Some(json!("hello")))
                    } else {
                        Err(Fault::not_found("missing"))
                    }
                }
                "ListItems" => {
                    let filter: ItemFilter = decode_query_arg(&args[0])?;
                    Ok(Some(serde_json::to_value(filter).map_err(|e| {
                        Fault::internal_with_source("serialize filter", e)
                    })?))
                }
                "SaveItem" => {
                    let item: NewItem = decode_arg(args.remove(0))?;
                    assert!(!item.display_name.is_empty());
                    Ok(None)
                }
                "DeleteItem" => Ok(Some(Value::Null)),
                other => Err(Fault::conflict(format!("unknown operation '{other}'"))),
            }
        })
    }
}

fn items_contract() -> ContractDescriptor {
    ContractDescriptor::builder("Items")
        .anonymous()
        .operation(
            OperationDescriptor::builder("GetItem")
                .verb(Verb::Get)
                .path("/item/{id}")
                .parameter(ParameterSpec::route("id"))
                .returns_value(true)
                .build(),
        )
        .operation(
            OperationDescriptor::builder("ListItems")
                .verb(Verb::Get)
                .path("/item")
                .parameter(ParameterSpec::query_object("filter"))
                .returns_value(true)
                .build(),
        )
        .operation(
            OperationDescriptor::builder("SaveItem")
                .verb(Verb::Post)
                .path("/item")
                .parameter(ParameterSpec::body("item"))
                .build(),
        )
        .operation(
            OperationDescriptor::builder("DeleteItem")
                .verb(Verb::Delete)
                .path("/item/{id}")
                .parameter(ParameterSpec::route("id"))
                .returns_value(true)
                .build(),
        )
        .build()
        .expect("valid contract")
}

fn items_table() -> RouteTable {
    let mut registry = ContractRegistry::new();
    registry
        .register_bound(items_contract(), Arc::new(ItemsDispatch))
        .expect("register");
    let mut table = RouteTable::new();
    table.bind_registry(&registry).expect("bind");
    table
}

#[tokio::test]
async fn routed_get_decodes_coerces_and_responds() {
    let table = items_table();
    let request = ServerRequest::new(Method::GET, "/item/42");
    let response = handle(&table, request, &CallerIdentity::Anonymous).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(&response.body()[..], b"\"hello\"");
}

#[tokio::test]
async fn implementation_fault_becomes_an_envelope() {
    let table = items_table();
    let request = ServerRequest::new(Method::GET, "/item/7");
    let response = handle(&table, request, &CallerIdentity::Anonymous).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        &response.body()[..],
        br#"{"success":false,"statusCode":404,"message":"missing","details":["missing"]}"#
    );
}

#[tokio::test]
async fn unmatched_route_is_a_not_found_envelope() {
    let table = items_table();
    let request = ServerRequest::new(Method::GET, "/nope");
    let response = handle(&table, request, &CallerIdentity::Anonymous).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let envelope: Value = serde_json::from_slice(response.body()).expect("json");
    assert_eq!(envelope["success"], json!(false));
    assert_eq!(envelope["statusCode"], json!(404));
}

#[tokio::test]
async fn composite_query_coerces_into_struct_fields() {
    let table = items_table();
    let request = ServerRequest::new(Method::GET, "/item?Page=3&Archived=true&Search=widget");
    let response = handle(&table, request, &CallerIdentity::Anonymous).await;

    assert_eq!(response.status(), StatusCode::OK);
    let echoed: ItemFilter = serde_json::from_slice(response.body()).expect("json");
    assert_eq!(
        echoed,
        ItemFilter {
            page: 3,
            archived: true,
            search: "widget".to_string()
        }
    );
}

#[tokio::test]
async fn body_keys_fold_into_snake_case() {
    let table = items_table();
    let request = ServerRequest::new(Method::POST, "/item")
        .with_body(&br#"{"DisplayName":"Widget"}"#[..]);
    let response = handle(&table, request, &CallerIdentity::Anonymous).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn null_payload_collapses_to_no_content() {
    let table = items_table();
    let request = ServerRequest::new(Method::DELETE, "/item/42");
    let response = handle(&table, request, &CallerIdentity::Anonymous).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_bad_request_envelope() {
    let table = items_table();
    let request = ServerRequest::new(Method::POST, "/item").with_body(&b"{oops"[..]);
    let response = handle(&table, request, &CallerIdentity::Anonymous).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let envelope: Value = serde_json::from_slice(response.body()).expect("json");
    assert_eq!(envelope["statusCode"], json!(400));
}

fn secured_table() -> RouteTable {
    let descriptor = ContractDescriptor::builder("Admin")
        .authorize(AuthorizeSpec::policy("ops"))
        .operation(
            OperationDescriptor::builder("Purge")
                .verb(Verb::Post)
                .path("/admin/purge")
                .authorize(AuthorizeSpec::roles("admin, auditor"))
                .build(),
        )
        .build()
        .expect("valid contract");

    struct PurgeDispatch;
    impl OperationDispatch for PurgeDispatch {
        fn call(
            &self,
            _operation: &str,
            _args: Vec<Value>,
        ) -> BoxFuture<'static, FaultResult<Option<Value>>> {
            Box::pin(async { Ok(None) })
        }
    }

    let mut table = RouteTable::new();
    table
        .bind(Arc::new(descriptor), Arc::new(PurgeDispatch))
        .expect("bind");
    table
}

#[tokio::test]
async fn unauthenticated_caller_gets_401() {
    let table = secured_table();
    let request = ServerRequest::new(Method::POST, "/admin/purge");
    let response = handle(&table, request, &CallerIdentity::Anonymous).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn requirements_are_conjunctive() {
    let table = secured_table();

    // Holds the role but not the contract-scope policy claim.
    let role_only = CallerIdentity::user("u1").with_role("admin");
    let request = ServerRequest::new(Method::POST, "/admin/purge");
    let response = handle(&table, request, &role_only).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Holds the claim but none of the roles.
    let claim_only = CallerIdentity::user("u2").with_claim("policy", "ops");
    let request = ServerRequest::new(Method::POST, "/admin/purge");
    let response = handle(&table, request, &claim_only).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Holds both; either listed role suffices.
    let both = CallerIdentity::user("u3")
        .with_claim("policy", "ops")
        .with_role("auditor");
    let request = ServerRequest::new(Method::POST, "/admin/purge");
    let response = handle(&table, request, &both).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
