//! End-to-end invocation tests over an in-memory transport, including the
//! hand-written per-contract adapter pattern.

use bytes::Bytes;
use http::StatusCode;
use keryx_client::{ContractClient, Transport, TransportResponse};
use keryx_core::{
    BoxFuture, ContractDescriptor, Fault, FaultKind, FaultResult, OperationDescriptor,
    ParameterSpec, Verb,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Records every outbound request and replays a canned response.
struct RecordingTransport {
    requests: Mutex<Vec<(Verb, String, Option<Value>)>>,
    status: StatusCode,
    body: Bytes,
}

impl RecordingTransport {
    fn replying(status: StatusCode, body: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            status,
            body: Bytes::copy_from_slice(body.as_bytes()),
        })
    }

    fn requests(&self) -> Vec<(Verb, String, Option<Value>)> {
        self.requests.lock().expect("lock").clone()
    }
}

impl Transport for RecordingTransport {
    fn send(
        &self,
        verb: Verb,
        path_and_query: String,
        payload: Option<Value>,
    ) -> BoxFuture<'_, FaultResult<TransportResponse>> {
        self.requests
            .lock()
            .expect("lock")
            .push((verb, path_and_query, payload));
        let response = TransportResponse {
            status: self.status,
            body: self.body.clone(),
        };
        Box::pin(async move { Ok(response) })
    }
}

fn items_contract() -> Arc<ContractDescriptor> {
    Arc::new(
        ContractDescriptor::builder("Items")
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
                OperationDescriptor::builder("PatchItem")
                    .verb(Verb::Patch)
                    .path("/item/{id}")
                    .parameter(ParameterSpec::route("id"))
                    .build(),
            )
            .operation(OperationDescriptor::builder("Unrouted").build())
            .build()
            .expect("valid contract"),
    )
}

#[tokio::test]
async fn get_item_renders_path_and_decodes_string_body() {
    let transport = RecordingTransport::replying(StatusCode::OK, "\"hello\"");
    let client = ContractClient::new(items_contract(), transport.clone());

    let result: Option<String> = client
        .invoke_as("GetItem", &[json!("42")])
        .await
        .expect("invoke");
    assert_eq!(result, Some("hello".to_string()));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let (verb, path, payload) = &requests[0];
    assert_eq!(*verb, Verb::Get);
    assert_eq!(path, "/item/42");
    assert!(payload.is_none());
}

#[tokio::test]
async fn missing_routing_metadata_fails_with_zero_network_calls() {
    let transport = RecordingTransport::replying(StatusCode::OK, "");
    let client = ContractClient::new(items_contract(), transport.clone());

    let err = client.invoke("Unrouted", &[]).await.expect_err("must fail");
    assert_eq!(err.kind(), FaultKind::Conflict);
    assert!(err.message().contains("missing routing metadata"));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn patch_fails_before_any_network_activity() {
    let transport = RecordingTransport::replying(StatusCode::OK, "");
    let client = ContractClient::new(items_contract(), transport.clone());

    let err = client
        .invoke("PatchItem", &[json!("42")])
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), FaultKind::Conflict);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn composite_query_omits_default_valued_fields() {
    let transport = RecordingTransport::replying(StatusCode::OK, "[]");
    let client = ContractClient::new(items_contract(), transport.clone());

    client
        .invoke("ListItems", &[json!({"Page": 0, "Size": 10})])
        .await
        .expect("invoke");

    let (_, path, _) = transport.requests().remove(0);
    assert_eq!(path, "/item?Size=10");
    assert!(!path.contains("Page"));
}

#[tokio::test]
async fn non_default_composite_fields_appear_in_query() {
    let transport = RecordingTransport::replying(StatusCode::OK, "[]");
    let client = ContractClient::new(items_contract(), transport.clone());

    client
        .invoke("ListItems", &[json!({"Page": 3})])
        .await
        .expect("invoke");

    let (_, path, _) = transport.requests().remove(0);
    assert_eq!(path, "/item?Page=3");
}

#[tokio::test]
async fn post_sends_body_payload() {
    let transport = RecordingTransport::replying(StatusCode::NO_CONTENT, "");
    let client = ContractClient::new(items_contract(), transport.clone());

    let result = client
        .invoke("SaveItem", &[json!({"name": "widget"})])
        .await
        .expect("invoke");
    assert!(result.is_none());

    let (verb, path, payload) = transport.requests().remove(0);
    assert_eq!(verb, Verb::Post);
    assert_eq!(path, "/item");
    assert_eq!(payload, Some(json!({"name": "widget"})));
}

#[tokio::test]
async fn non_success_response_surfaces_as_fault() {
    let body = r#"{"success":false,"statusCode":404,"message":"missing","details":["missing"]}"#;
    let transport = RecordingTransport::replying(StatusCode::NOT_FOUND, body);
    let client = ContractClient::new(items_contract(), transport);

    let err = client
        .invoke("GetItem", &[json!("42")])
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), FaultKind::NotFound);
    assert_eq!(err.message(), "missing");
    assert_eq!(err.details(), &["missing".to_string()]);
}

#[tokio::test]
async fn response_field_casing_is_folded() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        item_id: String,
        display_name: String,
    }

    let body = r#"{"ItemId":"42","displayName":"Widget"}"#;
    let transport = RecordingTransport::replying(StatusCode::OK, body);
    let client = ContractClient::new(items_contract(), transport);

    let item: Option<Item> = client
        .invoke_as("GetItem", &[json!("42")])
        .await
        .expect("invoke");
    assert_eq!(
        item,
        Some(Item {
            item_id: "42".to_string(),
            display_name: "Widget".to_string()
        })
    );
}

/// The hand-written adapter pattern: a per-contract stub delegating every
/// method to the shared invoke routine keyed by operation name.
struct ItemsClient {
    inner: ContractClient,
}

impl ItemsClient {
    fn new(inner: ContractClient) -> Self {
        Self { inner }
    }

    async fn get_item(&self, id: &str) -> FaultResult<String> {
        self.inner
            .invoke_as("GetItem", &[json!(id)])
            .await?
            .ok_or_else(|| Fault::not_found(format!("item '{id}' not found")))
    }

    async fn save_item(&self, item: Value) -> FaultResult<()> {
        self.inner.invoke("SaveItem", &[item]).await.map(|_| ())
    }
}

#[tokio::test]
async fn adapter_stub_delegates_to_invoke() {
    let transport = RecordingTransport::replying(StatusCode::OK, "\"hello\"");
    let adapter = ItemsClient::new(ContractClient::new(items_contract(), transport.clone()));

    let item = adapter.get_item("42").await.expect("get_item");
    assert_eq!(item, "hello");

    adapter
        .save_item(json!({"name": "widget"}))
        .await
        .expect("save_item");

    assert_eq!(transport.requests().len(), 2);
}
