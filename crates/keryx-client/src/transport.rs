//! Pluggable HTTP transport.
//!
//! The invocation engine talks to the network through the [`Transport`]
//! trait: one `send` per invocation, no retries, no caching. The connection
//! pooling and lifecycle of the underlying client are the transport's own
//! concern; [`HttpTransport`] delegates them to `reqwest`.

use bytes::Bytes;
use http::StatusCode;
use keryx_core::{BoxFuture, Fault, FaultResult, Verb};
use serde_json::Value;

/// The raw outcome of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response body bytes.
    pub body: Bytes,
}

/// A pluggable HTTP client boundary.
///
/// Implementations must be safe for concurrent use; the engine shares one
/// transport across all invocations.
pub trait Transport: Send + Sync {
    /// Sends one request and resolves with the response status and body.
    ///
    /// `path_and_query` is relative to whatever base the transport targets.
    /// A payload is only supplied for verbs that carry one (POST/PUT).
    fn send(
        &self,
        verb: Verb,
        path_and_query: String,
        payload: Option<Value>,
    ) -> BoxFuture<'_, FaultResult<TransportResponse>>;
}

/// `reqwest`-backed transport targeting a base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for the given base URL with a default client.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a transport reusing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, path_and_query: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path_and_query.trim_start_matches('/')
        )
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        verb: Verb,
        path_and_query: String,
        payload: Option<Value>,
    ) -> BoxFuture<'_, FaultResult<TransportResponse>> {
        Box::pin(async move {
            let url = self.url_for(&path_and_query);
            let request = match verb {
                Verb::Get => self.client.get(&url),
                Verb::Delete => self.client.delete(&url),
                Verb::Post => self
                    .client
                    .post(&url)
                    .json(&payload.unwrap_or(Value::Null)),
                Verb::Put => self.client.put(&url).json(&payload.unwrap_or(Value::Null)),
                Verb::Patch => {
                    // The engine rejects PATCH before reaching the transport.
                    return Err(Fault::conflict("HTTP method PATCH is not supported"));
                }
            };

            let response = request
                .send()
                .await
                .map_err(|e| Fault::internal_with_source("transport request failed", e))?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| Fault::internal_with_source("failed to read response body", e))?;
            Ok(TransportResponse { status, body })
        })
    }
}
