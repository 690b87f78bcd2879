//! Transport-neutral server request.
//!
//! The dispatch engine never touches a live socket; whatever HTTP host embeds
//! it translates each incoming request into a [`ServerRequest`] first. Route
//! parameters are attached after path matching, before extraction runs.

use bytes::Bytes;
use http::{HeaderMap, Method};
use keryx_core::Params;

/// One incoming HTTP request, decoupled from any server framework.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    route: Params,
}

impl ServerRequest {
    /// Creates a request from a method and a request target.
    ///
    /// The target is split at the first `?` into path and raw query string.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            route: Params::new(),
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Replaces the header map.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attaches the route parameters extracted by path matching.
    #[must_use]
    pub fn with_route_params(mut self, route: Params) -> Self {
        self.route = route;
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (no query string).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the decoded query pairs in request order.
    ///
    /// An unparseable query string yields no pairs rather than failing; a
    /// query that matters to an operation will surface a decode fault at
    /// argument-decoding time instead.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .unwrap_or_default()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the matched route parameters.
    #[must_use]
    pub fn route(&self) -> &Params {
        &self.route
    }
}
