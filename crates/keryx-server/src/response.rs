//! Transport-neutral server response.
//!
//! The embedding host copies status, content type, and body onto its own
//! response object. A response commits on its first write; the dispatcher's
//! outer catch checks the committed flag so a fault never clobbers a body
//! that already went out.

use bytes::Bytes;
use http::StatusCode;
use keryx_core::{Fault, FaultResult};
use serde::Serialize;

/// JSON content type for payload and envelope bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// One outgoing HTTP response.
#[derive(Debug, Clone)]
pub struct ServerResponse {
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Bytes,
    committed: bool,
}

impl Default for ServerResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerResponse {
    /// Creates an empty, uncommitted response.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: None,
            body: Bytes::new(),
            committed: false,
        }
    }

    /// Writes a `200 OK` response with the bare serialized payload.
    pub fn write_json<T: Serialize>(&mut self, payload: &T) -> FaultResult<()> {
        self.ensure_uncommitted()?;
        let body = serde_json::to_vec(payload)
            .map_err(|e| Fault::internal_with_source("failed to serialize response payload", e))?;
        self.status = StatusCode::OK;
        self.content_type = Some(APPLICATION_JSON);
        self.body = Bytes::from(body);
        self.committed = true;
        Ok(())
    }

    /// Writes a `204 No Content` completion with an empty body.
    pub fn write_no_content(&mut self) -> FaultResult<()> {
        self.ensure_uncommitted()?;
        self.status = StatusCode::NO_CONTENT;
        self.content_type = None;
        self.body = Bytes::new();
        self.committed = true;
        Ok(())
    }

    /// Writes a fault envelope, if nothing was written yet.
    ///
    /// Returns `false` when the response was already committed; the caller
    /// can only log the fault at that point.
    pub fn write_fault(&mut self, fault: &Fault) -> bool {
        if self.committed {
            return false;
        }
        self.status = fault.status_code();
        self.content_type = Some(APPLICATION_JSON);
        // Envelope serialization cannot fail: strings and integers only.
        self.body = serde_json::to_vec(&fault.to_envelope())
            .map(Bytes::from)
            .unwrap_or_default();
        self.committed = true;
        true
    }

    fn ensure_uncommitted(&self) -> FaultResult<()> {
        if self.committed {
            return Err(Fault::conflict("response has already been committed"));
        }
        Ok(())
    }

    /// Returns the response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the content type, if a body was written.
    #[must_use]
    pub fn content_type(&self) -> Option<&'static str> {
        self.content_type
    }

    /// Returns the response body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether a write has already happened.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_writes_bare_json() {
        let mut response = ServerResponse::new();
        response.write_json(&json!({"id": 42})).expect("write");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), Some(APPLICATION_JSON));
        assert_eq!(&response.body()[..], br#"{"id":42}"#);
        assert!(response.is_committed());
    }

    #[test]
    fn no_content_has_empty_body() {
        let mut response = ServerResponse::new();
        response.write_no_content().expect("write");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_empty());
        assert!(response.content_type().is_none());
    }

    #[test]
    fn second_write_is_a_conflict() {
        let mut response = ServerResponse::new();
        response.write_no_content().expect("first");
        let err = response.write_json(&json!(1)).expect_err("second");
        assert_eq!(err.kind(), keryx_core::FaultKind::Conflict);
    }

    #[test]
    fn fault_does_not_clobber_a_committed_body() {
        let mut response = ServerResponse::new();
        response.write_json(&json!("done")).expect("write");
        assert!(!response.write_fault(&Fault::not_found("missing")));
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn fault_envelope_wire_shape() {
        let mut response = ServerResponse::new();
        assert!(response.write_fault(&Fault::not_found("missing")));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            &response.body()[..],
            br#"{"success":false,"statusCode":404,"message":"missing","details":["missing"]}"#
        );
    }
}
