//! Fault taxonomy and wire envelope.
//!
//! This module provides [`Fault`], the typed, status-bearing error used by
//! both the client invocation engine and the server dispatch engine, and
//! [`Envelope`], the uniform JSON body carried by every non-success server
//! response.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`Fault`].
pub type FaultResult<T> = Result<T, Fault>;

/// Classification of a [`Fault`].
///
/// Each kind maps to exactly one HTTP status code. `Conflict` doubles as the
/// contract/configuration-defect kind (missing routing metadata, missing
/// implementation, unsupported verb).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// Malformed or missing required input.
    BadRequest,
    /// No or invalid credentials.
    Unauthorized,
    /// Authenticated but insufficient rights.
    Forbidden,
    /// Addressed resource absent.
    NotFound,
    /// Contract or configuration defect, or a state conflict.
    Conflict,
    /// Unanticipated failure.
    Internal,
}

impl FaultKind {
    /// Returns the HTTP status code for this fault kind.
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the default human-readable message for this fault kind.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "The server cannot process the request due to a client error.",
            Self::Unauthorized => "The request lacks valid authentication credentials.",
            Self::Forbidden => "The server understood the request but refuses to authorize it.",
            Self::NotFound => "The server can not find the requested resource.",
            Self::Conflict => "The request conflicts with the current state of the server.",
            Self::Internal => "The server encountered an unexpected condition.",
        }
    }
}

/// A typed, status-bearing error.
///
/// Faults are immutable once constructed. A fault raised by a bound
/// implementation propagates to the dispatcher's single catch point and is
/// translated into an [`Envelope`]; on the client side, non-success transport
/// responses surface as faults carrying the response status and body.
///
/// # Example
///
/// ```
/// use keryx_core::{Fault, FaultKind};
///
/// let fault = Fault::not_found("missing");
/// assert_eq!(fault.kind(), FaultKind::NotFound);
/// assert_eq!(fault.status_code().as_u16(), 404);
/// assert_eq!(fault.details(), &["missing".to_string()]);
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Fault {
    kind: FaultKind,
    message: String,
    details: Vec<String>,
    /// The underlying error, never exposed to clients.
    #[source]
    source: Option<anyhow::Error>,
}

impl Fault {
    /// Creates a fault of the given kind with its default message and no details.
    #[must_use]
    pub fn of_kind(kind: FaultKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            details: Vec::new(),
            source: None,
        }
    }

    fn with_message(kind: FaultKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            details: vec![message.clone()],
            message,
            source: None,
        }
    }

    /// Creates a bad-request fault. The message is echoed into `details`.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(FaultKind::BadRequest, message)
    }

    /// Creates an unauthorized fault. The message is echoed into `details`.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_message(FaultKind::Unauthorized, message)
    }

    /// Creates a forbidden fault. The message is echoed into `details`.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_message(FaultKind::Forbidden, message)
    }

    /// Creates a not-found fault. The message is echoed into `details`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(FaultKind::NotFound, message)
    }

    /// Creates a conflict fault. The message is echoed into `details`.
    ///
    /// Conflict is also the kind used for contract and configuration defects:
    /// missing routing metadata, missing implementation, unsupported verb.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_message(FaultKind::Conflict, message)
    }

    /// Creates an internal fault. The message is echoed into `details`.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(FaultKind::Internal, message)
    }

    /// Creates an internal fault with an underlying source error.
    ///
    /// The source is available through `std::error::Error::source` for
    /// logging but is never serialized into the envelope.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        let mut fault = Self::with_message(FaultKind::Internal, message);
        fault.source = Some(source.into());
        fault
    }

    /// Replaces the detail list.
    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// Appends one detail entry.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// Maps an HTTP response status to a fault carrying the response body.
    ///
    /// Known statuses map to their kind; other client errors downgrade to
    /// `BadRequest` and anything else to `Internal`. The original status and
    /// body text are preserved in `details`.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let kind = match status {
            StatusCode::BAD_REQUEST => FaultKind::BadRequest,
            StatusCode::UNAUTHORIZED => FaultKind::Unauthorized,
            StatusCode::FORBIDDEN => FaultKind::Forbidden,
            StatusCode::NOT_FOUND => FaultKind::NotFound,
            StatusCode::CONFLICT => FaultKind::Conflict,
            s if s.is_client_error() => FaultKind::BadRequest,
            _ => FaultKind::Internal,
        };

        // A body that parses as an envelope keeps its message and details.
        if let Ok(envelope) = serde_json::from_str::<Envelope>(body) {
            return Self {
                kind,
                message: envelope.message,
                details: envelope.details.unwrap_or_default(),
                source: None,
            };
        }

        let mut details = vec![format!("upstream responded with status {status}")];
        if !body.is_empty() {
            details.push(body.to_string());
        }
        Self {
            kind,
            message: format!("request failed with status {status}"),
            details,
            source: None,
        }
    }

    /// Returns the fault kind.
    #[must_use]
    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Returns the HTTP status code for this fault.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the detail entries.
    #[must_use]
    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// Converts this fault to its wire envelope.
    #[must_use]
    pub fn to_envelope(&self) -> Envelope {
        Envelope {
            success: false,
            status_code: self.status_code().as_u16(),
            message: self.message.clone(),
            details: if self.details.is_empty() {
                None
            } else {
                Some(self.details.clone())
            },
        }
    }
}

/// Wire-level response envelope.
///
/// Every non-success server response body is JSON-shaped
/// `{"success": false, "statusCode": <int>, "message": <string>,
/// "details": [<string>, ...] | null}`. Successful responses with a payload
/// are the bare serialized payload with no wrapper; callers branch on HTTP
/// status, not on envelope presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Always `false` for fault envelopes.
    pub success: bool,
    /// HTTP status code duplicated into the body.
    pub status_code: u16,
    /// Human-readable message.
    pub message: String,
    /// Optional ordered detail entries; serialized as `null` when absent.
    pub details: Option<Vec<String>>,
}
