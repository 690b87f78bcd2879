//! Caller identity.
//!
//! The authorization evaluator needs to know whether the caller is
//! authenticated, which roles they hold, and which claims they carry.
//! Establishing the identity (token validation, middleware) is the host's
//! concern; this type is only the evaluated shape.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The identity of the caller of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallerIdentity {
    /// No credentials presented.
    Anonymous,
    /// An authenticated user.
    User(UserIdentity),
}

/// An authenticated user with roles and claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable user identifier.
    pub user_id: String,
    /// Roles held by the user.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Claim key/value pairs.
    #[serde(default)]
    pub claims: HashMap<String, String>,
}

impl CallerIdentity {
    /// Creates an anonymous identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Creates an authenticated user identity.
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User(UserIdentity {
            user_id: user_id.into(),
            ..UserIdentity::default()
        })
    }

    /// Adds a role; no-op on anonymous identities.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        if let Self::User(user) = &mut self {
            user.roles.push(role.into());
        }
        self
    }

    /// Adds a claim; no-op on anonymous identities.
    #[must_use]
    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::User(user) = &mut self {
            user.claims.insert(key.into(), value.into());
        }
        self
    }

    /// Whether the caller presented valid credentials.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Whether the caller holds the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        match self {
            Self::User(user) => user.roles.iter().any(|r| r == role),
            Self::Anonymous => false,
        }
    }

    /// Returns the claim value under the given key, if present.
    #[must_use]
    pub fn claim(&self, key: &str) -> Option<&str> {
        match self {
            Self::User(user) => user.claims.get(key).map(String::as_str),
            Self::Anonymous => None,
        }
    }

    /// Returns a string identifier suitable for logging.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::User(user) => format!("user:{}", user.user_id),
            Self::Anonymous => "anonymous".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_nothing() {
        let identity = CallerIdentity::anonymous();
        assert!(!identity.is_authenticated());
        assert!(!identity.has_role("admin"));
        assert!(identity.claim("policy").is_none());
        assert_eq!(identity.log_id(), "anonymous");
    }

    #[test]
    fn user_roles_and_claims() {
        let identity = CallerIdentity::user("u123")
            .with_role("admin")
            .with_claim("policy", "P");
        assert!(identity.is_authenticated());
        assert!(identity.has_role("admin"));
        assert!(!identity.has_role("auditor"));
        assert_eq!(identity.claim("policy"), Some("P"));
        assert_eq!(identity.log_id(), "user:u123");
    }

    #[test]
    fn serializes_with_type_tag() {
        let identity = CallerIdentity::user("u123");
        let json = serde_json::to_string(&identity).expect("serialize");
        assert!(json.contains("\"type\":\"user\""));
        assert!(json.contains("\"user_id\":\"u123\""));
    }
}
