use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Scope granted to callers holding the shared secret
pub const WILDCARD_SCOPE: &str = "*";

/// Outcome of a successful credential match.
///
/// Lives for the processing of a single request and is never persisted.
/// Only [`TokenAuthenticator::authenticate`](crate::TokenAuthenticator::authenticate)
/// issues one; code outside this crate cannot build a grant:
///
/// ```compile_fail
/// let forged = tollgate_core::AccessGrant::new("wrong", "attacker", ["*".to_string()], None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessGrant {
    token: String,
    client_identity: String,
    scopes: BTreeSet<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessGrant {
    pub(crate) fn new(
        token: impl Into<String>,
        client_identity: impl Into<String>,
        scopes: impl IntoIterator<Item = String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            token: token.into(),
            client_identity: client_identity.into(),
            scopes: scopes.into_iter().collect(),
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn client_identity(&self) -> &str {
        &self.client_identity
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

// The token is the shared secret, so it never reaches log output.
impl std::fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGrant")
            .field("token", &"<redacted>")
            .field("client_identity", &self.client_identity)
            .field("scopes", &self.scopes)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Failure kinds a dispatch can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Presented credential did not match the configured secret
    Unauthorized,
    /// No descriptor registered under the requested name
    UnknownTool,
    /// Raw input failed schema or semantic validation
    InvalidParams,
    /// The handler itself reported a domain failure
    HandlerError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::UnknownTool => "unknown_tool",
            ErrorKind::InvalidParams => "invalid_params",
            ErrorKind::HandlerError => "handler_error",
        };
        f.write_str(label)
    }
}

/// Structured failure returned to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorOutcome {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorOutcome {
    pub fn unauthorized() -> Self {
        Self {
            kind: ErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
            detail: None,
        }
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self {
            kind: ErrorKind::UnknownTool,
            message: format!("Unknown tool: {}", name),
            detail: Some(name.to_string()),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidParams,
            message: message.into(),
            detail: None,
        }
    }

    pub fn handler_error(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::HandlerError,
            message: message.into(),
            detail: None,
        }
    }
}

impl std::fmt::Display for ErrorOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ErrorOutcome {}

/// Value produced by a successful dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub value: serde_json::Value,
}

impl ToolOutput {
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self { value: value.into() }
    }

    /// Render the value as text: strings verbatim, everything else as JSON
    pub fn to_text(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Result of a single dispatch
pub type DispatchResult = Result<ToolOutput, ErrorOutcome>;
