use std::collections::BTreeMap;

use anyhow::Context as _;
use thiserror::Error;

/// Tagged outcome of a failed gateway call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// Transport failure or timeout; the caller may retry
    #[error("Network error: {message}")]
    Network { message: String },

    /// Missing, expired or rejected session token
    #[error("{message}")]
    Auth { message: String, code: Option<i64> },

    /// User-correctable rejection, either from the server or from draft checks
    #[error("{message}")]
    Validation {
        message: String,
        code: Option<i64>,
        fields: BTreeMap<String, String>,
    },

    /// 5xx, malformed body, or a payload that breaks an entity invariant
    #[error("Unexpected response: {message}")]
    Unexpected { message: String },

    /// The fetch was abandoned through its cancel handle
    #[error("Request cancelled")]
    Cancelled,
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        GatewayError::Network {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        GatewayError::Auth {
            message: message.into(),
            code: None,
        }
    }

    pub fn validation(message: impl Into<String>, code: Option<i64>) -> Self {
        GatewayError::Validation {
            message: message.into(),
            code,
            fields: BTreeMap::new(),
        }
    }

    pub fn invalid_fields(fields: BTreeMap<String, String>) -> Self {
        let message = fields
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        GatewayError::Validation {
            message,
            code: None,
            fields,
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        GatewayError::Unexpected {
            message: message.into(),
        }
    }

    pub fn is_retriable(&self) -> bool {
        matches!(self, GatewayError::Network { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::Auth { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Cancelled)
    }

    /// Server or client supplied error code, when there is one
    pub fn code(&self) -> Option<i64> {
        match self {
            GatewayError::Auth { code, .. } | GatewayError::Validation { code, .. } => *code,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_builder() {
            GatewayError::unexpected(err.to_string())
        } else {
            GatewayError::network(err.to_string())
        }
    }
}

/// Add context to fetch errors
pub fn fetch_context(what: &str) -> String {
    format!("Failed to fetch {}", what)
}

/// Add context to durable storage errors
pub fn storage_context(operation: &str, key: &str) -> String {
    format!("Failed to {} stored entry: {}", operation, key)
}

/// Wrap a gateway result with fetch context for the command layer
pub fn with_fetch_context<T>(result: GatewayResult<T>, what: &str) -> anyhow::Result<T> {
    result.context(fetch_context(what))
}
