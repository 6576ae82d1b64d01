//! Error types for the jobboard client.
//!
//! Transport failures, session invalidation, and malformed responses are kept
//! as distinct variants so callers can tell "server unreachable" apart from
//! "server returned garbage".

use std::path::PathBuf;

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Message used when neither the server nor the HTTP status gives one.
pub const GENERIC_REQUEST_FAILURE: &str = "API request failed";

/// Message recorded for a forced logout when the 401 carried no usable text.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Fallback shown to users when no better message is available.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response other than 401.
    #[error("{message}")]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The server rejected the bearer token (HTTP 401).
    #[error("{message}")]
    SessionInvalid {
        code: Option<String>,
        message: String,
    },

    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx body did not match the expected shape.
    #[error("malformed {resource} response: {source}")]
    MalformedResponse {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("{field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("not logged in")]
    NotAuthenticated,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// HTTP status code, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::SessionInvalid { .. } => Some(401),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server-supplied error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Http { code, .. } | ApiError::SessionInvalid { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_session_invalid(&self) -> bool {
        matches!(self, ApiError::SessionInvalid { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ApiError::MalformedResponse { .. })
    }
}

/// Failure writing to a key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Known server error codes and the text shown for them.
const ERROR_MESSAGES: &[(&str, &str)] = &[
    ("INVALID_REQUEST", "Please check your input."),
    ("INVALID_CREDENTIALS", "The cluster ID or password is incorrect."),
    ("AUTH_MISSING_TOKEN", "No credentials found. Please log in again."),
    (
        "AUTH_INVALID_TOKEN",
        "Your session has expired or the credentials are invalid.",
    ),
    ("CLUSTER_ALREADY_EXISTS", "That cluster ID is already in use."),
    ("NODE_NOT_FOUND", "The node could not be found."),
    ("JOB_NOT_FOUND", "The job could not be found."),
    ("JOB_ALREADY_RUNNING", "A job is already running on this node."),
    ("JOB_NOT_RUNNING", "There is no running job."),
    (
        "INTERNAL_ERROR",
        "Something went wrong on the server. Please try again later.",
    ),
];

/// Returns the catalog message for a server error code.
pub fn catalog_message(code: &str) -> Option<&'static str> {
    ERROR_MESSAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| *message)
}

/// Whether `value` looks like a server error code such as `NODE_NOT_FOUND`.
pub(crate) fn looks_like_error_code(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && value.starts_with(|c: char| c.is_ascii_uppercase())
}

/// User-facing message for an error: catalog entry, then raw message, then `fallback`.
pub fn resolve_message(error: &ApiError, fallback: &str) -> String {
    if let Some(message) = error.code().and_then(catalog_message) {
        return message.to_string();
    }

    let raw = error.to_string();
    if raw.trim().is_empty() {
        fallback.to_string()
    } else {
        raw
    }
}
