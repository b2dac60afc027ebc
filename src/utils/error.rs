//! Error handling module
//!
//! Defines the error taxonomy shared by the validator, rate limiter,
//! and request client

use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Input failed a declared validation rule; never sent over the network
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Local rate-limit guard tripped; recoverable by waiting
    #[error("Too many requests to {endpoint}, please try again later")]
    RateLimitExceeded {
        endpoint: String,
        retry_after_ms: u64,
    },

    /// An identical mutation is already in flight; double-submission guard
    #[error("A matching request to {endpoint} is already in progress")]
    DuplicateRequest { endpoint: String },

    /// Attempt aborted after exceeding its deadline
    #[error("Request timeout")]
    Timeout,

    /// Credential no longer valid; the silent variant must not be logged
    /// or surfaced to the user
    #[error("Session expired, please log in again")]
    SessionExpired { silent: bool },

    /// Upstream 5xx
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Connection-level failure matching a known transient signature
    #[error("Temporary network error: {0}")]
    Transient(String),

    /// Upstream rejected the request (4xx other than 401)
    #[error("Request failed ({status}): {message}")]
    Client { status: u16, message: String },

    /// Transport failure with no transient signature match
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP-equivalent status code carried on the structured failure
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::RateLimitExceeded { .. } => 429,
            ApiError::DuplicateRequest { .. } => 409,
            ApiError::Timeout => 0,
            ApiError::SessionExpired { .. } => 401,
            ApiError::Server { status, .. } => *status,
            ApiError::Client { status, .. } => *status,
            ApiError::Transient(_) | ApiError::Network(_) => 0,
            ApiError::Config(_) | ApiError::Serialization(_) => 0,
        }
    }

    /// Stable kind string for logging and caller branching
    pub fn error_kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::RateLimitExceeded { .. } => "rate_limit_error",
            ApiError::DuplicateRequest { .. } => "duplicate_request",
            ApiError::Timeout => "timeout_error",
            ApiError::SessionExpired { .. } => "session_expired",
            ApiError::Server { .. } => "server_error",
            ApiError::Transient(_) => "transient_network_error",
            ApiError::Client { .. } => "client_error",
            ApiError::Network(_) => "network_error",
            ApiError::Config(_) => "config_error",
            ApiError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether the retry state machine may re-send after this failure
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout | ApiError::Server { .. } | ApiError::Transient(_)
        )
    }

    /// Whether this failure may appear in logs. Silent session expiry is
    /// a normal token-refresh race and must leave no trace.
    pub fn should_log(&self) -> bool {
        !matches!(self, ApiError::SessionExpired { silent: true })
    }

    /// Whether the failure indicates the local session must be torn down
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. })
    }
}

/// Result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Error construction helpers
#[allow(dead_code)]
pub mod helpers {
    use super::*;

    /// Create a validation error scoped to a field
    pub fn field_error(field: &str, message: impl Into<String>) -> ApiError {
        ApiError::Validation(format!("{}: {}", field, message.into()))
    }

    /// Create a server error
    pub fn server_error(status: u16, message: impl Into<String>) -> ApiError {
        ApiError::Server {
            status,
            message: message.into(),
        }
    }

    /// Create a client error
    pub fn client_error(status: u16, message: impl Into<String>) -> ApiError {
        ApiError::Client {
            status,
            message: message.into(),
        }
    }
}
