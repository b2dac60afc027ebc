//! Call outcome types
//!
//! Exactly one of success or failure is produced per logical call.
//! Failures are values, never panics or raw errors across the boundary.

use crate::utils::error::ApiError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Successful call outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuccess {
    /// Parsed JSON body; plain-text bodies arrive as a JSON string
    pub data: serde_json::Value,
    /// HTTP status of the final attempt
    pub status: u16,
}

impl ApiSuccess {
    /// Deserialize the payload into a typed model
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Failure classification carried on the structured result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    RateLimited,
    Duplicate,
    Timeout,
    SessionExpired,
    Server,
    Transient,
    Client,
    Network,
    Internal,
}

/// Failed call outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFailure {
    /// User-presentable message; generic in production, verbose in dev
    pub message: String,
    /// HTTP status of the final attempt, 0 when no response was received
    pub status: u16,
    pub kind: FailureKind,
    /// The local session was torn down; redirect to re-authentication
    pub session_expired: bool,
    /// Must not be surfaced to the user or logged; a token-refresh race,
    /// not an error
    pub silent: bool,
}

/// Result of one logical call
pub type CallResult = Result<ApiSuccess, ApiFailure>;

impl ApiFailure {
    /// Convert an internal error into the outcome surfaced to callers.
    ///
    /// Production messages stay generic for transport and server faults;
    /// validation and 4xx messages are caller-actionable and pass through.
    pub fn from_error(error: ApiError, dev_mode: bool) -> Self {
        let status = error.status_code();
        let kind = failure_kind(&error);
        let session_expired = error.is_session_expired();
        let silent = matches!(error, ApiError::SessionExpired { silent: true });

        let message = match &error {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::Client { message, .. } => message.clone(),
            ApiError::RateLimitExceeded { .. } => error.to_string(),
            ApiError::DuplicateRequest { .. } => error.to_string(),
            ApiError::SessionExpired { .. } => error.to_string(),
            ApiError::Timeout
            | ApiError::Server { .. }
            | ApiError::Transient(_)
            | ApiError::Network(_)
            | ApiError::Config(_)
            | ApiError::Serialization(_) => {
                if dev_mode {
                    error.to_string()
                } else {
                    "Something went wrong. Please try again.".to_string()
                }
            }
        };

        Self {
            message,
            status,
            kind,
            session_expired,
            silent,
        }
    }
}

fn failure_kind(error: &ApiError) -> FailureKind {
    match error {
        ApiError::Validation(_) => FailureKind::Validation,
        ApiError::RateLimitExceeded { .. } => FailureKind::RateLimited,
        ApiError::DuplicateRequest { .. } => FailureKind::Duplicate,
        ApiError::Timeout => FailureKind::Timeout,
        ApiError::SessionExpired { .. } => FailureKind::SessionExpired,
        ApiError::Server { .. } => FailureKind::Server,
        ApiError::Transient(_) => FailureKind::Transient,
        ApiError::Client { .. } => FailureKind::Client,
        ApiError::Network(_) => FailureKind::Network,
        ApiError::Config(_) | ApiError::Serialization(_) => FailureKind::Internal,
    }
}
