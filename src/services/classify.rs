//! Response classification
//!
//! One step turns a completed exchange (status plus body) or a transport
//! error into the outcome the retry state machine acts on. Expired-session
//! detection by status and by body signature converge here instead of
//! living on two code paths.

use crate::config::settings::SecurityConfig;
use crate::utils::error::ApiError;

/// Outcome of classifying one attempt
#[derive(Debug)]
pub enum Disposition {
    /// 2xx with the parsed payload
    Success { data: serde_json::Value, status: u16 },
    /// Anything else; `ApiError::is_retryable` decides whether the retry
    /// loop re-sends
    Failed(ApiError),
}

/// Classifies responses and transport errors against configured signatures
#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    expiry_signatures: Vec<String>,
    transient_signatures: Vec<String>,
}

impl ResponseClassifier {
    pub fn new(expiry_signatures: Vec<String>, transient_signatures: Vec<String>) -> Self {
        Self {
            expiry_signatures,
            transient_signatures,
        }
    }

    pub fn from_security_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.session_expiry_signatures.clone(),
            config.transient_error_signatures.clone(),
        )
    }

    /// Classify a completed HTTP exchange
    ///
    /// A body carrying an expiry signature wins over the status code: that
    /// is the token-refresh race, reported silently. An explicit 401
    /// without a signature is a loud session expiry.
    pub fn classify_response(&self, status: u16, body: &str) -> Disposition {
        if self
            .expiry_signatures
            .iter()
            .any(|signature| body.contains(signature.as_str()))
        {
            return Disposition::Failed(ApiError::SessionExpired {
                silent: status != 401,
            });
        }

        if (200..300).contains(&status) {
            return Disposition::Success {
                data: parse_success_body(body),
                status,
            };
        }

        if status == 401 {
            return Disposition::Failed(ApiError::SessionExpired { silent: false });
        }

        if status >= 500 || status == 0 {
            return Disposition::Failed(ApiError::Server {
                status,
                message: extract_error_message(body),
            });
        }

        Disposition::Failed(ApiError::Client {
            status,
            message: extract_error_message(body),
        })
    }

    /// Classify a transport-level failure where no response arrived
    pub fn classify_transport_error(&self, error: &reqwest::Error) -> ApiError {
        if error.is_timeout() {
            return ApiError::Timeout;
        }

        let message = error_chain(error);
        let lowered = message.to_lowercase();
        let transient = error.is_connect()
            || self
                .transient_signatures
                .iter()
                .any(|signature| lowered.contains(&signature.to_lowercase()));

        if transient {
            ApiError::Transient(message)
        } else {
            ApiError::Network(message)
        }
    }
}

/// Parse a 2xx body: JSON when possible, the raw text otherwise
fn parse_success_body(body: &str) -> serde_json::Value {
    if body.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| serde_json::Value::String(body.to_string()))
}

/// Best-effort message extraction from `error`/`message`/`detail` fields
pub fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(object) = value.as_object() {
            for key in ["error", "message", "detail"] {
                match object.get(key) {
                    Some(serde_json::Value::String(text)) => return text.clone(),
                    Some(serde_json::Value::Object(nested)) => {
                        if let Some(text) = nested.get("message").and_then(|v| v.as_str()) {
                            return text.to_string();
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    if body.trim().is_empty() {
        "Request failed".to_string()
    } else {
        body.to_string()
    }
}

/// Render the reqwest error with its source chain, which carries the
/// os-level detail the signature list matches against
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
