//! Logging utilities
//!
//! Subscriber setup plus the redaction helpers used when request
//! details are written to logs

use crate::models::request::{ApiRequest, RequestBody};
use tracing::info;

/// Set to true to include full request bodies in debug logs.
/// Default is false to reduce log verbosity and avoid leaking payloads.
pub const VERBOSE_REQUEST_LOGGING: bool = false;

/// Initialize the logging system
///
/// Reads `RUST_LOG` for the filter and `LOG_FORMAT` for text/json output,
/// the same switches the backend deployment uses.
pub fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if log_format == "json" {
        // JSON format logs (production environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(log_level)
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .finish(),
        )
    } else {
        // Human readable format (development environment)
        Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(log_level)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };

    // Ignore the error if a subscriber is already installed (tests)
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        info!("Logging system initialized");
    }
}

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_len: usize) -> String {
    if s.len() > max_len {
        let mut cut = max_len;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... ({} chars truncated)", &s[..cut], s.len() - cut)
    } else {
        s.to_string()
    }
}

/// Mask a bearer token down to a short recognizable prefix
pub fn mask_token(token: &str) -> String {
    if token.len() > 8 {
        format!("{}****", &token[..8])
    } else {
        "****".to_string()
    }
}

/// Create a filtered summary of a request for logging
///
/// Keeps the shape but truncates the body and never includes credentials.
pub fn create_request_log_summary(request: &ApiRequest) -> serde_json::Value {
    let body = match &request.body {
        RequestBody::Empty => serde_json::Value::Null,
        RequestBody::Json(value) => {
            if VERBOSE_REQUEST_LOGGING {
                value.clone()
            } else {
                let rendered = value.to_string();
                serde_json::Value::String(truncate_content(&rendered, 200))
            }
        }
        RequestBody::Multipart(parts) => {
            serde_json::json!(format!("[...{} multipart parts]", parts.len()))
        }
    };

    serde_json::json!({
        "method": request.method.as_str(),
        "endpoint": request.endpoint,
        "retries": request.retries,
        "skip_auth": request.skip_auth,
        "body": body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_content() {
        assert_eq!(truncate_content("short", 10), "short");
        let long = "a".repeat(30);
        let truncated = truncate_content(&long, 10);
        assert!(truncated.starts_with("aaaaaaaaaa..."));
        assert!(truncated.contains("20 chars truncated"));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("sk-live-abcdef123456"), "sk-live-****");
        assert_eq!(mask_token("short"), "****");
    }

    #[test]
    fn test_summary_excludes_full_body() {
        let request = ApiRequest::post("/tour-booking/")
            .json(serde_json::json!({"notes": "x".repeat(500)}));
        let summary = create_request_log_summary(&request);
        let body = summary["body"].as_str().unwrap();
        assert!(body.len() < 300);
        assert!(body.contains("truncated"));
    }
}
