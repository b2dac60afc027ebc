//! TarTrack API Client Library
//!
//! Resilient HTTP client for the TarTrack tartanilla booking backend:
//! validated, rate-limited, authenticated calls with retry and classified
//! failures

pub mod config;
pub mod models;
pub mod security;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use models::{ApiFailure, ApiRequest, ApiSuccess, CallResult, FailureKind, RequestBody, UploadPart};
pub use security::{PayloadPolicy, RateLimiter, ValidationRule};
pub use services::{ApiClient, MemoryTokenProvider, TokenPair, TokenProvider};
pub use utils::error::{ApiError, ApiResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
