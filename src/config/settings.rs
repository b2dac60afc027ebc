//! Client configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// API endpoint configuration
    pub api: ApiConfig,
    /// Retry configuration
    pub retry: RetryConfig,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the TarTrack backend
    pub base_url: String,
    /// Request timeout in seconds for JSON calls
    pub timeout_secs: u64,
    /// Request timeout in seconds for multipart uploads
    pub upload_timeout_secs: u64,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total send-attempt budget per logical request
    pub max_attempts: u32,
    /// Base delay in milliseconds; attempt N waits N * base before re-sending
    pub base_delay_ms: u64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum counted requests per endpoint within a window
    pub limit: u32,
    /// Window length in seconds
    pub window_secs: u64,
    /// Lenient posture multiplies the limit for development use
    pub lenient: bool,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Body substrings that indicate an expired credential regardless of
    /// HTTP status. Backend-specific, so configurable.
    pub session_expiry_signatures: Vec<String>,
    /// Transport error substrings treated as transient and retryable
    pub transient_error_signatures: Vec<String>,
    /// Development mode enables verbose failure messages
    pub dev_mode: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl RateLimitConfig {
    /// Limit actually enforced, after the posture multiplier
    pub fn effective_limit(&self) -> u32 {
        if self.lenient {
            self.limit.saturating_mul(10)
        } else {
            self.limit
        }
    }
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let dev_mode = get_env_or_default("DEV_MODE", "false")
            .to_lowercase()
            == "true";

        let settings = Self {
            api: ApiConfig {
                base_url: get_env_or_default("TARTRACK_API_URL", "https://api.tartrack.ph/api"),
                timeout_secs: get_env_or_default("REQUEST_TIMEOUT", "8")
                    .parse()
                    .context("Invalid request timeout")?,
                upload_timeout_secs: get_env_or_default("UPLOAD_TIMEOUT", "60")
                    .parse()
                    .context("Invalid upload timeout")?,
            },
            retry: RetryConfig {
                max_attempts: get_env_or_default("MAX_RETRY_ATTEMPTS", "3")
                    .parse()
                    .context("Invalid retry attempt count")?,
                base_delay_ms: get_env_or_default("RETRY_BASE_DELAY_MS", "1000")
                    .parse()
                    .context("Invalid retry base delay")?,
            },
            rate_limit: RateLimitConfig {
                limit: get_env_or_default("RATE_LIMIT_MAX_REQUESTS", "60")
                    .parse()
                    .context("Invalid rate limit")?,
                window_secs: get_env_or_default("RATE_LIMIT_WINDOW_SECS", "60")
                    .parse()
                    .context("Invalid rate limit window")?,
                lenient: dev_mode
                    || get_env_or_default("RATE_LIMIT_LENIENT", "false")
                        .to_lowercase()
                        == "true",
            },
            security: SecurityConfig {
                session_expiry_signatures: split_env_list(
                    "SESSION_EXPIRY_SIGNATURES",
                    "JWT expired,PGRST301",
                ),
                transient_error_signatures: split_env_list(
                    "TRANSIENT_ERROR_SIGNATURES",
                    "connection reset,connection refused,connection closed,dns error,network unreachable,broken pipe,error sending request",
                ),
                dev_mode,
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        if !self.api.base_url.starts_with("http") {
            anyhow::bail!("Invalid base URL format, should start with 'http'");
        }

        if self.api.timeout_secs == 0 || self.api.upload_timeout_secs == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        if self.retry.max_attempts == 0 {
            anyhow::bail!("Retry attempt budget cannot be 0");
        }

        if self.rate_limit.limit == 0 {
            anyhow::bail!("Rate limit cannot be 0");
        }

        if self.rate_limit.window_secs == 0 {
            anyhow::bail!("Rate limit window cannot be 0");
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        // Validate log format
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Check if in development mode
    pub fn is_dev_mode(&self) -> bool {
        self.security.dev_mode
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a comma-separated environment list, trimming entries
fn split_env_list(key: &str, default: &str) -> Vec<String> {
    get_env_or_default(key, default)
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings {
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                timeout_secs: 8,
                upload_timeout_secs: 60,
            },
            retry: RetryConfig {
                max_attempts: 3,
                base_delay_ms: 1000,
            },
            rate_limit: RateLimitConfig {
                limit: 60,
                window_secs: 60,
                lenient: false,
            },
            security: SecurityConfig {
                session_expiry_signatures: vec!["JWT expired".to_string()],
                transient_error_signatures: vec!["connection reset".to_string()],
                dev_mode: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
        }
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut settings = base_settings();
        settings.api.base_url = "ftp://example.com".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut settings = base_settings();
        settings.api.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_effective_limit_posture() {
        let mut config = base_settings().rate_limit;
        assert_eq!(config.effective_limit(), 60);
        config.lenient = true;
        assert_eq!(config.effective_limit(), 600);
    }
}
