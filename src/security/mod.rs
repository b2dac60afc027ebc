//! Security module
//!
//! Input sanitization, declarative validation, payload policies, and the
//! per-endpoint rate limiter

pub mod policy;
pub mod rate_limit;
pub mod sanitize;
pub mod validation;

pub use policy::{EndpointRules, PayloadPolicy};
pub use rate_limit::RateLimiter;
pub use sanitize::{sanitize_json_strings, sanitize_text};
pub use validation::{
    validate_coordinates, validate_date, validate_email, validate_number, validate_phone,
    validate_text, validate_value, ValidationRule,
};
