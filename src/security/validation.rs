//! Input validation
//!
//! Converts untrusted primitives into trusted, normalized values.
//! Rules are a tagged enum with one handler per variant, so a new rule
//! kind cannot be added without the dispatch being updated.

use crate::security::sanitize::sanitize_text;
use crate::utils::error::{helpers::field_error, ApiError, ApiResult};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

// PH mobile numbers: international +63 form or the local 09 form
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?63[0-9]{10}$|^09[0-9]{9}$").unwrap());

/// Declarative validation rule for one field
#[derive(Debug, Clone)]
pub enum ValidationRule {
    /// Free text; sanitized, then length/pattern constrained
    Text {
        required: bool,
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<Regex>,
    },
    /// Email address, lowercased on output
    Email { required: bool },
    /// Philippine mobile number, normalized to +63 form
    Phone { required: bool },
    /// Numeric value, accepted as a JSON number or numeric string
    Number {
        required: bool,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Object with `lat` and `lng` members in valid ranges
    Coordinates { required: bool },
    /// RFC 3339 or `YYYY-MM-DD` date
    Date { required: bool },
}

impl ValidationRule {
    /// Shorthand for an optional free-text rule
    pub fn text() -> Self {
        ValidationRule::Text {
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            ValidationRule::Text { required, .. }
            | ValidationRule::Email { required }
            | ValidationRule::Phone { required }
            | ValidationRule::Number { required, .. }
            | ValidationRule::Coordinates { required }
            | ValidationRule::Date { required } => *required,
        }
    }
}

/// Validate one JSON value against a rule, returning the normalized value
pub fn validate_value(
    field: &str,
    value: &serde_json::Value,
    rule: &ValidationRule,
) -> ApiResult<serde_json::Value> {
    match rule {
        ValidationRule::Text {
            required,
            min_length,
            max_length,
            pattern,
        } => {
            let text = string_input(field, value)?;
            let normalized =
                validate_text(field, &text, *required, *min_length, *max_length, pattern.as_ref())?;
            Ok(serde_json::Value::String(normalized))
        }
        ValidationRule::Email { required } => {
            let text = string_input(field, value)?;
            if text.trim().is_empty() && !required {
                return Ok(serde_json::Value::String(String::new()));
            }
            Ok(serde_json::Value::String(validate_email(&text)?))
        }
        ValidationRule::Phone { required } => {
            let text = string_input(field, value)?;
            if text.trim().is_empty() && !required {
                return Ok(serde_json::Value::String(String::new()));
            }
            Ok(serde_json::Value::String(validate_phone(&text)?))
        }
        ValidationRule::Number { min, max, .. } => {
            let number = validate_number(field, value, *min, *max)?;
            Ok(serde_json::json!(number))
        }
        ValidationRule::Coordinates { .. } => {
            let (lat, lng) = validate_coordinates(field, value)?;
            Ok(serde_json::json!({ "lat": lat, "lng": lng }))
        }
        ValidationRule::Date { required } => {
            let text = string_input(field, value)?;
            if text.trim().is_empty() && !required {
                return Ok(serde_json::Value::String(String::new()));
            }
            validate_date(field, &text)?;
            Ok(serde_json::Value::String(text.trim().to_string()))
        }
    }
}

/// Sanitize and constrain free text
pub fn validate_text(
    field: &str,
    input: &str,
    required: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<&Regex>,
) -> ApiResult<String> {
    let sanitized = sanitize_text(input);

    if sanitized.is_empty() {
        if required {
            return Err(field_error(field, "is required"));
        }
        return Ok(sanitized);
    }

    if let Some(min) = min_length {
        if sanitized.chars().count() < min {
            return Err(field_error(
                field,
                format!("must be at least {min} characters"),
            ));
        }
    }

    if let Some(max) = max_length {
        if sanitized.chars().count() > max {
            return Err(field_error(field, format!("cannot exceed {max} characters")));
        }
    }

    if let Some(pattern) = pattern {
        if !pattern.is_match(&sanitized) {
            return Err(field_error(field, "has an invalid format"));
        }
    }

    Ok(sanitized)
}

/// Validate and normalize an email address
pub fn validate_email(input: &str) -> ApiResult<String> {
    let email = sanitize_text(input).to_lowercase();

    if email.len() > 254 || !EMAIL_PATTERN.is_match(&email) {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }

    Ok(email)
}

/// Validate a Philippine mobile number and normalize it to +63 form
///
/// `09171234567` becomes `+639171234567`; a `+63` input passes through
/// unchanged.
pub fn validate_phone(input: &str) -> ApiResult<String> {
    let phone = sanitize_text(input).replace([' ', '-'], "");

    if !PHONE_PATTERN.is_match(&phone) {
        return Err(ApiError::Validation(
            "Invalid Philippine phone number format".to_string(),
        ));
    }

    if let Some(rest) = phone.strip_prefix('0') {
        return Ok(format!("+63{rest}"));
    }
    if phone.starts_with("63") {
        return Ok(format!("+{phone}"));
    }
    Ok(phone)
}

/// Parse a number from a JSON number or numeric string and range-check it
pub fn validate_number(
    field: &str,
    value: &serde_json::Value,
    min: Option<f64>,
    max: Option<f64>,
) -> ApiResult<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    let number = match number {
        Some(n) if n.is_finite() => n,
        _ => return Err(field_error(field, "must be a valid number")),
    };

    if let Some(min) = min {
        if number < min {
            return Err(field_error(field, format!("must be at least {min}")));
        }
    }

    if let Some(max) = max {
        if number > max {
            return Err(field_error(field, format!("cannot exceed {max}")));
        }
    }

    Ok(number)
}

/// Validate a coordinate pair object
pub fn validate_coordinates(field: &str, value: &serde_json::Value) -> ApiResult<(f64, f64)> {
    let object = value
        .as_object()
        .ok_or_else(|| field_error(field, "must be an object with lat and lng"))?;

    let lat_value = object
        .get("lat")
        .ok_or_else(|| field_error(field, "is missing lat"))?;
    let lng_value = object
        .get("lng")
        .ok_or_else(|| field_error(field, "is missing lng"))?;

    let lat = validate_number("lat", lat_value, Some(-90.0), Some(90.0))?;
    let lng = validate_number("lng", lng_value, Some(-180.0), Some(180.0))?;

    Ok((lat, lng))
}

/// Validate a date string (RFC 3339 or plain `YYYY-MM-DD`)
pub fn validate_date(field: &str, input: &str) -> ApiResult<chrono::NaiveDate> {
    let text = input.trim();

    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(text) {
        return Ok(datetime.date_naive());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }

    Err(field_error(field, "is not a valid date"))
}

/// Coerce a JSON value into string input for the text-like handlers
fn string_input(field: &str, value: &serde_json::Value) -> ApiResult<String> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Null => Ok(String::new()),
        _ => Err(field_error(field, "must be a string")),
    }
}
