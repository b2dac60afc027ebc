//! Endpoint payload policies
//!
//! Maps endpoint paths to the field rules their JSON payloads must pass.
//! Payloads with no matching policy still get every string field
//! sanitized before the request leaves the device.

use crate::security::sanitize::sanitize_json_strings;
use crate::security::validation::{validate_value, ValidationRule};
use crate::utils::error::{helpers::field_error, ApiResult};

/// Field rules applied to endpoints whose path contains a marker
#[derive(Debug, Clone)]
pub struct EndpointRules {
    pub endpoint_contains: String,
    pub fields: Vec<(String, ValidationRule)>,
}

/// Registry of payload rules, checked in registration order
#[derive(Debug, Clone, Default)]
pub struct PayloadPolicy {
    rules: Vec<EndpointRules>,
}

impl PayloadPolicy {
    /// Empty policy; every payload falls through to generic sanitization
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules the TarTrack endpoints expect
    pub fn standard() -> Self {
        let mut policy = Self::new();

        policy.register(
            "booking",
            vec![
                ("contact_number".to_string(), ValidationRule::Phone { required: true }),
                ("pickup".to_string(), ValidationRule::Coordinates { required: false }),
                ("dropoff".to_string(), ValidationRule::Coordinates { required: false }),
                ("date".to_string(), ValidationRule::Date { required: false }),
                (
                    "number_of_passengers".to_string(),
                    ValidationRule::Number {
                        required: false,
                        min: Some(1.0),
                        max: Some(20.0),
                    },
                ),
                (
                    "special_requests".to_string(),
                    ValidationRule::Text {
                        required: false,
                        min_length: None,
                        max_length: Some(500),
                        pattern: None,
                    },
                ),
            ],
        );

        let auth_fields = vec![
            ("email".to_string(), ValidationRule::Email { required: true }),
            (
                "password".to_string(),
                ValidationRule::Text {
                    required: true,
                    min_length: Some(8),
                    max_length: Some(128),
                    pattern: None,
                },
            ),
        ];
        policy.register("login", auth_fields.clone());
        policy.register("register", auth_fields);

        policy
    }

    /// Add a rule set for endpoints containing `marker`
    pub fn register(&mut self, marker: impl Into<String>, fields: Vec<(String, ValidationRule)>) {
        self.rules.push(EndpointRules {
            endpoint_contains: marker.into(),
            fields,
        });
    }

    /// Validate and normalize a JSON payload in place for `endpoint`
    ///
    /// String fields are sanitized first; a matching rule set then
    /// validates its fields and writes the normalized values back.
    pub fn apply(&self, endpoint: &str, body: &mut serde_json::Value) -> ApiResult<()> {
        sanitize_json_strings(body);

        let Some(rules) = self
            .rules
            .iter()
            .find(|r| endpoint.contains(&r.endpoint_contains))
        else {
            return Ok(());
        };

        let Some(object) = body.as_object_mut() else {
            // Array payloads only get the generic sanitization pass
            return Ok(());
        };

        for (field, rule) in &rules.fields {
            match object.get(field) {
                Some(value) => {
                    let normalized = validate_value(field, value, rule)?;
                    object.insert(field.clone(), normalized);
                }
                None if rule.is_required() => {
                    return Err(field_error(field, "is required"));
                }
                None => {}
            }
        }

        Ok(())
    }
}
