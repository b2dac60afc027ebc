//! Validator and sanitizer unit tests

use tartrack_client::security::{
    sanitize_text, validate_coordinates, validate_date, validate_email, validate_number,
    validate_phone, validate_text, validate_value, ValidationRule,
};

#[test]
fn test_phone_normalization() {
    // Local 09 form normalizes to the international form
    assert_eq!(validate_phone("09171234567").unwrap(), "+639171234567");
    assert_eq!(validate_phone("09998887766").unwrap(), "+639998887766");

    // International form passes through unchanged
    assert_eq!(validate_phone("+639171234567").unwrap(), "+639171234567");
}

#[test]
fn test_phone_rejects_everything_else() {
    let invalid = [
        "",
        "09-not-a-number",
        "9171234567",    // missing leading 0
        "0917123456",    // one digit short
        "091712345678",  // one digit long
        "+6391712345",   // short international
        "+19171234567",  // wrong country
        "call me maybe",
    ];
    for input in invalid {
        assert!(validate_phone(input).is_err(), "accepted {input:?}");
    }
}

#[test]
fn test_email_validation() {
    assert_eq!(
        validate_email("Tourist@Example.COM").unwrap(),
        "tourist@example.com"
    );

    let err = validate_email("not-an-email").unwrap_err();
    assert!(err.to_string().contains("Invalid email format"));

    assert!(validate_email("a@b").is_err());
    assert!(validate_email("a b@c.d").is_err());

    // 254 character ceiling
    let long_local = "a".repeat(250);
    assert!(validate_email(&format!("{long_local}@example.com")).is_err());
}

#[test]
fn test_sanitizer_strips_active_content() {
    let dirty = r#"Hello <script>document.cookie</script><iframe src="x"></iframe> visit javascript:alert(1) onclick=run() eval(payload) window.name"#;
    let clean = sanitize_text(dirty);

    assert!(!clean.contains("<script>"));
    assert!(!clean.contains("<iframe"));
    assert!(!clean.to_lowercase().contains("javascript:"));
    assert!(!clean.to_lowercase().contains("onclick="));
    assert!(!clean.contains("eval("));
    assert!(!clean.contains("document."));
    assert!(!clean.contains("window."));
    assert!(clean.contains("Hello"));
}

#[test]
fn test_sanitizer_is_idempotent() {
    let inputs = [
        "plain tartanilla ride",
        "<b>Plaza Independencia</b> tour",
        "&lt;script&gt;alert(1)&lt;/script&gt;",
        "nested <scr<script>ipt>alert(1)</scr</script>ipt> payload",
    ];
    for input in inputs {
        let once = sanitize_text(input);
        let twice = sanitize_text(&once);
        assert_eq!(once, twice, "second pass changed {input:?}");
    }
}

#[test]
fn test_number_scenarios() {
    let in_range = validate_number("seats", &serde_json::json!("15"), Some(1.0), Some(20.0));
    assert_eq!(in_range.unwrap(), 15.0);

    let over = validate_number("seats", &serde_json::json!("25"), Some(1.0), Some(20.0));
    let err = over.unwrap_err();
    assert!(err.to_string().contains("cannot exceed 20"));

    let not_numeric = validate_number("seats", &serde_json::json!("a lot"), None, None);
    assert!(not_numeric.unwrap_err().to_string().contains("seats"));

    let from_number = validate_number("fare", &serde_json::json!(120.5), Some(0.0), None);
    assert_eq!(from_number.unwrap(), 120.5);
}

#[test]
fn test_coordinate_bounds() {
    let plaza = serde_json::json!({"lat": 10.2926, "lng": 123.9058});
    assert!(validate_coordinates("pickup", &plaza).is_ok());

    for bad in [
        serde_json::json!({"lat": -90.5, "lng": 0.0}),
        serde_json::json!({"lat": 0.0, "lng": 180.5}),
        serde_json::json!({"lat": 10.0}),
        serde_json::json!([10.0, 123.0]),
    ] {
        assert!(validate_coordinates("pickup", &bad).is_err(), "accepted {bad}");
    }
}

#[test]
fn test_date_parsing() {
    assert!(validate_date("date", "2026-08-07").is_ok());
    assert!(validate_date("date", "2026-08-07T14:00:00+08:00").is_ok());
    assert!(validate_date("date", "08/07/2026").is_err());
    assert!(validate_date("date", "soon").is_err());
}

#[test]
fn test_text_constraints() {
    let err = validate_text("username", "", true, None, None, None).unwrap_err();
    assert!(err.to_string().contains("username"));
    assert!(err.to_string().contains("required"));

    let err = validate_text("username", "ab", false, Some(3), Some(30), None).unwrap_err();
    assert!(err.to_string().contains("at least 3"));

    let pattern = regex::Regex::new(r"^[a-z0-9_]+$").unwrap();
    let err = validate_text("username", "Has Spaces", false, None, None, Some(&pattern)).unwrap_err();
    assert!(err.to_string().contains("invalid format"));

    let ok = validate_text("username", "kutsero_01", true, Some(3), Some(30), Some(&pattern));
    assert_eq!(ok.unwrap(), "kutsero_01");
}

#[test]
fn test_rule_dispatch_normalizes_values() {
    let phone_rule = ValidationRule::Phone { required: true };
    assert_eq!(
        validate_value("contact_number", &serde_json::json!("09171234567"), &phone_rule).unwrap(),
        serde_json::json!("+639171234567")
    );

    let email_rule = ValidationRule::Email { required: true };
    assert_eq!(
        validate_value("email", &serde_json::json!("A@B.Com"), &email_rule).unwrap(),
        serde_json::json!("a@b.com")
    );

    let coord_rule = ValidationRule::Coordinates { required: false };
    let normalized = validate_value(
        "pickup",
        &serde_json::json!({"lat": "10.3", "lng": "123.9"}),
        &coord_rule,
    )
    .unwrap();
    assert_eq!(normalized["lat"], 10.3);
    assert_eq!(normalized["lng"], 123.9);
}

#[test]
fn test_optional_fields_accept_empty() {
    let rule = ValidationRule::Phone { required: false };
    assert_eq!(
        validate_value("contact_number", &serde_json::json!(""), &rule).unwrap(),
        serde_json::json!("")
    );

    let rule = ValidationRule::Date { required: false };
    assert_eq!(
        validate_value("date", &serde_json::Value::Null, &rule).unwrap(),
        serde_json::json!("")
    );
}
