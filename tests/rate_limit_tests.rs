//! Rate limiter unit tests

use std::time::{Duration, Instant};
use tartrack_client::{ApiError, RateLimiter};

#[test]
fn test_login_scenario_eleven_calls() {
    // 11 calls against limit 10 within one window: 1-10 pass, 11 fails
    let limiter = RateLimiter::new();
    let window = Duration::from_millis(300_000);
    let now = Instant::now();

    for call in 1..=10 {
        assert!(
            limiter.check_at("/login", 10, window, now).is_ok(),
            "call {call} should pass"
        );
    }

    let err = limiter.check_at("/login", 10, window, now).unwrap_err();
    assert!(matches!(err, ApiError::RateLimitExceeded { .. }));
    assert_eq!(err.status_code(), 429);
}

#[test]
fn test_rejection_does_not_consume_budget() {
    let limiter = RateLimiter::new();
    let window = Duration::from_secs(60);
    let now = Instant::now();

    limiter.check_at("/chat/", 1, window, now).unwrap();
    for _ in 0..50 {
        assert!(limiter.check_at("/chat/", 1, window, now).is_err());
    }

    // One window later a single request fits again, which would not hold
    // if rejections had kept incrementing
    let later = now + window;
    assert!(limiter.check_at("/chat/", 1, window, later).is_ok());
    assert!(limiter.check_at("/chat/", 1, window, later).is_err());
}

#[test]
fn test_window_expiry_resets_count() {
    let limiter = RateLimiter::new();
    let window = Duration::from_secs(60);
    let now = Instant::now();

    for _ in 0..3 {
        limiter.check_at("/tourpackage/", 3, window, now).unwrap();
    }
    assert!(limiter.check_at("/tourpackage/", 3, window, now).is_err());

    let after = now + window + Duration::from_millis(1);
    for _ in 0..3 {
        assert!(limiter.check_at("/tourpackage/", 3, window, after).is_ok());
    }
}

#[test]
fn test_buckets_keyed_by_endpoint() {
    let limiter = RateLimiter::new();
    let window = Duration::from_secs(60);
    let now = Instant::now();

    limiter.check_at("/tour-booking/", 1, window, now).unwrap();
    assert!(limiter.check_at("/tour-booking/", 1, window, now).is_err());

    // Sibling endpoints carry their own budgets
    assert!(limiter.check_at("/tourpackage/", 1, window, now).is_ok());
    assert!(limiter
        .check_at("/tour-booking/driver-accept/42/", 1, window, now)
        .is_ok());
}

#[test]
fn test_retry_hint_counts_down() {
    let limiter = RateLimiter::new();
    let window = Duration::from_secs(60);
    let now = Instant::now();

    limiter.check_at("/login", 1, window, now).unwrap();

    let early = limiter.check_at("/login", 1, window, now).unwrap_err();
    let late = limiter
        .check_at("/login", 1, window, now + Duration::from_secs(45))
        .unwrap_err();

    let hint = |err: &ApiError| match err {
        ApiError::RateLimitExceeded { retry_after_ms, .. } => *retry_after_ms,
        other => panic!("unexpected error: {other:?}"),
    };
    assert_eq!(hint(&early), 60_000);
    assert_eq!(hint(&late), 15_000);
}

#[test]
fn test_clear_isolates_tests() {
    let limiter = RateLimiter::new();
    let window = Duration::from_secs(60);

    limiter.check("/login", 1, window).unwrap();
    assert!(limiter.check("/login", 1, window).is_err());

    limiter.clear();
    assert!(limiter.check("/login", 1, window).is_ok());
}

#[test]
fn test_concurrent_checks_never_overshoot() {
    // The check-and-increment is one atomic step; racing threads cannot
    // push a bucket past its limit
    let limiter = std::sync::Arc::new(RateLimiter::new());
    let window = Duration::from_secs(60);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let limiter = limiter.clone();
        handles.push(std::thread::spawn(move || {
            let mut allowed = 0u32;
            for _ in 0..25 {
                if limiter.check("/tour-booking/", 100, window).is_ok() {
                    allowed += 1;
                }
            }
            allowed
        }));
    }

    let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 100);
}
