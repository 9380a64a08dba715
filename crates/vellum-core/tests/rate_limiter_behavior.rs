use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use vellum_core::rate_limit::{ManualClock, RateLimitConfig, RateLimiter};
use vellum_core::VellumError;

const WINDOW: Duration = Duration::from_millis(60_000);

fn limiter_with(config: RateLimitConfig) -> (RateLimiter<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let limiter = RateLimiter::with_clock(config, clock.clone()).expect("valid config");
    (limiter, clock)
}

#[test]
fn test_eleventh_request_rejected_then_recovers() {
    let (limiter, clock) = limiter_with(RateLimitConfig::new(10, WINDOW));

    for i in 1..=10 {
        assert!(limiter.check(Some("X")).is_ok(), "request {} should pass", i);
    }
    assert!(matches!(
        limiter.check(Some("X")),
        Err(VellumError::RateLimitExceeded)
    ));

    clock.advance(WINDOW + Duration::from_millis(1));
    assert!(limiter.check(Some("X")).is_ok());
}

#[test]
fn test_forwarded_header_attributed_to_first_hop() {
    let (limiter, _clock) = limiter_with(RateLimitConfig::new(10, WINDOW));

    limiter.check(Some("10.0.0.1, 192.168.1.1")).unwrap();
    for _ in 0..9 {
        limiter.check(Some("10.0.0.1")).unwrap();
    }

    assert!(limiter.check(Some("10.0.0.1")).is_err());
    assert_eq!(limiter.tracked_identities(), 1);
}

#[test]
fn test_concurrent_identity_has_independent_budget() {
    let (limiter, _clock) = limiter_with(RateLimitConfig::new(5, WINDOW));

    thread::scope(|scope| {
        let a = scope.spawn(|| {
            let results: Vec<bool> = (0..6).map(|_| limiter.check(Some("A")).is_ok()).collect();
            results
        });
        let b = scope.spawn(|| limiter.check(Some("B")).is_ok());

        let a_results = a.join().expect("thread A");
        assert_eq!(a_results, vec![true, true, true, true, true, false]);
        assert!(b.join().expect("thread B"));
    });
}

#[test]
fn test_concurrent_callers_never_exceed_limit() {
    let limit = 50;
    let (limiter, _clock) = limiter_with(RateLimitConfig::new(limit, WINDOW));
    let accepted = AtomicUsize::new(0);
    let rejected = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..16 {
            scope.spawn(|| {
                for _ in 0..20 {
                    match limiter.check(Some("hot-identity")) {
                        Ok(()) => accepted.fetch_add(1, Ordering::SeqCst),
                        Err(_) => rejected.fetch_add(1, Ordering::SeqCst),
                    };
                }
            });
        }
    });

    assert_eq!(accepted.load(Ordering::SeqCst), limit);
    assert_eq!(rejected.load(Ordering::SeqCst), 16 * 20 - limit);
}

#[test]
fn test_explicit_sweep_clears_expired_identities() {
    let (limiter, clock) = limiter_with(RateLimitConfig {
        sweep_threshold: usize::MAX,
        ..RateLimitConfig::new(10, WINDOW)
    });

    for i in 0..5_000 {
        limiter.check(Some(&format!("198.51.100.{}", i))).unwrap();
    }
    assert_eq!(limiter.tracked_identities(), 5_000);

    clock.advance(WINDOW + Duration::from_millis(1));
    assert_eq!(limiter.sweep(), 5_000);
    assert_eq!(limiter.tracked_identities(), 0);
}

#[test]
fn test_opportunistic_sweep_bounds_map() {
    let (limiter, clock) = limiter_with(RateLimitConfig {
        sweep_threshold: 100,
        ..RateLimitConfig::new(10, WINDOW)
    });

    for i in 0..1_000 {
        limiter.check(Some(&format!("spoofed-{}", i))).unwrap();
    }
    // Nothing has expired yet, so all of them are still live.
    assert_eq!(limiter.tracked_identities(), 1_000);

    clock.advance(WINDOW + Duration::from_millis(1));
    limiter.check(Some("fresh")).unwrap();

    assert_eq!(limiter.tracked_identities(), 1);
}

#[test]
fn test_separate_limiters_do_not_share_state() {
    let (first, _c1) = limiter_with(RateLimitConfig::new(1, WINDOW));
    let (second, _c2) = limiter_with(RateLimitConfig::new(1, WINDOW));

    first.check(Some("X")).unwrap();
    assert!(first.check(Some("X")).is_err());
    assert!(second.check(Some("X")).is_ok());
}
