//! Request rate limiting for the generation endpoint.
//!
//! A sliding-window log limiter: every accepted request leaves a timestamp,
//! and a caller is rejected while it has `limit` timestamps inside the
//! trailing window. Unlike a counter with a periodic reset, a burst right
//! before a reset cannot pass twice the intended rate.
//!
//! State lives in an explicitly constructed [`RateLimiter`]; there is no
//! process-wide instance. The limiter is per process, so N instances of a
//! service admit up to N times the configured limit.

pub mod clock;
pub mod identity;
pub mod limiter;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use identity::{Identity, UNKNOWN_IDENTITY};
pub use limiter::{RateLimitConfig, RateLimiter};
