// src/checker/rate_limit.rs
// =============================================================================
// A token bucket that bounds how many requests all workers together may start
// per second.
//
// How it works:
// - The bucket holds up to `capacity` tokens (one second worth of requests)
// - Tokens refill continuously at `rate` tokens per second
// - acquire(n) takes n tokens right away, even if that drives the balance
//   below zero, and then sleeps until the debt would have been refilled
//
// Taking the tokens before sleeping means waiters are served in the order
// they asked, and a request for more than `capacity` tokens still finishes.
//
// Time comes from a Clock so tests can use a fake one. The default clock is
// tokio's, which tests can pause and fast-forward.
// =============================================================================

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Source of "now" for the rate limiter
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real clock (follows tokio's paused time in tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// Mutable part of the bucket, guarded by a mutex
#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket shared by every worker of a check run
pub struct RateLimiter {
    rate: f64,
    capacity: f64,
    clock: Box<dyn Clock>,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Creates a full bucket refilling at `rate` tokens per second.
    ///
    /// The caller validates that `rate` is positive and finite.
    pub fn new(rate: f64) -> Self {
        Self::with_clock(rate, Box::new(TokioClock))
    }

    pub fn with_clock(rate: f64, clock: Box<dyn Clock>) -> Self {
        // A bucket smaller than one token could never hand out a request
        let capacity = rate.max(1.0);
        let now = clock.now();

        Self {
            rate,
            capacity,
            clock,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: now,
            }),
        }
    }

    /// Waits until `n` tokens are available, then consumes them.
    ///
    /// Never fails, it only delays.
    pub async fn acquire(&self, n: u32) {
        let wait = self.reserve(n);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    /// Takes `n` tokens only if they are available right now.
    pub fn try_acquire(&self, n: u32) -> bool {
        let mut bucket = self.lock();
        self.refill(&mut bucket);

        let wanted = f64::from(n);
        if bucket.tokens >= wanted {
            bucket.tokens -= wanted;
            true
        } else {
            false
        }
    }

    // Takes `n` tokens unconditionally and returns how long the caller has to
    // wait before using them
    fn reserve(&self, n: u32) -> Duration {
        let mut bucket = self.lock();
        self.refill(&mut bucket);

        bucket.tokens -= f64::from(n);
        if bucket.tokens >= 0.0 {
            Duration::ZERO
        } else {
            // A tiny rate can ask for a wait longer than Duration can hold;
            // tokio's sleep treats Duration::MAX as "far in the future"
            Duration::try_from_secs_f64(-bucket.tokens / self.rate).unwrap_or(Duration::MAX)
        }
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(bucket.last_refill);

        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * self.rate).min(self.capacity);
        bucket.last_refill = now;
    }

    // The bucket is two numbers, a panic elsewhere cannot leave it half-written
    fn lock(&self) -> MutexGuard<'_, Bucket> {
        self.bucket.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Box<dyn Clock>?
//    - dyn Clock is a trait object: "some type that implements Clock"
//    - The real code uses TokioClock, tests plug in a clock they move by hand
//    - Box gives the trait object a fixed size so it fits in the struct
//
// 2. std::sync::Mutex vs tokio::sync::Mutex
//    - The std one blocks the thread while waiting, tokio's yields to the runtime
//    - Only tokio's may be held across an .await; here the lock never is
//
// 3. What is unwrap_or_else(PoisonError::into_inner)?
//    - If a thread panics while holding a lock, the lock becomes "poisoned"
//    - into_inner() takes the data anyway instead of panicking again
// -----------------------------------------------------------------------------
