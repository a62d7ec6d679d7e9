use crate::types::PacketsPerSecond;
use std::time::{Duration, Instant};

/// A token bucket rate limiter.
///
/// Tokens accrue at the configured rate up to a burst capacity of one, so
/// sustained callers are spaced evenly rather than released in bursts.  Each
/// probe consumes one token and [`RateLimiter::acquire`] blocks the calling
/// thread until one is available.
#[derive(Debug)]
pub struct RateLimiter {
    rate: Option<f64>,
    tokens: f64,
    last_refill: Instant,
}

const BURST_CAPACITY: f64 = 1.0;

impl RateLimiter {
    /// Create a limiter for the given rate.
    ///
    /// An unlimited rate never blocks.
    #[must_use]
    pub fn new(packets_per_second: PacketsPerSecond) -> Self {
        let rate = if packets_per_second.is_unlimited() {
            None
        } else {
            Some(f64::from(packets_per_second.0))
        };
        Self {
            rate,
            tokens: BURST_CAPACITY,
            last_refill: Instant::now(),
        }
    }

    /// Block until a token is available and consume it.
    pub fn acquire(&mut self) {
        loop {
            match self.try_acquire() {
                Ok(()) => return,
                Err(wait) => std::thread::sleep(wait),
            }
        }
    }

    /// Try to consume one token, returning the wait required if none is
    /// available.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        let Some(rate) = self.rate else {
            return Ok(());
        };
        self.refill(rate);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let deficit = 1.0 - self.tokens;
            Err(Duration::from_secs_f64(deficit / rate))
        }
    }

    fn refill(&mut self, rate: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(BURST_CAPACITY);
        self.last_refill = now;
    }
}
