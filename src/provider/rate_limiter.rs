//! Request pacing using a token bucket.
//!
//! The provider answers HTTP 429 once its quota is exceeded and a 429 aborts
//! the run, so requests are spread out before they are sent.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Token bucket rate limiter
pub struct RateLimiter {
    state: Arc<Mutex<RateLimiterState>>,
}

struct RateLimiterState {
    tokens: f64,
    last_update: Instant,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
    min_delay: Duration,
    /// Earliest instant the next request may be sent
    next_slot: Instant,
}

impl RateLimiterState {
    fn new(requests_per_minute: u32, min_delay: Duration, now: Instant) -> Self {
        let max_tokens = f64::from(requests_per_minute.max(1));
        Self {
            tokens: max_tokens,
            last_update: now,
            max_tokens,
            refill_rate: max_tokens / 60.0,
            min_delay,
            next_slot: now,
        }
    }

    /// Take one token and return how long the caller must wait before sending
    fn reserve(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_update = now;

        let token_wait = if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.refill_rate)
        };
        // The token earned while waiting is spent by this request
        self.tokens -= 1.0;

        let send_at = (now + token_wait).max(self.next_slot);
        self.next_slot = send_at + self.min_delay;
        send_at.saturating_duration_since(now)
    }
}

impl RateLimiter {
    /// Create a new rate limiter allowing `requests_per_minute` sustained,
    /// never sending two requests closer than `min_delay`
    pub fn new(requests_per_minute: u32, min_delay: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimiterState::new(
                requests_per_minute,
                min_delay,
                Instant::now(),
            ))),
        }
    }

    /// Acquire a token, waiting if necessary
    pub async fn acquire(&self) {
        let delay = {
            let mut state = self.state.lock().await;
            state.reserve(Instant::now())
        };

        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Pacing provider request");
            tokio::time::sleep(delay).await;
        }
    }
}
