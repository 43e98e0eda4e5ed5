// Request pacing for rate-limited providers.
//
// Perspective's free tier allows 1 QPS. The pacer hands out send slots
// spaced at least `interval` apart: each caller reserves the next free
// slot under the lock, then sleeps until its slot outside the lock, so
// a slow sleeper never blocks other reservations.

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};

pub struct RequestPacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestPacer {
    /// A pacer that allows one request per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Reserve the next send slot and wait for it.
    pub async fn pace(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(t) if t > now => t,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };
        sleep_until(slot).await;
    }
}
