//! Rate limiter with a per-second spacing floor and a rolling per-minute cap.
//!
//! A single instance is shared by every task that talks to the API, so both
//! caps apply to the process as a whole. Callers are serialized through the
//! internal lock, which stays held while a caller sleeps.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, sleep_until, Instant};

const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter with dual constraints (per-second and per-minute)
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two requests
    min_interval: Duration,
    /// Maximum requests in any 60 second span
    max_per_minute: u32,
    state: Mutex<WindowState>,
}

#[derive(Debug)]
struct WindowState {
    last_request: Option<Instant>,
    /// Release times of the requests made in the last minute, oldest first
    recent_requests: VecDeque<Instant>,
}

impl WindowState {
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.recent_requests.front() {
            if now.duration_since(oldest) < WINDOW {
                break;
            }
            self.recent_requests.pop_front();
        }
    }
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// `max_per_second` must be positive; `max_per_minute` is clamped to at least 1.
    pub fn new(max_per_second: f64, max_per_minute: u32) -> Self {
        let max_per_minute = max_per_minute.max(1);
        Self {
            min_interval: Duration::from_secs_f64(1.0 / max_per_second),
            max_per_minute,
            state: Mutex::new(WindowState {
                last_request: None,
                recent_requests: VecDeque::with_capacity(max_per_minute as usize),
            }),
        }
    }

    /// Wait until a request can be made, respecting both rate limits
    pub async fn wait(&self) {
        let mut state = self.state.lock().await;

        // Per-second floor
        if let Some(last) = state.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!(
                    wait_ms = wait_time.as_millis(),
                    "Rate limit: waiting for per-second limit"
                );
                sleep(wait_time).await;
            }
        }

        state.prune(Instant::now());

        // Per-minute cap: wait for the oldest request to leave the window
        if state.recent_requests.len() >= self.max_per_minute as usize {
            if let Some(&oldest) = state.recent_requests.front() {
                let release_at = oldest + WINDOW;
                tracing::debug!(
                    wait_ms = release_at.saturating_duration_since(Instant::now()).as_millis(),
                    requests = state.recent_requests.len(),
                    "Rate limit: waiting for per-minute limit"
                );
                sleep_until(release_at).await;
            }
            state.prune(Instant::now());
        }

        let now = Instant::now();
        state.recent_requests.push_back(now);
        state.last_request = Some(now);
    }

    /// Get the number of requests made in the last 60 seconds
    pub async fn current_minute_count(&self) -> u32 {
        let mut state = self.state.lock().await;
        state.prune(Instant::now());
        state.recent_requests.len() as u32
    }
}
