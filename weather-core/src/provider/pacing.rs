use std::time::Duration;

use tokio::{sync::Mutex, time::Instant};

/// Enforces a minimum spacing between consecutive outbound requests.
///
/// This is a bucket of one: the first call goes through immediately and
/// every later call sleeps until `delay` has passed since the previous one.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, last_request: Mutex::new(None) }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait until a request may be issued and mark it as issued.
    ///
    /// Returns how long the caller was held back.
    pub async fn wait_turn(&self) -> Duration {
        // Held across the sleep so concurrent callers queue behind each other.
        let mut last = self.last_request.lock().await;

        let wait = match *last {
            Some(prev) => self.delay.saturating_sub(prev.elapsed()),
            None => Duration::ZERO,
        };

        if !wait.is_zero() {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "pacing outbound request");
            tokio::time::sleep(wait).await;
        }

        *last = Some(Instant::now());
        wait
    }
}
