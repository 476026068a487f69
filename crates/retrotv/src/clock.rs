use std::time::Duration;

use tokio::time::Instant;

/// Wall-clock reference for the "broadcast already in progress" illusion.
///
/// The start instant is captured once when the session comes up; every
/// video load derives its seek position from the time elapsed since then.
pub struct SessionClock {
    start: Instant,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
