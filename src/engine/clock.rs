use chrono::Utc;
use tokio::time::Instant;

/// Source of epoch-millisecond timestamps for keystrokes and completions.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock epoch captured once, advanced by a monotonic anchor.
///
/// Timestamps cannot jump backwards when the system clock is adjusted, and
/// they follow tokio's clock, so paused-time tests see exact values.
#[derive(Debug, Clone)]
pub struct AnchoredClock {
    epoch_ms: i64,
    anchor: Instant,
}

impl AnchoredClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now().timestamp_millis())
    }

    pub fn starting_at(epoch_ms: i64) -> Self {
        Self {
            epoch_ms,
            anchor: Instant::now(),
        }
    }
}

impl Default for AnchoredClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for AnchoredClock {
    fn now_ms(&self) -> i64 {
        self.epoch_ms
            .saturating_add(self.anchor.elapsed().as_millis() as i64)
    }
}
