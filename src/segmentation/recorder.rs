use crate::models::{SpurtCandidate, MIN_SPURT_DURATION_SECS};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// An armed idle timeout. Only the most recently issued deadline can finish
/// a burst; older generations are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub generation: u64,
    /// Epoch milliseconds at which the burst is considered finished.
    pub due_ms: i64,
}

/// Tracks the in-progress burst for one input session.
///
/// The recorder holds no timer itself: `on_input` hands back the deadline the
/// caller must arm, and the caller reports it back through `finish`. That keeps
/// the live engine and the replay driver on the same state machine.
#[derive(Debug, Default)]
pub struct SpurtRecorder {
    buffer: String,
    start_time: Option<i64>,
    last_keystroke: Option<i64>,
    generation: u64,
    pending: Option<Deadline>,
}

impl SpurtRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a content change carrying the full current text.
    ///
    /// Returns the deadline that replaces any previously pending one.
    pub fn on_input(&mut self, text: &str, now_ms: i64, cut_threshold_ms: u64) -> Deadline {
        let was_empty = self.buffer.is_empty();
        self.buffer.clear();
        self.buffer.push_str(text);

        self.last_keystroke = Some(now_ms);

        // Clock starts on the first character of a fresh burst.
        if was_empty && self.buffer.chars().count() == 1 {
            self.start_time = Some(now_ms);
        }
        // Pastes and programmatic input skip the 0 -> 1 transition.
        if self.start_time.is_none() {
            self.start_time = Some(now_ms);
        }

        self.generation = self.generation.wrapping_add(1);
        let deadline = Deadline {
            generation: self.generation,
            due_ms: now_ms.saturating_add(cut_threshold_ms as i64),
        };
        self.pending = Some(deadline);
        deadline
    }

    /// Finishes the burst if `generation` is still the pending deadline.
    ///
    /// Returns `None` for stale deadlines and for bursts whose trimmed text is
    /// empty. Either way a matching deadline leaves the recorder idle.
    pub fn finish(&mut self, generation: u64, now_ms: i64) -> Option<SpurtCandidate> {
        match self.pending {
            Some(deadline) if deadline.generation == generation => {}
            _ => {
                log_debug!("ignoring stale idle deadline (generation {})", generation);
                return None;
            }
        }

        let text = self.buffer.trim().to_string();
        let start = self.start_time;
        let last = self.last_keystroke;
        self.reset();

        if text.is_empty() {
            log_debug!("discarding empty burst at {}", now_ms);
            return None;
        }

        let typed_ms = match (start, last) {
            (Some(start), Some(last)) => last - start,
            _ => 0,
        };
        let duration = (typed_ms as f64 / 1000.0).max(MIN_SPURT_DURATION_SECS);

        Some(SpurtCandidate {
            text,
            created_at: now_ms,
            duration,
        })
    }

    /// Finishes whatever burst is pending right now, ignoring the timer.
    pub fn flush(&mut self, now_ms: i64) -> Option<SpurtCandidate> {
        let generation = self.pending?.generation;
        self.finish(generation, now_ms)
    }

    pub fn pending(&self) -> Option<Deadline> {
        self.pending
    }

    /// Text of the burst being typed.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// True while a burst has content ("RECORDING" as opposed to "IDLE").
    pub fn is_recording(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.start_time = None;
        self.last_keystroke = None;
        self.pending = None;
    }
}
