use serde::{Deserialize, Serialize};

/// Lowest accepted idle time before a burst is cut into a spurt.
pub const MIN_CUT_THRESHOLD_MS: u64 = 250;
/// Lowest accepted silence before the next spurt opens a paragraph.
pub const MIN_PARAGRAPH_THRESHOLD_MS: u64 = 1000;
/// Step used by the +/- tuning controls.
pub const THRESHOLD_STEP_MS: u64 = 250;

pub const DEFAULT_CUT_THRESHOLD_MS: u64 = 1500;
pub const DEFAULT_PARAGRAPH_THRESHOLD_MS: u64 = 10_000;

/// Configuration for segmentation with tunable thresholds.
///
/// Shared by every stream. Changing a value only affects spurts finished
/// afterwards; stored paragraph flags are never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmentationConfig {
    /// Idle time after the last keystroke that finalizes a burst
    pub cut_threshold_ms: u64,

    /// End-to-start silence between spurts that starts a new paragraph
    pub paragraph_threshold_ms: u64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            cut_threshold_ms: DEFAULT_CUT_THRESHOLD_MS,
            paragraph_threshold_ms: DEFAULT_PARAGRAPH_THRESHOLD_MS,
        }
    }
}

impl SegmentationConfig {
    /// Builds a config, raising each value to its floor.
    pub fn new(cut_threshold_ms: u64, paragraph_threshold_ms: u64) -> Self {
        Self {
            cut_threshold_ms: cut_threshold_ms.max(MIN_CUT_THRESHOLD_MS),
            paragraph_threshold_ms: paragraph_threshold_ms.max(MIN_PARAGRAPH_THRESHOLD_MS),
        }
    }

    /// Same values raised to their floors; used for configs read from disk.
    pub fn clamped(self) -> Self {
        Self::new(self.cut_threshold_ms, self.paragraph_threshold_ms)
    }

    pub fn set_cut_threshold_ms(&mut self, value: u64) {
        self.cut_threshold_ms = value.max(MIN_CUT_THRESHOLD_MS);
    }

    pub fn set_paragraph_threshold_ms(&mut self, value: u64) {
        self.paragraph_threshold_ms = value.max(MIN_PARAGRAPH_THRESHOLD_MS);
    }

    /// Moves the cut threshold by `steps` increments of 250ms.
    pub fn nudge_cut(&mut self, steps: i64) {
        self.set_cut_threshold_ms(nudge(self.cut_threshold_ms, steps));
    }

    /// Moves the paragraph threshold by `steps` increments of 250ms.
    pub fn nudge_paragraph(&mut self, steps: i64) {
        self.set_paragraph_threshold_ms(nudge(self.paragraph_threshold_ms, steps));
    }
}

fn nudge(value: u64, steps: i64) -> u64 {
    let delta = THRESHOLD_STEP_MS.saturating_mul(steps.unsigned_abs());
    if steps >= 0 {
        value.saturating_add(delta)
    } else {
        value.saturating_sub(delta)
    }
}
