pub mod classifier;
pub mod config;
pub mod recorder;

pub use classifier::{gap_ms, is_paragraph_start};
pub use config::SegmentationConfig;
pub use recorder::{Deadline, SpurtRecorder};
