//! Timing-based segmentation of live typing into spurts and paragraphs.
//!
//! Keystrokes flow into a [`segmentation::SpurtRecorder`]; an idle timeout
//! turns each burst into a spurt, which the [`registry::StreamRegistry`]
//! classifies and appends to the active stream. [`projection`] derives the
//! wall, ordered and reversed views on demand.

pub mod engine;
pub mod models;
pub mod projection;
pub mod registry;
pub mod replay;
pub mod segmentation;
pub mod settings;
mod utils;

pub use engine::{SpurtEngine, StreamView};
pub use models::{InputEvent, Spurt, SpurtCandidate, Stream, StreamSummary, ViewMode};
pub use registry::{RegistryEvent, RegistrySnapshot, StreamRegistry};
pub use segmentation::SegmentationConfig;
pub use settings::Settings;

use std::sync::Once;

static LOGGING: Once = Once::new();

/// Initializes `env_logger` once. `RUST_LOG` overrides `level`.
pub fn init_logging(level: log::LevelFilter) {
    LOGGING.call_once(|| {
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();
    });
}
