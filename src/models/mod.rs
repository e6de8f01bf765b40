pub mod input;
pub mod spurt;
pub mod stream;

pub use input::InputEvent;
pub use spurt::{Spurt, SpurtCandidate, MIN_SPURT_DURATION_SECS};
pub use stream::{Stream, StreamSummary, ViewMode, DEFAULT_FIRST_STREAM_TITLE, DEFAULT_STREAM_TITLE};
