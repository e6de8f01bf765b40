pub mod clock;
pub mod controller;

pub use clock::{AnchoredClock, Clock};
pub use controller::{SpurtEngine, StreamView};
