pub mod events;
pub mod state;

pub use events::RegistryEvent;
pub use state::{RegistrySnapshot, StreamRegistry};
