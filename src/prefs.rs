//! Playback preferences and the flat key-value store they persist to.

mod preferences;
mod store;

pub use preferences::{AUTOPLAY_KEY, PlaybackPreferences, RATE_KEY};
pub use store::{KeyValueStore, MemoryStore, TomlFileStore};
