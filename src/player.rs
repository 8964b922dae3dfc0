//! Playback surface backed by an external mpv process.

mod external;
mod ipc;

pub use external::{ExternalPlayer, expand_args};

#[cfg(test)]
mod tests;
