use std::time::Instant;

use thiserror::Error;

use crate::error::SessionError;
use crate::library::ByteSource;

use super::types::SurfaceEvent;

/// The surface refused to start playing on its own; the user has to press
/// play.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("playback start was blocked: {0}")]
pub struct PlayRejected(pub String);

/// Whatever actually shows the video.
///
/// Events are pulled with [`drain_events`](Self::drain_events) from the
/// event loop, each tagged with the key passed to [`load`](Self::load).
pub trait PlaybackSurface {
    /// Assign a new source. Any previous source is detached first, so no
    /// further events are produced for it.
    fn load(&mut self, key: &str, source: &ByteSource) -> Result<(), SessionError>;
    /// Detach the current source.
    fn unload(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_rate(&mut self, rate: f64);
    fn play(&mut self) -> Result<(), PlayRejected>;
    fn pause(&mut self);
    /// Current position in seconds.
    fn position(&self) -> f64;
    fn drain_events(&mut self, now: Instant) -> Vec<SurfaceEvent>;
}
