//! The playback session: one controller per browsing session, driving a
//! playback surface from the playlist, progress and preferences.

mod controller;
mod surface;
mod types;

pub use controller::{PlayerSession, SessionSettings};
pub use surface::{PlayRejected, PlaybackSurface};
pub use types::{PlayerState, SurfaceEvent, SurfaceEventKind};
