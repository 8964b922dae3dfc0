//! State and event types shared by the controller and playback surfaces.

/// Where the session is in the load/play cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Source assigned, waiting for metadata.
    Loading,
    Playing,
    Paused,
    Ended,
}

impl PlayerState {
    pub fn label(self) -> &'static str {
        match self {
            PlayerState::Idle => "Idle",
            PlayerState::Loading => "Loading",
            PlayerState::Playing => "Playing",
            PlayerState::Paused => "Paused",
            PlayerState::Ended => "Ended",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEventKind {
    /// The source is ready; `duration` is in seconds when known.
    MetadataReady { duration: Option<f64> },
    TimeUpdate { current_time: f64, duration: Option<f64> },
    RateChange(f64),
    /// Playback reached the end of the video.
    Ended,
    /// The player went away cleanly before the end, e.g. its window was
    /// closed.
    Closed,
    /// The player could not show the video.
    Failed(String),
}

/// A signal from the playback surface, tagged with the identifying path of
/// the source it was produced for.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceEvent {
    pub key: String,
    pub kind: SurfaceEventKind,
}

impl SurfaceEvent {
    pub fn new(key: impl Into<String>, kind: SurfaceEventKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}
