use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::PlaybackSettings;
use crate::error::SessionError;
use crate::library::{ByteSource, DirectoryAccess, VideoEntry};
use crate::playlist::VideoPlaylist;
use crate::prefs::PlaybackPreferences;
use crate::progress::ProgressStore;

use super::surface::PlaybackSurface;
use super::types::{PlayerState, SurfaceEvent, SurfaceEventKind};

const RATE_EPSILON: f64 = 1e-9;

/// Session tuning taken from the `[playback]` settings.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Pause between a video ending and the next one loading.
    pub autoplay_delay: Duration,
    /// Rate ladder walked by [`PlayerSession::step_rate`], ascending.
    pub rates: Vec<f64>,
}

impl From<&PlaybackSettings> for SessionSettings {
    fn from(s: &PlaybackSettings) -> Self {
        let mut rates = s.rates.clone();
        rates.sort_by(f64::total_cmp);
        rates.dedup();
        Self {
            autoplay_delay: Duration::from_millis(s.autoplay_delay_ms),
            rates,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&PlaybackSettings::default())
    }
}

/// An autoplay advance waiting for its delay to pass.
#[derive(Debug, Clone)]
struct PendingAdvance {
    key: String,
    due: Instant,
}

/// Owns the playlist, progress and preferences of one browsing session and
/// drives the playback surface through `Idle → Loading → Playing/Paused →
/// Ended`.
pub struct PlayerSession<S, A> {
    surface: S,
    access: A,
    settings: SessionSettings,

    playlist: VideoPlaylist,
    progress: ProgressStore,
    prefs: PlaybackPreferences,

    state: PlayerState,
    active: Option<VideoEntry>,
    source: Option<ByteSource>,
    duration: Option<f64>,
    pending_advance: Option<PendingAdvance>,
    notice: Option<String>,
}

impl<S: PlaybackSurface, A: DirectoryAccess> PlayerSession<S, A> {
    pub fn new(
        surface: S,
        access: A,
        prefs: PlaybackPreferences,
        settings: SessionSettings,
    ) -> Self {
        Self {
            surface,
            access,
            settings,
            playlist: VideoPlaylist::new(),
            progress: ProgressStore::new(),
            prefs,
            state: PlayerState::Idle,
            active: None,
            source: None,
            duration: None,
            pending_advance: None,
            notice: None,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn playlist(&self) -> &VideoPlaylist {
        &self.playlist
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn prefs(&self) -> &PlaybackPreferences {
        &self.prefs
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[cfg(test)]
    pub(crate) fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The video currently assigned to the surface.
    pub fn active(&self) -> Option<&VideoEntry> {
        self.active.as_ref()
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active.as_ref().map(|e| e.identifying_path.as_str())
    }

    /// Duration of the active video, once known.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn position(&self) -> f64 {
        self.surface.position()
    }

    /// A one-off hint for the user, e.g. that playback needs a manual start.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance.is_some()
    }

    /// Replace the playlist with the videos of a freshly listed folder.
    pub fn rebuild_playlist(&mut self, entries: Vec<VideoEntry>) {
        debug!(count = entries.len(), "rebuilding playlist");
        self.playlist.rebuild(entries);
    }

    /// Load the playlist video called `name`.
    pub fn select_video(&mut self, name: &str) -> Result<(), SessionError> {
        let previous = self.playlist.current_index();
        if self.playlist.select_by_name(name).is_none() {
            return Err(SessionError::UnknownVideo(name.to_string()));
        }
        self.load_current(previous)
    }

    /// Load the following video. `Ok(false)` when there is none.
    pub fn next(&mut self) -> Result<bool, SessionError> {
        let previous = self.playlist.current_index();
        if self.playlist.next().is_none() {
            return Ok(false);
        }
        self.load_current(previous).map(|()| true)
    }

    /// Load the preceding video. `Ok(false)` when there is none.
    pub fn previous(&mut self) -> Result<bool, SessionError> {
        let previous = self.playlist.current_index();
        if self.playlist.previous().is_none() {
            return Ok(false);
        }
        self.load_current(previous).map(|()| true)
    }

    fn load_current(&mut self, previous: Option<usize>) -> Result<(), SessionError> {
        let Some(entry) = self.playlist.current().cloned() else {
            return Ok(());
        };
        self.load(entry, previous)
    }

    /// Load `entry`, whose playlist position is already current. On failure
    /// the cursor goes back to `previous`, or nowhere once the old video is
    /// gone too.
    fn load(&mut self, entry: VideoEntry, previous: Option<usize>) -> Result<(), SessionError> {
        // Opening first leaves everything untouched when the file is unreadable.
        let source = match self.access.open_bytes(&entry.handle) {
            Ok(source) => source,
            Err(e) => {
                self.playlist.restore(previous);
                return Err(e.into());
            }
        };

        self.surface.unload();
        self.release_source();
        self.pending_advance = None;
        self.notice = None;
        self.duration = None;

        if let Err(e) = self.surface.load(&entry.identifying_path, &source) {
            self.active = None;
            self.state = PlayerState::Idle;
            self.playlist.restore(None);
            return Err(e);
        }

        info!(
            key = %entry.identifying_path,
            mime = source.mime(),
            bytes = source.size(),
            "loading video"
        );
        self.source = Some(source);
        self.active = Some(entry);
        self.state = PlayerState::Loading;
        Ok(())
    }

    fn release_source(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
        }
    }

    /// Feed one surface signal into the state machine. Signals for any key
    /// other than the active one are stale and dropped.
    ///
    /// A `Failed` signal unloads the video and comes back as an error.
    pub fn handle_event(&mut self, event: SurfaceEvent, now: Instant) -> Result<(), SessionError> {
        if self.active_key() != Some(event.key.as_str()) {
            debug!(key = %event.key, kind = ?event.kind, "ignoring stale surface event");
            return Ok(());
        }

        match event.kind {
            SurfaceEventKind::MetadataReady { duration } => self.on_metadata(duration),
            SurfaceEventKind::TimeUpdate {
                current_time,
                duration,
            } => {
                if duration.is_some() {
                    self.duration = duration;
                }
                if matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
                    if let Some(d) = self.duration {
                        self.progress.record(&event.key, current_time, d);
                    }
                }
            }
            SurfaceEventKind::RateChange(rate) => self.prefs.set_rate(rate),
            SurfaceEventKind::Ended => self.on_ended(now),
            SurfaceEventKind::Closed => self.on_closed(),
            SurfaceEventKind::Failed(reason) => {
                warn!(key = %event.key, %reason, "playback failed");
                self.stop();
                return Err(SessionError::Surface(reason));
            }
        }
        Ok(())
    }

    fn on_metadata(&mut self, duration: Option<f64>) {
        if self.state != PlayerState::Loading {
            return;
        }
        self.duration = duration;

        let resume_at = self
            .active_key()
            .and_then(|key| self.progress.get(key))
            .map(|r| r.current_time)
            .filter(|&t| t > 0.0);
        if let Some(t) = resume_at {
            debug!(seconds = t, "resuming from saved position");
            self.surface.seek(t);
        }
        self.surface.set_rate(self.prefs.rate());
        self.start_playback();
    }

    fn start_playback(&mut self) {
        match self.surface.play() {
            Ok(()) => {
                self.state = PlayerState::Playing;
                self.notice = None;
            }
            Err(rejected) => {
                info!(reason = %rejected, "playback start rejected; waiting for play");
                self.state = PlayerState::Paused;
                self.notice = Some("Press play to start the video".to_string());
            }
        }
    }

    fn on_ended(&mut self, now: Instant) {
        if !matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
            return;
        }
        self.state = PlayerState::Ended;

        if self.prefs.autoplay() && self.playlist.has_next() {
            if let Some(key) = self.active_key().map(str::to_string) {
                debug!(%key, delay = ?self.settings.autoplay_delay, "scheduling autoplay");
                self.pending_advance = Some(PendingAdvance {
                    key,
                    due: now + self.settings.autoplay_delay,
                });
            }
        }
    }

    /// The player went away before the end. Not a finish: no autoplay.
    fn on_closed(&mut self) {
        match self.state {
            PlayerState::Loading => {
                self.stop();
                self.notice = Some("Player closed".to_string());
            }
            PlayerState::Playing | PlayerState::Paused => {
                self.state = PlayerState::Paused;
                self.notice = Some("Player closed; press play to reopen".to_string());
            }
            PlayerState::Idle | PlayerState::Ended => {}
        }
    }

    /// Fire a due autoplay advance. Returns whether a new video was loaded.
    ///
    /// The advance is dropped if the user moved to another video, resumed
    /// playback or switched autoplay off in the meantime.
    pub fn tick(&mut self, now: Instant) -> Result<bool, SessionError> {
        let Some(pending) = self.pending_advance.take_if(|p| now >= p.due) else {
            return Ok(false);
        };
        if self.state != PlayerState::Ended
            || self.active_key() != Some(pending.key.as_str())
            || !self.prefs.autoplay()
        {
            debug!(key = %pending.key, "dropping outdated autoplay advance");
            return Ok(false);
        }
        self.next()
    }

    /// Start or resume playback. From `Ended` the video restarts.
    pub fn play(&mut self) {
        match self.state {
            PlayerState::Paused => self.start_playback(),
            PlayerState::Ended => {
                self.pending_advance = None;
                self.surface.seek(0.0);
                self.start_playback();
            }
            PlayerState::Idle | PlayerState::Loading | PlayerState::Playing => {}
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlayerState::Playing {
            self.surface.pause();
            self.state = PlayerState::Paused;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            PlayerState::Playing => self.pause(),
            _ => self.play(),
        }
    }

    /// Unload the active video and return to `Idle`.
    pub fn stop(&mut self) {
        self.surface.unload();
        self.release_source();
        self.active = None;
        self.duration = None;
        self.pending_advance = None;
        self.notice = None;
        self.state = PlayerState::Idle;
    }

    /// Move the playhead by `delta` seconds, staying within the video.
    pub fn seek_by(&mut self, delta: f64) {
        if !matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
            return;
        }
        let mut target = (self.surface.position() + delta).max(0.0);
        if let Some(d) = self.duration {
            target = target.min(d);
        }
        self.surface.seek(target);
    }

    /// Ask for a new playback rate. With a video loaded the surface applies
    /// it and reports back through a rate-change signal.
    pub fn request_rate(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            warn!(rate, "ignoring invalid rate request");
            return;
        }
        if self.active.is_some() {
            self.surface.set_rate(rate);
        } else {
            self.prefs.set_rate(rate);
        }
    }

    /// Move one step up (`faster`) or down the configured rate ladder.
    pub fn step_rate(&mut self, faster: bool) {
        let current = self.prefs.rate();
        let target = if faster {
            self.settings
                .rates
                .iter()
                .copied()
                .find(|&r| r > current + RATE_EPSILON)
        } else {
            self.settings
                .rates
                .iter()
                .rev()
                .copied()
                .find(|&r| r < current - RATE_EPSILON)
        };
        if let Some(rate) = target {
            self.request_rate(rate);
        }
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        self.prefs.set_autoplay(enabled);
        if !enabled {
            self.pending_advance = None;
        }
    }

    pub fn toggle_autoplay(&mut self) {
        let enabled = !self.prefs.autoplay();
        self.set_autoplay(enabled);
    }

    /// Drain pending surface signals into the state machine. Every signal is
    /// handled; the first failure is returned.
    pub fn pump_surface(&mut self, now: Instant) -> Result<(), SessionError> {
        let mut outcome = Ok(());
        for event in self.surface.drain_events(now) {
            outcome = outcome.and(self.handle_event(event, now));
        }
        outcome
    }

    /// Release everything held for playback; called once when the session ends.
    pub fn shutdown(&mut self) {
        self.stop();
        info!("playback session closed");
    }
}
