use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::{PlaybackSettings, PlayerSettings};
use crate::error::SessionError;
use crate::library::ByteSource;
use crate::session::{PlayRejected, PlaybackSurface, SurfaceEvent, SurfaceEventKind};

use super::ipc::{IpcError, MpvClient};

/// How long a freshly launched player may take to open its socket and
/// report a duration.
const READY_TIMEOUT: Duration = Duration::from_secs(10);

static NEXT_SOCKET: AtomicU64 = AtomicU64::new(0);

fn next_socket_path() -> PathBuf {
    let n = NEXT_SOCKET.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("vidshelf-{}-{n}.sock", std::process::id()))
}

/// Substitute `{path}`, `{ipc}`, `{start}` and `{rate}` in every argument.
pub fn expand_args(args: &[String], path: &Path, ipc: &Path, start: f64, rate: f64) -> Vec<String> {
    let path = path.display().to_string();
    let ipc = ipc.display().to_string();
    let start = format!("{:.3}", start.max(0.0));
    let rate = rate.to_string();
    args.iter()
        .map(|a| {
            a.replace("{path}", &path)
                .replace("{ipc}", &ipc)
                .replace("{start}", &start)
                .replace("{rate}", &rate)
        })
        .collect()
}

/// The player process for one loaded video and what we know about it.
struct Loaded {
    key: String,
    path: PathBuf,
    socket: PathBuf,
    child: Option<Child>,
    client: Option<MpvClient>,
    launched: Instant,
    /// `MetadataReady` went out for this load.
    announced: bool,
    duration: Option<f64>,
    position: f64,
    rate: f64,
    paused: bool,
    needs_manual_start: bool,
    /// Last poll saw `eof-reached`.
    at_eof: bool,
}

impl Loaded {
    fn new(key: &str, path: &Path, needs_manual_start: bool) -> Self {
        Self {
            key: key.to_string(),
            path: path.to_path_buf(),
            socket: next_socket_path(),
            child: None,
            client: None,
            launched: Instant::now(),
            announced: false,
            duration: None,
            position: 0.0,
            rate: 1.0,
            paused: true,
            needs_manual_start,
            at_eof: false,
        }
    }

    /// Start a player process at the current position.
    fn launch(&mut self, command: &str, args: &[String]) -> std::io::Result<()> {
        remove_socket(&self.socket);
        let args = expand_args(args, &self.path, &self.socket, self.position, self.rate);
        debug!(%command, ?args, "launching player");
        let child = Command::new(command)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.child = Some(child);
        self.client = None;
        self.launched = Instant::now();
        Ok(())
    }

    /// Run `op` against the IPC connection, dropping the connection when
    /// it breaks. `None` when not connected.
    fn with_client<T>(
        &mut self,
        op: impl FnOnce(&mut MpvClient) -> Result<T, IpcError>,
    ) -> Option<Result<T, IpcError>> {
        let client = self.client.as_mut()?;
        let result = op(client);
        if let Err(e) = &result {
            if e.breaks_connection() {
                debug!(error = %e, "lost player connection");
                self.client = None;
            }
        }
        Some(result)
    }

    fn connect(&mut self) -> bool {
        if !self.socket.exists() {
            return false;
        }
        match MpvClient::connect(&self.socket) {
            Ok(client) => {
                debug!(socket = %self.socket.display(), "connected to player");
                self.client = Some(client);
                self.apply_controls();
                self.client.is_some()
            }
            Err(e) => {
                debug!(error = %e, "player socket not ready");
                false
            }
        }
    }

    /// Push rate, pause and position chosen while no connection existed.
    fn apply_controls(&mut self) {
        let (rate, paused, position) = (self.rate, self.paused, self.position);
        let applied = self.with_client(|c| {
            c.set_f64("speed", rate)?;
            c.set_pause(paused)?;
            if position > 0.0 {
                c.seek_absolute(position)?;
            }
            Ok(())
        });
        if let Some(Err(e)) = applied {
            warn!(error = %e, "cannot apply playback controls");
        }
    }

    fn poll(&mut self, now: Instant) -> Vec<SurfaceEventKind> {
        let mut out = Vec::new();
        let Some(child) = self.child.as_mut() else {
            return out;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                self.child = None;
                self.client = None;
                remove_socket(&self.socket);
                if self.at_eof {
                    debug!(%status, "player closed after the end");
                } else if status.success() {
                    info!(key = %self.key, "player closed before the end");
                    out.push(SurfaceEventKind::Closed);
                } else {
                    warn!(key = %self.key, %status, "player exited with failure");
                    out.push(SurfaceEventKind::Failed(format!("player exited with {status}")));
                }
                return out;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "cannot poll player process");
                return out;
            }
        }

        let waited = now.saturating_duration_since(self.launched);
        if self.client.is_none() && !self.connect() {
            if waited >= READY_TIMEOUT {
                warn!(key = %self.key, "player never opened its control socket");
                self.stop_process();
                out.push(SurfaceEventKind::Failed(
                    "player did not answer on its control socket".to_string(),
                ));
            }
            return out;
        }

        if !self.announced {
            match self.with_client(|c| c.get_f64("duration")) {
                Some(Ok(d)) if d > 0.0 => self.duration = Some(d),
                _ if waited < READY_TIMEOUT => return out,
                _ => debug!(key = %self.key, "no duration reported"),
            }
            self.announced = true;
            out.push(SurfaceEventKind::MetadataReady {
                duration: self.duration,
            });
            return out;
        }

        if self.duration.is_none() {
            if let Some(Ok(d)) = self.with_client(|c| c.get_f64("duration")) {
                self.duration = (d > 0.0).then_some(d);
            }
        }

        match self.with_client(|c| Ok((c.get_f64("time-pos")?, c.get_bool("eof-reached")?))) {
            Some(Ok((pos, eof))) => {
                self.position = pos.max(0.0);
                out.push(SurfaceEventKind::TimeUpdate {
                    current_time: self.position,
                    duration: self.duration,
                });
                // Edge-triggered: a seek away from the end has to be seen
                // before the next end counts.
                if eof && !self.at_eof {
                    out.push(SurfaceEventKind::Ended);
                }
                self.at_eof = eof;
            }
            Some(Err(e)) => debug!(error = %e, "player status unavailable"),
            None => {}
        }
        out
    }

    fn stop_process(&mut self) {
        if let Some(Err(e)) = self.with_client(MpvClient::quit) {
            debug!(error = %e, "quit request failed");
        }
        self.client = None;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!(error = %e, "player already gone");
            }
            let _ = child.wait();
        }
        remove_socket(&self.socket);
    }
}

impl Drop for Loaded {
    fn drop(&mut self) {
        self.stop_process();
    }
}

fn remove_socket(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %path.display(), error = %e, "cannot remove player socket");
        }
    }
}

/// Shows videos in an external mpv process, driven over its JSON IPC
/// socket.
///
/// Position, duration and end-of-file come from the player's `time-pos`,
/// `duration` and `eof-reached` properties. A process that exits before
/// the end is reported as `Closed` (clean exit) or `Failed`, never `Ended`.
pub struct ExternalPlayer {
    command: String,
    args: Vec<String>,
    autostart: bool,
    loaded: Option<Loaded>,
    events: Vec<SurfaceEvent>,
}

impl ExternalPlayer {
    pub fn new(player: &PlayerSettings, playback: &PlaybackSettings) -> Self {
        Self {
            command: player.command.clone(),
            args: player.args.clone(),
            autostart: playback.autostart,
            loaded: None,
            events: Vec::new(),
        }
    }

    fn emit(&mut self, kind: SurfaceEventKind) {
        if let Some(l) = &self.loaded {
            self.events.push(SurfaceEvent::new(l.key.clone(), kind));
        }
    }

    /// Control socket of the loaded video's player.
    #[cfg(test)]
    pub(crate) fn socket(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.socket.as_path())
    }
}

impl PlaybackSurface for ExternalPlayer {
    fn load(&mut self, key: &str, source: &ByteSource) -> Result<(), SessionError> {
        self.unload();
        let mut loaded = Loaded::new(key, source.path(), !self.autostart);
        loaded
            .launch(&self.command, &self.args)
            .map_err(|e| SessionError::Surface(format!("cannot run {}: {e}", self.command)))?;
        info!(%key, mime = source.mime(), "assigned playback source");
        self.loaded = Some(loaded);
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = None;
        // Nothing queued for the old source may reach whoever loads next.
        self.events.clear();
    }

    fn seek(&mut self, seconds: f64) {
        let Some(l) = self.loaded.as_mut() else {
            return;
        };
        let target = match l.duration {
            Some(d) => seconds.clamp(0.0, d),
            None => seconds.max(0.0),
        };
        l.position = target;
        if let Some(Err(e)) = l.with_client(|c| c.seek_absolute(target)) {
            warn!(error = %e, seconds = target, "seek failed");
        }
    }

    fn set_rate(&mut self, rate: f64) {
        let Some(l) = self.loaded.as_mut() else {
            return;
        };
        l.rate = rate;
        match l.with_client(|c| c.set_f64("speed", rate)) {
            Some(Err(e)) => warn!(error = %e, rate, "cannot change speed"),
            _ => self.emit(SurfaceEventKind::RateChange(rate)),
        }
    }

    fn play(&mut self) -> Result<(), PlayRejected> {
        let Some(l) = self.loaded.as_mut() else {
            return Err(PlayRejected("nothing loaded".to_string()));
        };
        if l.needs_manual_start {
            l.needs_manual_start = false;
            return Err(PlayRejected("autostart is disabled".to_string()));
        }
        l.paused = false;

        if l.child.is_none() {
            // The window was closed; reopen where it left off.
            return l
                .launch(&self.command, &self.args)
                .map_err(|e| PlayRejected(format!("cannot run {}: {e}", self.command)));
        }
        match l.with_client(|c| c.set_pause(false)) {
            Some(Err(e)) => Err(PlayRejected(e.to_string())),
            _ => Ok(()),
        }
    }

    fn pause(&mut self) {
        let Some(l) = self.loaded.as_mut() else {
            return;
        };
        l.paused = true;
        if let Some(Err(e)) = l.with_client(|c| c.set_pause(true)) {
            warn!(error = %e, "pause failed");
        }
    }

    fn position(&self) -> f64 {
        self.loaded.as_ref().map(|l| l.position).unwrap_or(0.0)
    }

    fn drain_events(&mut self, now: Instant) -> Vec<SurfaceEvent> {
        let kinds = match self.loaded.as_mut() {
            Some(l) => l.poll(now),
            None => Vec::new(),
        };
        for kind in kinds {
            self.emit(kind);
        }
        std::mem::take(&mut self.events)
    }
}
