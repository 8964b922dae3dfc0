use super::ipc::{IpcError, MpvClient};
use super::*;
use crate::config::{LibrarySettings, PlaybackSettings, PlayerSettings};
use crate::error::SessionError;
use crate::library::{ByteSource, FsDirectory, VideoEntry};
use crate::prefs::{MemoryStore, PlaybackPreferences};
use crate::session::{
    PlaybackSurface, PlayerSession, PlayerState, SessionSettings, SurfaceEvent, SurfaceEventKind,
};
use serde_json::{Map, Value, json};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn player(command: &str, args: &[&str], autostart: bool) -> ExternalPlayer {
    let player = PlayerSettings {
        command: command.to_string(),
        args: args.iter().map(|s| s.to_string()).collect(),
    };
    let playback = PlaybackSettings {
        autostart,
        ..PlaybackSettings::default()
    };
    ExternalPlayer::new(&player, &playback)
}

fn source(dir: &Path, name: &str) -> ByteSource {
    let path = dir.join(name);
    fs::write(&path, b"not a real video").unwrap();
    let file = File::open(&path).unwrap();
    ByteSource::new(path, file, 16)
}

fn kinds(events: &[SurfaceEvent]) -> Vec<&SurfaceEventKind> {
    events.iter().map(|e| &e.kind).collect()
}

/// Drain until `done` matches an event or five seconds pass.
fn drain_until(
    p: &mut ExternalPlayer,
    done: impl Fn(&SurfaceEventKind) -> bool,
) -> Vec<SurfaceEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = Vec::new();
    while Instant::now() < deadline {
        let events = p.drain_events(Instant::now());
        let finished = events.iter().any(|e| done(&e.kind));
        seen.extend(events);
        if finished {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }
    seen
}

/// A stand-in for mpv's IPC server: answers `get_property` from `props`,
/// stores `set_property`, and logs every command.
struct FakeMpv {
    props: Arc<Mutex<Map<String, Value>>>,
    commands: Arc<Mutex<Vec<Value>>>,
}

impl FakeMpv {
    fn serve(socket: &Path, props: Value) -> Self {
        let listener = UnixListener::bind(socket).unwrap();
        let props = Arc::new(Mutex::new(props.as_object().unwrap().clone()));
        let commands = Arc::new(Mutex::new(Vec::new()));

        let (thread_props, thread_commands) = (props.clone(), commands.clone());
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let mut writer = stream.try_clone().unwrap();
                // Unsolicited event lines share the socket with replies.
                let _ = writeln!(writer, r#"{{"event":"file-loaded"}}"#);
                for line in BufReader::new(stream).lines() {
                    let Ok(line) = line else { break };
                    let req: Value = serde_json::from_str(&line).unwrap();
                    let id = req["request_id"].clone();
                    let cmd = req["command"].as_array().cloned().unwrap_or_default();
                    thread_commands.lock().unwrap().push(req["command"].clone());

                    let name = cmd.get(1).and_then(Value::as_str).unwrap_or_default();
                    let reply = match cmd.first().and_then(Value::as_str) {
                        Some("get_property") => match thread_props.lock().unwrap().get(name) {
                            Some(v) => json!({"request_id": id, "error": "success", "data": v}),
                            None => json!({"request_id": id, "error": "property unavailable"}),
                        },
                        Some("set_property") => {
                            thread_props
                                .lock()
                                .unwrap()
                                .insert(name.to_string(), cmd[2].clone());
                            json!({"request_id": id, "error": "success"})
                        }
                        _ => json!({"request_id": id, "error": "success"}),
                    };
                    if writeln!(writer, "{reply}").is_err() {
                        break;
                    }
                }
            }
        });

        Self { props, commands }
    }

    fn set(&self, name: &str, value: Value) {
        self.props.lock().unwrap().insert(name.to_string(), value);
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.props.lock().unwrap().get(name).cloned()
    }

    fn saw(&self, verb: &str) -> bool {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.get(0).and_then(Value::as_str) == Some(verb))
    }
}

fn socket_in(dir: &Path) -> PathBuf {
    dir.join("mpv.sock")
}

#[test]
fn expand_args_substitutes_placeholders() {
    let args = vec![
        "--input-ipc-server={ipc}".to_string(),
        "--start={start}".to_string(),
        "--speed={rate}".to_string(),
        "{path}".to_string(),
        "--fs".to_string(),
    ];
    let out = expand_args(
        &args,
        Path::new("/v/a b.mkv"),
        Path::new("/tmp/v.sock"),
        12.5,
        1.25,
    );
    assert_eq!(
        out,
        vec![
            "--input-ipc-server=/tmp/v.sock",
            "--start=12.500",
            "--speed=1.25",
            "/v/a b.mkv",
            "--fs"
        ]
    );

    let clamped = expand_args(&args, Path::new("/v/a.mkv"), Path::new("/s"), -3.0, 2.0);
    assert_eq!(clamped[1], "--start=0.000");
    assert_eq!(clamped[2], "--speed=2");
}

#[test]
fn client_skips_events_and_reports_refused_commands() {
    let dir = tempdir().unwrap();
    let socket = socket_in(dir.path());
    let mpv = FakeMpv::serve(&socket, json!({"duration": 90.5, "eof-reached": false}));

    let mut client = MpvClient::connect(&socket).unwrap();
    assert_eq!(client.get_f64("duration").unwrap(), 90.5);
    assert!(!client.get_bool("eof-reached").unwrap());

    let err = client.get_f64("time-pos").unwrap_err();
    assert!(matches!(err, IpcError::Command(ref e) if e == "property unavailable"));
    assert!(!err.breaks_connection());

    let err = client.get_bool("duration").unwrap_err();
    assert!(matches!(err, IpcError::Type(_)));

    client.set_f64("speed", 1.5).unwrap();
    client.set_pause(false).unwrap();
    assert_eq!(mpv.get("speed"), Some(json!(1.5)));
    assert_eq!(mpv.get("pause"), Some(json!(false)));
}

#[test]
fn missing_player_binary_fails_the_load() {
    let dir = tempdir().unwrap();
    let mut p = player("vidshelf-no-such-player-binary", &[], true);
    let err = p
        .load("a.mp4", &source(dir.path(), "a.mp4"))
        .unwrap_err();
    assert!(matches!(err, SessionError::Surface(_)));
    assert!(err.to_string().contains("cannot run"), "{err}");
    assert!(p.play().is_err());
}

#[test]
fn failing_player_reports_failure_not_ended() {
    let dir = tempdir().unwrap();
    let mut p = player("sh", &["-c", "exit 2", "{ipc}"], true);
    p.load("show/a.mp4", &source(dir.path(), "a.mp4")).unwrap();

    let seen = drain_until(&mut p, |k| matches!(k, SurfaceEventKind::Failed(_)));
    let kinds = kinds(&seen);
    assert!(
        matches!(kinds.as_slice(), [SurfaceEventKind::Failed(reason)] if reason.contains("exit")),
        "{kinds:?}"
    );
    assert_eq!(seen[0].key, "show/a.mp4");
    assert!(p.drain_events(Instant::now()).is_empty());
}

#[test]
fn player_closed_early_reports_closed() {
    let dir = tempdir().unwrap();
    let mut p = player("true", &[], true);
    p.load("a.mkv", &source(dir.path(), "a.mkv")).unwrap();

    let seen = drain_until(&mut p, |k| *k == SurfaceEventKind::Closed);
    assert_eq!(kinds(&seen), vec![&SurfaceEventKind::Closed]);
}

#[test]
fn player_without_a_socket_times_out() {
    let dir = tempdir().unwrap();
    let mut p = player("sh", &["-c", "sleep 5"], true);
    p.load("a.mp4", &source(dir.path(), "a.mp4")).unwrap();

    assert!(p.drain_events(Instant::now()).is_empty());
    let late = Instant::now() + Duration::from_secs(11);
    let events = p.drain_events(late);
    assert!(
        matches!(kinds(&events).as_slice(), [SurfaceEventKind::Failed(_)]),
        "{events:?}"
    );
}

#[test]
fn first_play_is_rejected_without_autostart() {
    let dir = tempdir().unwrap();
    let mut p = player("sh", &["-c", "sleep 5"], false);
    p.load("a.mp4", &source(dir.path(), "a.mp4")).unwrap();

    assert!(p.play().is_err());
    assert!(p.play().is_ok());
    p.unload();
}

#[test]
fn play_without_source_is_rejected() {
    let mut p = player("true", &[], true);
    assert!(p.play().is_err());
}

#[test]
fn unload_drops_queued_events() {
    let dir = tempdir().unwrap();
    let mut p = player("sh", &["-c", "sleep 5"], true);
    p.load("a.mp4", &source(dir.path(), "a.mp4")).unwrap();
    p.set_rate(1.5);
    p.unload();
    assert!(p.drain_events(Instant::now()).is_empty());
    assert_eq!(p.position(), 0.0);
}

#[test]
fn rate_changes_are_reported_and_seek_clamps_at_zero() {
    let dir = tempdir().unwrap();
    let mut p = player("sh", &["-c", "sleep 5"], true);
    p.load("a.mp4", &source(dir.path(), "a.mp4")).unwrap();

    p.set_rate(2.0);
    p.seek(-4.0);
    assert_eq!(p.position(), 0.0);
    p.seek(30.0);
    assert_eq!(p.position(), 30.0);

    let events = p.drain_events(Instant::now());
    assert_eq!(kinds(&events), vec![&SurfaceEventKind::RateChange(2.0)]);
    p.unload();
}

fn session_over(
    p: ExternalPlayer,
    dir: &Path,
    names: &[&str],
) -> PlayerSession<ExternalPlayer, FsDirectory> {
    let entries = names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, b"not a real video").unwrap();
            VideoEntry::new(&["show".to_string()], name, path)
        })
        .collect();
    let mut prefs = PlaybackPreferences::new(Box::new(MemoryStore::new()));
    prefs.load();
    let mut session = PlayerSession::new(
        p,
        FsDirectory::new(&LibrarySettings::default()),
        prefs,
        SessionSettings {
            autoplay_delay: Duration::from_millis(50),
            rates: vec![1.0, 2.0],
        },
    );
    session.set_autoplay(true);
    session.rebuild_playlist(entries);
    session
}

#[test]
fn failing_player_does_not_cascade_through_autoplay() {
    let dir = tempdir().unwrap();
    let p = player("sh", &["-c", "exit 2", "{ipc}"], true);
    let mut session = session_over(p, dir.path(), &["c1.mp4", "c2.mp4", "c3.mp4"]);
    session.select_video("c1.mp4").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut failure = None;
    while failure.is_none() && Instant::now() < deadline {
        failure = session.pump_surface(Instant::now()).err();
        thread::sleep(Duration::from_millis(20));
    }

    assert!(matches!(failure, Some(SessionError::Surface(_))), "{failure:?}");
    assert_eq!(session.state(), PlayerState::Idle);
    assert!(!session.has_pending_advance());
    assert!(!session.tick(Instant::now() + Duration::from_secs(1)).unwrap());
    assert!(session.active().is_none());
}

#[test]
fn closing_the_player_early_is_not_a_finish() {
    let dir = tempdir().unwrap();
    let p = player("sh", &["-c", "sleep 0.3"], true);
    let mut session = session_over(p, dir.path(), &["e1.mkv", "e2.mkv"]);
    session.select_video("e1.mkv").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while session.state() == PlayerState::Loading && Instant::now() < deadline {
        session.pump_surface(Instant::now()).unwrap();
        thread::sleep(Duration::from_millis(20));
    }

    assert_eq!(session.state(), PlayerState::Idle);
    assert!(!session.has_pending_advance());
    assert!(!session.tick(Instant::now() + Duration::from_secs(1)).unwrap());
    assert!(session.active().is_none());
}

#[test]
fn ipc_player_drives_progress_and_ends_on_eof() {
    let dir = tempdir().unwrap();
    let p = player("sh", &["-c", "sleep 10", "vidshelf", "{ipc}"], true);
    let mut session = session_over(p, dir.path(), &["e1.mkv", "e2.mkv"]);
    session.select_video("e1.mkv").unwrap();

    let socket = session.surface().socket().unwrap().to_path_buf();
    let mpv = FakeMpv::serve(
        &socket,
        json!({
            "duration": 60.0,
            "time-pos": 12.0,
            "eof-reached": false,
            "pause": true,
            "speed": 1.0,
        }),
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    while session.state() == PlayerState::Loading && Instant::now() < deadline {
        session.pump_surface(Instant::now()).unwrap();
        thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(session.state(), PlayerState::Playing);
    assert_eq!(session.duration(), Some(60.0));
    assert_eq!(mpv.get("pause"), Some(json!(false)));

    session.pump_surface(Instant::now()).unwrap();
    let record = session.progress().get("show/e1.mkv").unwrap();
    assert_eq!(record.current_time, 12.0);
    assert_eq!(record.percentage, 20.0);
    assert_eq!(session.position(), 12.0);

    session.request_rate(2.0);
    assert_eq!(mpv.get("speed"), Some(json!(2.0)));
    session.pump_surface(Instant::now()).unwrap();
    assert_eq!(session.prefs().rate(), 2.0);

    mpv.set("time-pos", json!(60.0));
    mpv.set("eof-reached", json!(true));
    session.pump_surface(Instant::now()).unwrap();
    assert_eq!(session.state(), PlayerState::Ended);
    assert!(session.has_pending_advance());

    session.stop();
    assert!(mpv.saw("quit"));
}
