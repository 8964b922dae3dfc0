use super::*;
use std::sync::mpsc;

fn iface() -> (PlayerIface, Arc<Mutex<SharedState>>, mpsc::Receiver<ControlCmd>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    (
        PlayerIface {
            tx,
            state: state.clone(),
        },
        state,
        rx,
    )
}

#[test]
fn handle_updates_shared_state() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };

    handle.set_state(PlayerState::Paused);
    handle.set_title(Some("e01.mkv".to_string()));
    {
        let s = state.lock().unwrap();
        assert_eq!(s.state, PlayerState::Paused);
        assert_eq!(s.title.as_deref(), Some("e01.mkv"));
    }

    handle.set_title(None);
    assert_eq!(state.lock().unwrap().title, None);
}

#[test]
fn playback_status_maps_player_states() {
    let (iface, state, _rx) = iface();

    for (player_state, expected) in [
        (PlayerState::Idle, "Stopped"),
        (PlayerState::Loading, "Playing"),
        (PlayerState::Playing, "Playing"),
        (PlayerState::Paused, "Paused"),
        (PlayerState::Ended, "Stopped"),
    ] {
        state.lock().unwrap().state = player_state;
        assert_eq!(iface.playback_status(), expected, "{player_state:?}");
    }
}

#[test]
fn metadata_carries_the_title() {
    let (iface, state, _rx) = iface();
    state.lock().unwrap().title = Some("Title".to_string());

    let map = iface.metadata();
    assert!(map.contains_key("xesam:title"));
}

#[test]
fn methods_forward_commands() {
    let (iface, _state, rx) = iface();
    iface.play_pause();
    iface.next();
    iface.previous();
    iface.stop();

    let got: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            ControlCmd::PlayPause,
            ControlCmd::Next,
            ControlCmd::Prev,
            ControlCmd::Stop
        ]
    );
}
