use crate::app::App;
use crate::library::DirectoryAccess;
use crate::mpris::MprisHandle;
use crate::session::{PlaybackSurface, PlayerState};

/// What MPRIS last saw.
pub type Published = (PlayerState, Option<String>);

pub fn snapshot<S: PlaybackSurface, A: DirectoryAccess>(app: &App<S, A>) -> Published {
    let state = app.session.state();
    let title = match state {
        PlayerState::Idle => None,
        _ => app.session.active().map(|v| v.name.clone()),
    };
    (state, title)
}

/// Publish the session state if it changed since `last`.
pub fn update_mpris<S: PlaybackSurface, A: DirectoryAccess>(
    mpris: &MprisHandle,
    app: &App<S, A>,
    last: &mut Option<Published>,
) {
    let now = snapshot(app);
    if last.as_ref() == Some(&now) {
        return;
    }
    mpris.set_state(now.0);
    mpris.set_title(now.1.clone());
    *last = Some(now);
}
