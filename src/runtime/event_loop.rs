use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Intent, intent_for};
use crate::config;
use crate::library::DirectoryAccess;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::{Published, update_mpris};
use crate::session::PlaybackSurface;
use crate::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// State tracked by the event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Player state and title as last published to MPRIS.
    pub last_mpris: Option<Published>,
}

fn intent_for_command(cmd: ControlCmd) -> Intent {
    match cmd {
        ControlCmd::Quit => Intent::Quit,
        ControlCmd::Play => Intent::Play,
        ControlCmd::Pause => Intent::Pause,
        ControlCmd::PlayPause => Intent::TogglePause,
        ControlCmd::Stop => Intent::Stop,
        ControlCmd::Next => Intent::Next,
        ControlCmd::Prev => Intent::Previous,
    }
}

/// Main loop: remote commands, surface events, autoplay, drawing and keys,
/// all on this thread. Returns `Ok(())` when quit is requested.
pub fn run<S, A>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App<S, A>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: PlaybackSurface,
    A: DirectoryAccess,
{
    loop {
        while let Ok(cmd) = control_rx.try_recv() {
            let intent = intent_for_command(cmd);
            if intent == Intent::Quit {
                return Ok(());
            }
            let result = app.handle_remote(intent);
            app.report(result);
        }

        app.pump(Instant::now());
        update_mpris(mpris, app, &mut state.last_mpris);

        let view = app.view();
        terminal.draw(|f| ui::draw(f, app, &view, &settings.ui, &settings.controls))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let Some(intent) = intent_for(key, app.focus) else {
                    continue;
                };
                if intent == Intent::Quit {
                    return Ok(());
                }
                let result = app.handle(intent);
                app.report(result);
            }
        }
    }
}
