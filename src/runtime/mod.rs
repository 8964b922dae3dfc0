use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::logging;
use crate::mpris::ControlCmd;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

/// The folder to browse: the first argument, else the working directory.
fn root_arg() -> PathBuf {
    env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();

    let _log_guard = settings.log_path().and_then(|path| {
        logging::init(&path, &settings.logging.level)
            .map_err(|e| {
                // The terminal is still ours at this point.
                eprintln!("vidshelf: cannot open log file {}: {e}", path.display());
            })
            .ok()
    });
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "vidshelf starting");

    let mut app = startup::build_app(&settings);
    let root = root_arg();
    let opened = app.open_root(&root);
    app.report(opened);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mpris,
            &control_rx,
            &mut state,
        )
    })();

    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
