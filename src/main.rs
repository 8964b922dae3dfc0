mod app;
mod browser;
mod config;
mod error;
mod library;
mod logging;
mod mpris;
mod natural;
mod player;
mod playlist;
mod prefs;
mod progress;
mod runtime;
mod session;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
