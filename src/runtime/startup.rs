use tracing::{info, warn};

use crate::app::App;
use crate::browser::Browser;
use crate::config;
use crate::library::FsDirectory;
use crate::player::ExternalPlayer;
use crate::prefs::{KeyValueStore, MemoryStore, PlaybackPreferences, TomlFileStore};
use crate::session::{PlayerSession, SessionSettings};

pub type VidshelfApp = App<ExternalPlayer, FsDirectory>;

fn open_store(settings: &config::Settings) -> Box<dyn KeyValueStore> {
    match settings.prefs_path() {
        Some(path) => {
            info!(path = %path.display(), "using preference file");
            Box::new(TomlFileStore::open(path))
        }
        None => {
            warn!("no state directory; preferences last for this session only");
            Box::new(MemoryStore::new())
        }
    }
}

/// Wire the browser, the playback session and its preferences together.
pub fn build_app(settings: &config::Settings) -> VidshelfApp {
    let mut prefs = PlaybackPreferences::new(open_store(settings));
    prefs.load();

    let access = FsDirectory::new(&settings.library);
    let player = ExternalPlayer::new(&settings.player, &settings.playback);
    let session = PlayerSession::new(
        player,
        access.clone(),
        prefs,
        SessionSettings::from(&settings.playback),
    );
    let browser = Browser::new(access, &settings.library);

    App::new(browser, session, settings.controls.scrub_seconds)
}
