use std::path::PathBuf;

use serde::Deserialize;

use crate::library::SortMode;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/vidshelf/config.toml` or `~/.config/vidshelf/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `VIDSHELF__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub player: PlayerSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as video (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to list hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether symlinked entries are resolved when listing.
    pub follow_links: bool,
    /// Sort order used when a folder is first opened.
    pub default_sort: SortMode,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: ["mp4", "webm", "ogg", "mov", "mkv", "avi"]
                .into_iter()
                .map(String::from)
                .collect(),
            include_hidden: true,
            follow_links: true,
            default_sort: SortMode::NameAsc,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Pause between a video ending and the next one loading (milliseconds).
    pub autoplay_delay_ms: u64,
    /// Rates offered by `[` / `]`, in ascending order.
    pub rates: Vec<f64>,
    /// Start playback as soon as a video is loaded.
    /// When false, a loaded video waits paused for an explicit play.
    pub autostart: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            autoplay_delay_ms: 1000,
            rates: vec![0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 2.5, 3.0],
            autostart: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// mpv (or a compatible player) used to show the video.
    pub command: String,
    /// Arguments passed to `command`. `{path}`, `{ipc}` (the JSON IPC
    /// socket), `{start}` (seconds) and `{rate}` are substituted on every
    /// launch. The player must serve its IPC socket at `{ipc}`.
    pub args: Vec<String>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            args: vec![
                "--really-quiet".to_string(),
                "--force-window=yes".to_string(),
                "--keep-open=yes".to_string(),
                "--pause".to_string(),
                "--input-ipc-server={ipc}".to_string(),
                "--start={start}".to_string(),
                "--speed={rate}".to_string(),
                "{path}".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " vidshelf ~ local videos ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Where playback preferences are kept. Defaults to
    /// `$XDG_STATE_HOME/vidshelf/prefs.toml`.
    pub prefs_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `VIDSHELF_LOG` is unset.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/vidshelf/vidshelf.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
