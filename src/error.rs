//! Error types shared across the browser, the playback session and the
//! preference store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while accessing the local directory tree.
#[derive(Error, Debug)]
pub enum BrowseError {
    #[error("no folder opened")]
    NoRoot,

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a folder: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BrowseError {
    /// Classify an `io::Error` raised while touching `path`.
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source: err },
        }
    }
}

/// Failures surfaced by the playback session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no video named {0:?} in this folder")]
    UnknownVideo(String),

    #[error("cannot open video: {0}")]
    PlaybackSource(#[from] BrowseError),

    #[error("player failed: {0}")]
    Surface(String),
}

/// Failures reading or writing persisted preferences.
#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Top-level error for anything the UI reports in its status line.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Browse(#[from] BrowseError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
