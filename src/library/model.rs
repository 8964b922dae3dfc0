use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// Separator between folder segments in an identifying path.
pub const PATH_SEPARATOR: &str = "/";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// Timestamp and size of a listed file. Directories carry zeroes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FileMeta {
    /// Milliseconds since the Unix epoch.
    pub last_modified_ms: i64,
    pub size: u64,
}

/// An entry as returned by a directory provider, before metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub kind: EntryKind,
    pub handle: PathBuf,
}

/// One row of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseEntry {
    pub name: String,
    pub kind: EntryKind,
    pub handle: PathBuf,
    pub meta: FileMeta,
}

impl BrowseEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A playable file in the current folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    pub name: String,
    /// Folder segments plus file name, joined with [`PATH_SEPARATOR`].
    /// Stable for the session; keys watch progress.
    pub identifying_path: String,
    pub handle: PathBuf,
}

impl VideoEntry {
    pub fn new(folder: &[String], name: &str, handle: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            identifying_path: identifying_path(folder, name),
            handle,
        }
    }
}

/// Join folder segments and a file name into an identifying path.
pub fn identifying_path(folder: &[String], name: &str) -> String {
    folder
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(name))
        .collect::<Vec<&str>>()
        .join(PATH_SEPARATOR)
}

/// How a folder listing is ordered. Directories always come first.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    #[serde(alias = "name_asc", alias = "name")]
    NameAsc,
    #[serde(alias = "name_desc")]
    NameDesc,
    #[serde(alias = "date_asc", alias = "date")]
    DateAsc,
    #[serde(alias = "date_desc")]
    DateDesc,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::NameAsc,
        SortMode::NameDesc,
        SortMode::DateAsc,
        SortMode::DateDesc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortMode::NameAsc => "Name (A-Z)",
            SortMode::NameDesc => "Name (Z-A)",
            SortMode::DateAsc => "Date (oldest first)",
            SortMode::DateDesc => "Date (newest first)",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
