use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::BrowseError;

use super::media::ByteSource;
use super::model::{EntryKind, FileMeta, RawEntry};

/// Access to a directory tree. Handles are absolute paths.
pub trait DirectoryAccess {
    /// Validate and open the root the user asked for.
    fn request_root(&self, path: &Path) -> Result<PathBuf, BrowseError>;
    /// List the direct children of `dir`, in no particular order.
    fn list(&self, dir: &Path) -> Result<Vec<RawEntry>, BrowseError>;
    fn metadata(&self, file: &Path) -> Result<FileMeta, BrowseError>;
    /// Resolve the sub-folder `name` of `dir`.
    fn child_dir(&self, dir: &Path, name: &str) -> Result<PathBuf, BrowseError>;
    fn open_bytes(&self, file: &Path) -> Result<ByteSource, BrowseError>;
}

/// Matches file names against the configured video extensions.
#[derive(Debug, Clone)]
pub struct VideoFilter {
    extensions: Vec<String>,
}

impl VideoFilter {
    pub fn new(settings: &LibrarySettings) -> Self {
        let extensions = settings
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn is_video(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| e == &ext)
            })
            .unwrap_or(false)
    }
}

/// Local filesystem provider.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    include_hidden: bool,
    follow_links: bool,
}

impl FsDirectory {
    pub fn new(settings: &LibrarySettings) -> Self {
        Self {
            include_hidden: settings.include_hidden,
            follow_links: settings.follow_links,
        }
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn walk_error(path: &Path, err: walkdir::Error) -> BrowseError {
    let io_err = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
    BrowseError::from_io(path, io_err)
}

impl DirectoryAccess for FsDirectory {
    fn request_root(&self, path: &Path) -> Result<PathBuf, BrowseError> {
        let root = fs::canonicalize(path).map_err(|e| BrowseError::from_io(path, e))?;
        if !root.is_dir() {
            return Err(BrowseError::NotADirectory(root));
        }
        // Opening the folder is what fails when read access is refused.
        fs::read_dir(&root).map_err(|e| BrowseError::from_io(&root, e))?;
        Ok(root)
    }

    fn list(&self, dir: &Path) -> Result<Vec<RawEntry>, BrowseError> {
        fs::read_dir(dir).map_err(|e| BrowseError::from_io(dir, e))?;

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_links);

        let mut out = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) if e.depth() == 0 => return Err(walk_error(dir, e)),
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 name");
                continue;
            };
            if !self.include_hidden && is_hidden(&name) {
                continue;
            }

            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_symlink() {
                // Only reachable when links are not followed.
                continue;
            } else {
                EntryKind::File
            };

            out.push(RawEntry {
                name,
                kind,
                handle: entry.into_path(),
            });
        }
        Ok(out)
    }

    fn metadata(&self, file: &Path) -> Result<FileMeta, BrowseError> {
        let md = fs::metadata(file).map_err(|e| BrowseError::from_io(file, e))?;
        let modified = md.modified().map_err(|e| BrowseError::from_io(file, e))?;
        let last_modified_ms = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Ok(FileMeta {
            last_modified_ms,
            size: md.len(),
        })
    }

    fn child_dir(&self, dir: &Path, name: &str) -> Result<PathBuf, BrowseError> {
        let mut components = Path::new(name).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        let path = dir.join(name);
        if !single_normal {
            return Err(BrowseError::NotFound(path));
        }

        let md = fs::metadata(&path).map_err(|e| BrowseError::from_io(&path, e))?;
        if !md.is_dir() {
            return Err(BrowseError::NotADirectory(path));
        }
        Ok(path)
    }

    fn open_bytes(&self, file: &Path) -> Result<ByteSource, BrowseError> {
        let f = File::open(file).map_err(|e| BrowseError::from_io(file, e))?;
        let size = f
            .metadata()
            .map_err(|e| BrowseError::from_io(file, e))?
            .len();
        Ok(ByteSource::new(file.to_path_buf(), f, size))
    }
}
